//! Tests for the ticket module

use super::*;
use crate::config::{CasConfig, ConfigOverrides, TransportOptions};
use crate::error::Error;
use crate::transport::{ReqwestTransport, Transport};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

const TICKETS_PATH: &str = "/cas/v1/tickets";

fn transport() -> Arc<dyn Transport> {
    Arc::new(ReqwestTransport::new(&TransportOptions::default()).unwrap())
}

fn cas_config(server: &MockServer) -> CasConfig {
    CasConfig::new(format!("{}{TICKETS_PATH}", server.uri()))
        .with_overrides(ConfigOverrides::new().credentials("svc", "secret"))
}

fn tgt_location(server: &MockServer, id: &str) -> String {
    format!("{}{TICKETS_PATH}/{id}", server.uri())
}

fn manager(server: &MockServer) -> TicketManager {
    TicketManager::new(Arc::new(cas_config(server)), transport())
}

fn manager_with_tgt(server: &MockServer, id: &str) -> TicketManager {
    TicketManager::with_tgt(
        Arc::new(cas_config(server)),
        transport(),
        TicketGrantingTicket::new(tgt_location(server, id)),
    )
}

/// Mount a TGT issuance endpoint answering with `id`, expected `times` times
async fn mount_tgt(server: &MockServer, id: &str, times: impl Into<Times>) {
    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(201).insert_header("location", tgt_location(server, id)))
        .expect(times)
        .mount(server)
        .await;
}

/// Mount a service ticket endpoint on TGT `id`
async fn mount_st(
    server: &MockServer,
    id: &str,
    response: ResponseTemplate,
    times: impl Into<Times>,
) {
    Mock::given(method("POST"))
        .and(path(format!("{TICKETS_PATH}/{id}")))
        .and(body_string_contains("service="))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

// ============================================================================
// TGT acquisition
// ============================================================================

#[tokio::test]
async fn test_acquire_tgt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .and(body_string_contains("username=svc"))
        .and(body_string_contains("password=secret"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("location", tgt_location(&mock_server, "TGT-1-abc")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager(&mock_server);
    assert!(manager.tgt().await.is_none());

    let tgt = manager.acquire_tgt().await.unwrap();
    assert_eq!(tgt.location(), tgt_location(&mock_server, "TGT-1-abc"));
    assert_eq!(tgt.id(), "TGT-1-abc");
    assert_eq!(manager.tgt().await, Some(tgt));
}

#[tokio::test]
async fn test_acquire_tgt_bad_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("error.authentication.credentials.bad"))
        .mount(&mock_server)
        .await;

    let manager = manager(&mock_server);
    let err = manager.acquire_tgt().await.unwrap_err();

    assert!(matches!(err, Error::AuthenticationRejected { status: 400, .. }));
    assert!(err.is_unauthorized());
    assert!(manager.tgt().await.is_none());
}

#[tokio::test]
async fn test_acquire_tgt_missing_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let err = manager(&mock_server).acquire_tgt().await.unwrap_err();
    assert!(matches!(err, Error::MissingLocation));
}

#[tokio::test]
async fn test_acquire_tgt_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = manager(&mock_server).acquire_tgt().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_acquire_tgt_requires_uri() {
    let manager = TicketManager::new(Arc::new(CasConfig::default()), transport());
    let err = manager.acquire_tgt().await.unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { field } if field == "uri"));
}

// ============================================================================
// Service tickets
// ============================================================================

#[tokio::test]
async fn test_service_ticket_acquires_tgt_lazily() {
    let mock_server = MockServer::start().await;
    mount_tgt(&mock_server, "TGT-1", 1).await;
    mount_st(
        &mock_server,
        "TGT-1",
        ResponseTemplate::new(200).set_body_string("ST-1-abc\n"),
        1,
    )
    .await;

    let manager = manager(&mock_server);
    let ticket = manager
        .service_ticket(Some("https://app.example.com/resource"))
        .await
        .unwrap();

    assert_eq!(ticket.value(), "ST-1-abc");
    assert_eq!(ticket.service(), "https://app.example.com/resource");
}

#[tokio::test]
async fn test_service_ticket_reuses_tgt() {
    let mock_server = MockServer::start().await;
    mount_tgt(&mock_server, "TGT-1", 1).await;
    mount_st(
        &mock_server,
        "TGT-1",
        ResponseTemplate::new(200).set_body_string("ST-1"),
        2,
    )
    .await;

    let manager = manager(&mock_server);
    manager.service_ticket(Some("https://a.example.com/")).await.unwrap();
    manager.service_ticket(Some("https://b.example.com/")).await.unwrap();
}

#[tokio::test]
async fn test_configured_service_wins_over_target() {
    let mock_server = MockServer::start().await;
    mount_tgt(&mock_server, "TGT-1", 1).await;

    Mock::given(method("POST"))
        .and(path(format!("{TICKETS_PATH}/TGT-1")))
        .and(body_string_contains("service=https%3A%2F%2Ffixed.example.com%2F"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ST-1"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = cas_config(&mock_server)
        .with_overrides(ConfigOverrides::new().service("https://fixed.example.com/"));
    let manager = TicketManager::new(Arc::new(config), transport());

    let ticket = manager
        .service_ticket(Some("https://other.example.com/"))
        .await
        .unwrap();
    assert_eq!(ticket.service(), "https://fixed.example.com/");
}

#[tokio::test]
async fn test_service_ticket_requires_service() {
    let mock_server = MockServer::start().await;

    let err = manager(&mock_server).service_ticket(None).await.unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { field } if field == "service"));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_service_ticket() {
    let mock_server = MockServer::start().await;
    mount_tgt(&mock_server, "TGT-1", 1).await;
    mount_st(
        &mock_server,
        "TGT-1",
        ResponseTemplate::new(200).set_body_string("  "),
        1,
    )
    .await;

    let err = manager(&mock_server)
        .service_ticket(Some("https://app.example.com/"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyTicket { .. }));
}

#[tokio::test]
async fn test_service_ticket_server_error_not_retried() {
    let mock_server = MockServer::start().await;
    mount_tgt(&mock_server, "TGT-1", 1).await;
    mount_st(&mock_server, "TGT-1", ResponseTemplate::new(500), 1).await;

    let err = manager(&mock_server)
        .service_ticket(Some("https://app.example.com/"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

// ============================================================================
// Expired TGT recovery
// ============================================================================

#[tokio::test]
async fn test_expired_tgt_is_reacquired_once() {
    let mock_server = MockServer::start().await;
    mount_st(&mock_server, "TGT-old", ResponseTemplate::new(404), 1).await;
    mount_tgt(&mock_server, "TGT-new", 1).await;
    mount_st(
        &mock_server,
        "TGT-new",
        ResponseTemplate::new(200).set_body_string("ST-2"),
        1,
    )
    .await;

    let manager = manager_with_tgt(&mock_server, "TGT-old");
    let ticket = manager
        .service_ticket(Some("https://app.example.com/"))
        .await
        .unwrap();

    assert_eq!(ticket.value(), "ST-2");
    assert_eq!(manager.tgt().await.unwrap().id(), "TGT-new");
}

#[tokio::test]
async fn test_expired_twice_surfaces_ticket_expired() {
    let mock_server = MockServer::start().await;
    mount_st(&mock_server, "TGT-old", ResponseTemplate::new(404), 1).await;
    mount_tgt(&mock_server, "TGT-new", 1).await;
    mount_st(&mock_server, "TGT-new", ResponseTemplate::new(404), 1).await;

    let manager = manager_with_tgt(&mock_server, "TGT-old");
    let err = manager
        .service_ticket(Some("https://app.example.com/"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TicketExpired { tgt } if tgt.ends_with("TGT-new")));
}

#[tokio::test]
async fn test_failed_reacquisition_keeps_previous_tgt() {
    let mock_server = MockServer::start().await;
    mount_st(&mock_server, "TGT-old", ResponseTemplate::new(404), 1).await;

    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_with_tgt(&mock_server, "TGT-old");
    let err = manager
        .service_ticket(Some("https://app.example.com/"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert_eq!(manager.tgt().await.unwrap().id(), "TGT-old");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_expiry_acquires_once() {
    let mock_server = MockServer::start().await;
    mount_st(&mock_server, "TGT-old", ResponseTemplate::new(404), 1..=8).await;
    mount_tgt(&mock_server, "TGT-new", 1).await;
    mount_st(
        &mock_server,
        "TGT-new",
        ResponseTemplate::new(200).set_body_string("ST-fresh"),
        8,
    )
    .await;

    let manager = Arc::new(manager_with_tgt(&mock_server, "TGT-old"));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                manager
                    .service_ticket(Some(&format!("https://app.example.com/{i}")))
                    .await
            })
        })
        .collect();

    for handle in futures::future::join_all(handles).await {
        assert_eq!(handle.unwrap().unwrap().value(), "ST-fresh");
    }

    assert_eq!(manager.tgt().await.unwrap().id(), "TGT-new");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_acquires_once() {
    let mock_server = MockServer::start().await;
    mount_tgt(&mock_server, "TGT-1", 1).await;
    mount_st(
        &mock_server,
        "TGT-1",
        ResponseTemplate::new(200).set_body_string("ST-1"),
        8,
    )
    .await;

    let manager = Arc::new(manager(&mock_server));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.service_ticket(Some("https://app.example.com/")).await })
        })
        .collect();

    for handle in futures::future::join_all(handles).await {
        assert!(handle.unwrap().is_ok());
    }
}

// ============================================================================
// Destroy
// ============================================================================

#[tokio::test]
async fn test_destroy_deletes_tgt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{TICKETS_PATH}/TGT-1")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let manager = manager_with_tgt(&mock_server, "TGT-1");
    manager.destroy().await.unwrap();

    // The local reference survives destruction
    assert_eq!(manager.tgt().await.unwrap().id(), "TGT-1");
}

#[tokio::test]
async fn test_destroy_without_tgt_is_noop() {
    let mock_server = MockServer::start().await;

    manager(&mock_server).destroy().await.unwrap();
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
