//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML config → TGT → service ticket → protected resource

use cas_rest_client::config::try_load_config;
use cas_rest_client::{load_config, CasClient, ConfigOverrides, Error, RequestOptions};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TICKETS_PATH: &str = "/cas/v1/tickets";

fn write_config(server: &MockServer) -> NamedTempFile {
    let yaml = format!(
        r#"
development:
  uri: "http://localhost:1/cas/v1/tickets"
production:
  uri: "{uri}{TICKETS_PATH}"
  service: "{uri}/app"
  headers:
    Accept: application/json
  payload:
    username: svc
"#,
        uri = server.uri()
    );

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

async fn mount_cas(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .and(body_string_contains("username=svc"))
        .and(body_string_contains("password=secret"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("location", format!("{}{TICKETS_PATH}/TGT-42", server.uri())),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{TICKETS_PATH}/TGT-42")))
        .and(body_string_contains("service="))
        .respond_with(ResponseTemplate::new(200).set_body_string("ST-42\n"))
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Full session flow
// ============================================================================

#[tokio::test]
async fn test_config_file_to_authenticated_session() {
    let mock_server = MockServer::start().await;
    mount_cas(&mock_server).await;

    // Cookie path, mounted first so it wins once the session cookie is held
    Mock::given(method("GET"))
        .and(path("/app/items"))
        .and(header("cookie", "JSESSIONID=s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [3, 4]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/app/items"))
        .and(query_param("ticket", "ST-42"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "JSESSIONID=s1; Path=/app")
                .set_body_json(json!({"items": [1, 2]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{TICKETS_PATH}/TGT-42")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let file = write_config(&mock_server);
    let config = load_config(file.path(), Some("production"));
    assert_eq!(config.payload.get("username").map(String::as_str), Some("svc"));

    let client = CasClient::builder()
        .config(config)
        .overrides(ConfigOverrides::new().payload("password", "secret"))
        .build()
        .unwrap();

    let tgt = client.connect().await.unwrap();
    assert_eq!(tgt.id(), "TGT-42");

    let uri = format!("{}/app/items", mock_server.uri());

    let first = client.get(&uri, &[], &RequestOptions::new()).await.unwrap();
    assert_eq!(first.ticket().map(|t| t.value()), Some("ST-42"));
    let body: serde_json::Value = first.json().unwrap();
    assert_eq!(body["items"], json!([1, 2]));

    let second = client.get(&uri, &[], &RequestOptions::new()).await.unwrap();
    assert!(second.ticket().is_none());
    let body: serde_json::Value = second.json().unwrap();
    assert_eq!(body["items"], json!([3, 4]));

    client.destroy().await.unwrap();
}

#[tokio::test]
async fn test_resume_with_existing_tgt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{TICKETS_PATH}/TGT-saved")))
        .respond_with(ResponseTemplate::new(200).set_body_string("ST-9"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let file = write_config(&mock_server);
    let client = CasClient::builder()
        .config(load_config(file.path(), Some("production")))
        .tgt("TGT-saved")
        .build()
        .unwrap();

    let ticket = client.service_ticket(None).await.unwrap();
    assert_eq!(ticket.value(), "ST-9");
    assert_eq!(ticket.service(), format!("{}/app", mock_server.uri()));
}

// ============================================================================
// Failure surfaces
// ============================================================================

#[tokio::test]
async fn test_bad_credentials_surface_as_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(TICKETS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad credentials"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let file = write_config(&mock_server);
    let client = CasClient::builder()
        .config(load_config(file.path(), Some("production")))
        .build()
        .unwrap();

    let err = client.connect().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(client.tgt().await.is_none());
}

#[tokio::test]
async fn test_unknown_environment() {
    let mock_server = MockServer::start().await;
    let file = write_config(&mock_server);

    let err = try_load_config(file.path(), Some("staging")).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));

    // The lenient loader falls back to an empty config
    let config = load_config(file.path(), Some("staging"));
    assert!(config.uri.is_none());
    let err = CasClient::new(config).unwrap().connect().await.unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { ref field } if field == "uri"));
}
