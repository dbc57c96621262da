//! Authenticated request executor
//!
//! Every verb runs through the same state machine:
//!
//! ```text
//! START ──cookies held──▶ COOKIE_ATTEMPT ──401──▶ TICKET_ATTEMPT
//!   └──────no cookies──────────────────────────▶ TICKET_ATTEMPT
//! TICKET_ATTEMPT (POST) ──3xx + Set-Cookie──▶ COOKIE_RETRY (once)
//! ```
//!
//! Expired TGTs inside TICKET_ATTEMPT are handled by the ticket manager.
//! No transition is taken more than once per request.

use super::builder::CasClientBuilder;
use super::response::AuthenticatedResponse;
use crate::config::CasConfig;
use crate::error::{Error, Result};
use crate::session::SessionCookieJar;
use crate::ticket::{ServiceTicket, TicketGrantingTicket, TicketManager};
use crate::transport::{StatusClass, Transport, TransportRequest, TransportResponse};
use reqwest::Method;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::form_urlencoded;

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Request headers, merged over the configured static headers
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    /// Create empty request options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// One logical request, re-issued unchanged on each authentication path
struct Call<'a> {
    method: Method,
    /// Target URI with any query parameters already serialized into it;
    /// service tickets are issued for exactly this URI
    uri: String,
    form: Vec<(String, String)>,
    options: &'a RequestOptions,
}

/// CAS-authenticated HTTP client
///
/// Safe to share between tasks behind an `Arc`; the TGT and session cookies
/// are guarded internally.
pub struct CasClient {
    config: Arc<CasConfig>,
    transport: Arc<dyn Transport>,
    tickets: TicketManager,
    cookies: RwLock<SessionCookieJar>,
}

impl CasClient {
    /// Create a client with the default transport
    pub fn new(config: CasConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Create a client builder
    pub fn builder() -> CasClientBuilder {
        CasClientBuilder::default()
    }

    pub(crate) fn from_parts(
        config: Arc<CasConfig>,
        transport: Arc<dyn Transport>,
        tickets: TicketManager,
    ) -> Self {
        Self {
            config,
            transport,
            tickets,
            cookies: RwLock::new(SessionCookieJar::new()),
        }
    }

    /// Acquire a TGT now instead of on first request
    ///
    /// Rejected credentials surface as `Unauthorized`.
    pub async fn connect(&self) -> Result<TicketGrantingTicket> {
        self.tickets.acquire_tgt().await.map_err(|e| match e {
            Error::AuthenticationRejected { .. } => {
                Error::unauthorized(self.config.uri.clone().unwrap_or_default())
            }
            other => other,
        })
    }

    /// GET `uri`, sending `params` as query parameters
    pub async fn get(
        &self,
        uri: &str,
        params: &[(&str, &str)],
        options: &RequestOptions,
    ) -> Result<AuthenticatedResponse> {
        self.request(Method::GET, uri, params, options).await
    }

    /// POST `params` as a form body to `uri`
    pub async fn post(
        &self,
        uri: &str,
        params: &[(&str, &str)],
        options: &RequestOptions,
    ) -> Result<AuthenticatedResponse> {
        self.request(Method::POST, uri, params, options).await
    }

    /// PUT `params` as a form body to `uri`
    pub async fn put(
        &self,
        uri: &str,
        params: &[(&str, &str)],
        options: &RequestOptions,
    ) -> Result<AuthenticatedResponse> {
        self.request(Method::PUT, uri, params, options).await
    }

    /// DELETE `uri`, sending `params` as query parameters
    pub async fn delete(
        &self,
        uri: &str,
        params: &[(&str, &str)],
        options: &RequestOptions,
    ) -> Result<AuthenticatedResponse> {
        self.request(Method::DELETE, uri, params, options).await
    }

    /// Issue an authenticated request with an arbitrary method
    ///
    /// POST, PUT and PATCH send `params` as a form body; every other method
    /// appends them to the query string before a ticket is requested.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        params: &[(&str, &str)],
        options: &RequestOptions,
    ) -> Result<AuthenticatedResponse> {
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();

        let call = if sends_body(&method) {
            Call {
                method,
                uri: uri.to_string(),
                form: params,
                options,
            }
        } else {
            Call {
                method,
                uri: with_query(uri, &params),
                form: Vec::new(),
                options,
            }
        };

        self.execute(&call).await
    }

    /// Obtain a service ticket for `uri` (or the configured service)
    pub async fn service_ticket(&self, uri: Option<&str>) -> Result<ServiceTicket> {
        self.tickets.service_ticket(uri).await
    }

    /// Delete the held TGT on the CAS server
    pub async fn destroy(&self) -> Result<()> {
        self.tickets.destroy().await
    }

    /// The currently held TGT
    pub async fn tgt(&self) -> Option<TicketGrantingTicket> {
        self.tickets.tgt().await
    }

    /// Snapshot of the session cookie jar
    pub async fn cookies(&self) -> SessionCookieJar {
        self.cookies.read().await.clone()
    }

    /// The effective configuration
    pub fn config(&self) -> &CasConfig {
        &self.config
    }

    /// The ticket manager backing this client
    pub fn tickets(&self) -> &TicketManager {
        &self.tickets
    }

    async fn execute(&self, call: &Call<'_>) -> Result<AuthenticatedResponse> {
        if self.config.use_cookies {
            let jar = self.cookies().await;
            if !jar.is_empty() {
                match self.execute_with_cookies(call, jar.clone()).await {
                    Err(Error::Unauthorized { .. }) => {
                        warn!(
                            "Session cookies rejected for {} {}, falling back to a service ticket",
                            call.method, call.uri
                        );
                        self.invalidate_cookies(&jar).await;
                    }
                    result => return result,
                }
            }
        }

        self.execute_with_ticket(call).await
    }

    async fn execute_with_cookies(
        &self,
        call: &Call<'_>,
        jar: SessionCookieJar,
    ) -> Result<AuthenticatedResponse> {
        debug!("{} {} with session cookies", call.method, call.uri);

        let request = self.build_request(call, call.uri.clone(), None).cookies(jar);
        let response = self.transport.execute(request).await?;
        let response = check_response(&call.uri, response)?;

        Ok(AuthenticatedResponse::new(response, None))
    }

    async fn execute_with_ticket(&self, call: &Call<'_>) -> Result<AuthenticatedResponse> {
        let ticket = self.tickets.service_ticket(Some(&call.uri)).await?;
        debug!("{} {} with a service ticket", call.method, call.uri);

        let request = match self.config.ticket_header.as_deref() {
            Some(name) => {
                self.build_request(call, call.uri.clone(), Some((name, ticket.value())))
            }
            None => self.build_request(call, append_ticket(&call.uri, ticket.value()), None),
        };

        let response = self.transport.execute(request).await?;

        if call.method == Method::POST
            && response.class() == StatusClass::Redirect
            && !response.cookies().is_empty()
        {
            debug!(
                "POST {} redirected with a new session, retrying with cookies",
                call.uri
            );
            let jar = response.cookies().clone();
            self.store_cookies(jar.clone()).await;

            let retried = self.execute_with_cookies(call, jar).await?;
            return Ok(AuthenticatedResponse::new(retried.into_inner(), Some(ticket)));
        }

        let response = check_response(&call.uri, response)?;
        self.store_cookies(response.cookies().clone()).await;

        Ok(AuthenticatedResponse::new(response, Some(ticket)))
    }

    /// Build the transport request for `call`
    ///
    /// Header precedence: configured headers, then request options, then the
    /// ticket header. Names compare case-insensitively, so each header is
    /// sent once.
    fn build_request(
        &self,
        call: &Call<'_>,
        url: String,
        ticket_header: Option<(&str, &str)>,
    ) -> TransportRequest {
        let mut headers = BTreeMap::new();
        for (name, value) in self.config.headers.iter().chain(&call.options.headers) {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }
        if let Some((name, value)) = ticket_header {
            headers.insert(name.to_ascii_lowercase(), value.to_string());
        }

        let request = TransportRequest::new(call.method.clone(), url).headers(headers);

        if call.form.is_empty() {
            request
        } else {
            request.form(call.form.clone())
        }
    }

    async fn store_cookies(&self, jar: SessionCookieJar) {
        *self.cookies.write().await = jar;
    }

    /// Clear the jar, unless a concurrent request already replaced it
    async fn invalidate_cookies(&self, rejected: &SessionCookieJar) {
        let mut cookies = self.cookies.write().await;
        if *cookies == *rejected {
            *cookies = SessionCookieJar::new();
        }
    }
}

impl std::fmt::Debug for CasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CasClient")
            .field("tickets", &self.tickets)
            .field("use_cookies", &self.config.use_cookies)
            .field("ticket_header", &self.config.ticket_header)
            .finish_non_exhaustive()
    }
}

/// Append `ticket=<value>` to `uri`, respecting an existing query string
pub(crate) fn append_ticket(uri: &str, ticket: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    let encoded: String = form_urlencoded::byte_serialize(ticket.as_bytes()).collect();
    format!("{uri}{separator}ticket={encoded}")
}

/// Serialize `params` onto `uri`'s query string, after any existing query
pub(crate) fn with_query(uri: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return uri.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}{query}")
}

/// Whether `params` travel in the body rather than the query string
fn sends_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Map a non-success response to the matching error
fn check_response(uri: &str, response: TransportResponse) -> Result<TransportResponse> {
    match response.class() {
        StatusClass::Success => Ok(response),
        StatusClass::Unauthorized => Err(Error::unauthorized(uri)),
        StatusClass::Redirect => Err(Error::RedirectUnhandled {
            status: response.status(),
            location: response.location().unwrap_or_default().to_string(),
        }),
        _ => Err(Error::http_status(response.status(), response.into_body())),
    }
}
