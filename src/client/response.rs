//! Authenticated response wrapper

use crate::error::Result;
use crate::session::SessionCookieJar;
use crate::ticket::ServiceTicket;
use crate::transport::TransportResponse;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

/// A response to an authenticated request, plus the ticket that produced it
///
/// `ticket` is `None` when the request went through on session cookies alone.
#[derive(Debug, Clone)]
pub struct AuthenticatedResponse {
    response: TransportResponse,
    ticket: Option<ServiceTicket>,
}

impl AuthenticatedResponse {
    pub(crate) fn new(response: TransportResponse, ticket: Option<ServiceTicket>) -> Self {
        Self { response, ticket }
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.response.status()
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Cookies set by the response
    pub fn cookies(&self) -> &SessionCookieJar {
        self.response.cookies()
    }

    /// Response body text
    pub fn body(&self) -> &str {
        self.response.body()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        self.response.json()
    }

    /// The service ticket attached to the request, if one was used
    pub fn ticket(&self) -> Option<&ServiceTicket> {
        self.ticket.as_ref()
    }

    /// The underlying transport response
    pub fn inner(&self) -> &TransportResponse {
        &self.response
    }

    /// Consume the wrapper, returning the transport response
    pub fn into_inner(self) -> TransportResponse {
        self.response
    }
}
