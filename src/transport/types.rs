//! Transport request and response types

use crate::error::Result;
use crate::session::SessionCookieJar;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::Method;
use serde::de::DeserializeOwned;

/// Coarse classification of an HTTP status, as the ticket state machine sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 404
    NotFound,
    /// Any other 4xx
    ClientError,
    /// 5xx
    ServerError,
    /// 1xx and anything outside the standard range
    Other,
}

impl StatusClass {
    /// Classify a raw status code
    pub fn from_status(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            402..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }
}

/// A single outbound HTTP request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Full request URL, query string included
    pub url: String,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Cookies sent in a `Cookie` header
    pub cookies: SessionCookieJar,
    /// Form-encoded request body
    pub form: Option<Vec<(String, String)>>,
}

impl TransportRequest {
    /// Create a request with no parameters, headers or body
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            cookies: SessionCookieJar::new(),
            form: None,
        }
    }

    /// Add several headers
    #[must_use]
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attach session cookies
    #[must_use]
    pub fn cookies(mut self, jar: SessionCookieJar) -> Self {
        self.cookies = jar;
        self
    }

    /// Set a form-encoded body
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.form = Some(fields);
        self
    }
}

/// A fully buffered HTTP response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    status: u16,
    headers: HeaderMap,
    cookies: SessionCookieJar,
    body: String,
}

impl TransportResponse {
    /// Create a response from its parts
    pub fn new(
        status: u16,
        headers: HeaderMap,
        cookies: SessionCookieJar,
        body: impl Into<String>,
    ) -> Self {
        Self {
            status,
            headers,
            cookies,
            body: body.into(),
        }
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status classification
    pub fn class(&self) -> StatusClass {
        StatusClass::from_status(self.status)
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Cookies set by the response
    pub fn cookies(&self) -> &SessionCookieJar {
        &self.cookies
    }

    /// The `Location` header, if present and valid UTF-8
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// Response body text
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consume the response, returning the body text
    pub fn into_body(self) -> String {
        self.body
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
