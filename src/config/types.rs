//! Configuration types
//!
//! `CasConfig` is the immutable configuration a client is built from.
//! `ConfigOverrides` carries explicit caller overrides applied on top of a
//! loaded file.

use crate::error::{Error, Result};
use reqwest::header::HeaderName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// CAS client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasConfig {
    /// TGT issuance endpoint (e.g. `https://cas.example.com/cas/v1/tickets`)
    pub uri: Option<String>,

    /// Fixed service URL; when unset the request URI is used as the service
    pub service: Option<String>,

    /// Header carrying the service ticket instead of a `ticket` query parameter
    pub ticket_header: Option<String>,

    /// Static headers added to every request
    pub headers: BTreeMap<String, String>,

    /// Form fields posted when requesting a TGT (usually username/password)
    pub payload: BTreeMap<String, String>,

    /// Whether session cookies may be used instead of tickets
    pub use_cookies: bool,

    /// Transport settings, passed through to the HTTP layer untouched
    pub transport: TransportOptions,
}

impl Default for CasConfig {
    fn default() -> Self {
        Self {
            uri: None,
            service: None,
            ticket_header: None,
            headers: BTreeMap::new(),
            payload: BTreeMap::new(),
            use_cookies: true,
            transport: TransportOptions::default(),
        }
    }
}

impl CasConfig {
    /// Create a config pointing at a TGT issuance endpoint
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Apply caller overrides, returning the merged config
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        overrides.apply(&mut self);
        self
    }

    /// The TGT issuance endpoint, or an error if none is configured
    pub fn issuance_uri(&self) -> Result<&str> {
        self.uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| Error::missing_field("uri"))
    }

    /// Resolve a TGT reference into the TGT's own URI
    ///
    /// Absolute references are used as-is; bare ticket ids are joined onto
    /// the issuance endpoint.
    pub fn tgt_location(&self, reference: &str) -> Result<String> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(reference.to_string());
        }

        let base = self.issuance_uri()?.trim_end_matches('/');
        let id = reference.trim_start_matches('/');
        Ok(format!("{base}/{id}"))
    }

    /// Validate field formats that would otherwise fail deep inside a request
    pub fn validate(&self) -> Result<()> {
        if let Some(uri) = self.uri.as_deref() {
            url::Url::parse(uri).map_err(|e| Error::invalid_value("uri", e.to_string()))?;
        }

        if let Some(service) = self.service.as_deref() {
            url::Url::parse(service)
                .map_err(|e| Error::invalid_value("service", e.to_string()))?;
        }

        if let Some(name) = self.ticket_header.as_deref() {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::invalid_value("ticket_header", e.to_string()))?;
        }

        for name in self.headers.keys() {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::invalid_value("headers", format!("{name}: {e}")))?;
        }

        if let Some(proxy) = self.transport.proxy.as_deref() {
            url::Url::parse(proxy)
                .map_err(|e| Error::invalid_value("transport.proxy", e.to_string()))?;
        }

        Ok(())
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Accept invalid TLS certificates (self-signed CAS servers in test rigs)
    pub accept_invalid_certs: bool,

    /// Proxy URL for all requests
    pub proxy: Option<String>,

    /// User agent override
    pub user_agent: Option<String>,
}

impl TransportOptions {
    /// Request timeout, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Explicit overrides applied on top of a loaded configuration
///
/// Scalar fields replace the loaded value when set; `headers` and `payload`
/// are merged key by key.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub uri: Option<String>,
    pub service: Option<String>,
    pub ticket_header: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub payload: BTreeMap<String, String>,
    pub use_cookies: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create an empty set of overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the TGT issuance endpoint
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Override the service URL
    #[must_use]
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Carry tickets in the named header
    #[must_use]
    pub fn ticket_header(mut self, name: impl Into<String>) -> Self {
        self.ticket_header = Some(name.into());
        self
    }

    /// Add a static header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a TGT request form field
    #[must_use]
    pub fn payload(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Set the username/password pair posted for a TGT
    #[must_use]
    pub fn credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.payload("username", username).payload("password", password)
    }

    /// Enable or disable the cookie path
    #[must_use]
    pub fn use_cookies(mut self, enabled: bool) -> Self {
        self.use_cookies = Some(enabled);
        self
    }

    /// Override the transport timeout
    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Apply these overrides to a config in place
    pub fn apply(self, config: &mut CasConfig) {
        if let Some(uri) = self.uri {
            config.uri = Some(uri);
        }
        if let Some(service) = self.service {
            config.service = Some(service);
        }
        if let Some(name) = self.ticket_header {
            config.ticket_header = Some(name);
        }
        config.headers.extend(self.headers);
        config.payload.extend(self.payload);
        if let Some(enabled) = self.use_cookies {
            config.use_cookies = enabled;
        }
        if let Some(secs) = self.timeout_secs {
            config.transport.timeout_secs = Some(secs);
        }
    }
}
