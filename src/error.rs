//! Error types for the CAS REST client
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Expected protocol conditions (an expired TGT, a rejected session cookie)
//! are distinct variants so callers never need to inspect transport errors
//! to tell a recoverable state from a terminal one.

use thiserror::Error;

/// The main error type for the CAS REST client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Ticket Errors
    // ============================================================================
    #[error("Ticket-granting ticket request rejected (HTTP {status}): {body}")]
    AuthenticationRejected { status: u16, body: String },

    #[error("Ticket-granting ticket no longer exists: {tgt}")]
    TicketExpired { tgt: String },

    #[error("Ticket-granting ticket response did not include a Location header")]
    MissingLocation,

    #[error("Empty service ticket returned for service '{service}'")]
    EmptyTicket { service: String },

    // ============================================================================
    // Request Errors
    // ============================================================================
    #[error("Unauthorized: {uri}")]
    Unauthorized { uri: String },

    #[error("Unhandled redirect (HTTP {status}) to '{location}'")]
    RedirectUnhandled { status: u16, location: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Transport error: {message}")]
    Transport { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a transport error from a message
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create an unauthorized error for the given URI
    pub fn unauthorized(uri: impl Into<String>) -> Self {
        Self::Unauthorized { uri: uri.into() }
    }

    /// True for conditions the ticket manager recovers from on its own
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::TicketExpired { .. })
    }

    /// True when the server refused the caller's credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::Unauthorized { .. } | Error::AuthenticationRejected { .. }
        )
    }

    /// True for network, timeout and unexpected-status failures
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::HttpStatus { .. }
                | Error::Timeout { .. }
                | Error::Transport { .. }
        )
    }
}

/// Result type alias for the CAS REST client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
