//! Ticket types

use chrono::{DateTime, Utc};
use std::fmt;

/// A ticket-granting ticket: the URI of a server-side CAS session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketGrantingTicket {
    location: String,
    acquired_at: DateTime<Utc>,
}

impl TicketGrantingTicket {
    /// Create a TGT from the location returned by the issuance endpoint
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            acquired_at: Utc::now(),
        }
    }

    /// The TGT's own URI; service tickets are requested from it
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The ticket id, i.e. the last path segment of the location
    pub fn id(&self) -> &str {
        self.location
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.location)
    }

    /// When this client obtained (or was handed) the TGT
    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}

impl fmt::Display for TicketGrantingTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location)
    }
}

/// A single-use service ticket scoped to one service URL
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceTicket {
    value: String,
    service: String,
}

impl ServiceTicket {
    /// Create a service ticket
    pub fn new(value: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            service: service.into(),
        }
    }

    /// The ticket value sent to the service
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The service the ticket was issued for
    pub fn service(&self) -> &str {
        &self.service
    }
}

// Keep ticket values out of debug logs
impl fmt::Debug for ServiceTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTicket")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ServiceTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
