//! Transport module
//!
//! The ticket manager and request executor talk HTTP only through the
//! [`Transport`] trait. Responses come back fully buffered and classified
//! into the handful of status classes the CAS protocol cares about.
//!
//! `ReqwestTransport` is the default implementation; tests and embedders can
//! supply their own.

mod client;
mod types;

pub use client::ReqwestTransport;
pub use types::{StatusClass, TransportRequest, TransportResponse};

use crate::error::Result;
use async_trait::async_trait;

/// Issues a single HTTP request
///
/// Implementations must not follow redirects and must not retry on their
/// own account beyond what their timeout policy implies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the request and buffer the full response
    ///
    /// Non-2xx statuses are returned as responses, not errors. Errors are
    /// reserved for failures to complete the exchange.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse>;
}
