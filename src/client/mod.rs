//! Client module
//!
//! [`CasClient`] wraps outbound requests to CAS-protected services. It
//! reuses the application's session cookie while it is accepted and falls
//! back to a fresh service ticket when it is not.

mod builder;
mod executor;
mod response;

pub use builder::CasClientBuilder;
pub use executor::{CasClient, RequestOptions};
pub use response::AuthenticatedResponse;
