//! Ticket module
//!
//! Implements the CAS REST ticket-granting flow:
//!
//! 1. `POST {uri}` with credentials → `201 Created`, `Location: {uri}/TGT-...`
//! 2. `POST {tgt}` with `service=...` → `200 OK`, body `ST-...`
//! 3. `DELETE {tgt}` to log out
//!
//! A 404 in step 2 means the TGT expired server-side; the manager renews it
//! once and retries.

mod manager;
mod types;

pub use manager::TicketManager;
pub use types::{ServiceTicket, TicketGrantingTicket};

#[cfg(test)]
mod tests;
