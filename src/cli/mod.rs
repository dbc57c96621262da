//! CLI module
//!
//! Command-line interface for talking to CAS-protected services.
//!
//! # Commands
//!
//! - `connect` - Acquire a TGT and print its location
//! - `ticket` - Print a service ticket
//! - `get` / `post` / `put` / `delete` - Authenticated requests
//! - `destroy` - Log out by deleting the TGT

mod commands;
mod runner;

pub use commands::{Cli, Commands, RequestArgs};
pub use runner::Runner;
