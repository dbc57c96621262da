//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CAS REST client CLI
#[derive(Parser, Debug)]
#[command(name = "cas-rest-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = crate::config::DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Environment section to read from the configuration file
    #[arg(short, long, global = true)]
    pub env: Option<String>,

    /// TGT issuance endpoint (overrides the config file)
    #[arg(long, global = true)]
    pub uri: Option<String>,

    /// Service URL (overrides the config file)
    #[arg(long, global = true)]
    pub service: Option<String>,

    /// Existing TGT, as a ticket id or full URI
    #[arg(long, global = true)]
    pub tgt: Option<String>,

    /// TGT request form field (repeatable, e.g. `--payload username=svc`)
    #[arg(long = "payload", global = true, value_parser = parse_key_value)]
    pub payload: Vec<(String, String)>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Request arguments shared by the HTTP verb commands
#[derive(clap::Args, Debug, Clone)]
pub struct RequestArgs {
    /// Target URL
    pub url: String,

    /// Request parameter (repeatable, `key=value`)
    #[arg(short, long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Request header (repeatable, `name=value`)
    #[arg(short = 'H', long = "header", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Acquire a TGT and print its location
    Connect,

    /// Print a service ticket
    Ticket {
        /// Service to request the ticket for (defaults to the configured service)
        #[arg(long = "for")]
        target: Option<String>,
    },

    /// Authenticated GET
    Get(RequestArgs),

    /// Authenticated POST
    Post(RequestArgs),

    /// Authenticated PUT
    Put(RequestArgs),

    /// Authenticated DELETE
    Delete(RequestArgs),

    /// Delete the TGT on the CAS server
    Destroy,
}

/// Parse a `key=value` argument
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}
