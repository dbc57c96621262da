//! Configuration module
//!
//! Loads the CAS client configuration from YAML and merges explicit
//! overrides. Loading is an explicit call with an explicit environment name;
//! nothing is looked up from ambient process state.

mod loader;
mod types;

pub use loader::{load_config, load_config_from_str, try_load_config, DEFAULT_CONFIG_PATH};
pub use types::{CasConfig, ConfigOverrides, TransportOptions};
