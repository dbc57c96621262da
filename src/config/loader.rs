//! YAML configuration loading
//!
//! A config file is either a flat mapping of options or a mapping keyed by
//! deployment environment, each entry holding the flat mapping:
//!
//! ```yaml
//! production:
//!   uri: https://cas.example.com/cas/v1/tickets
//!   payload:
//!     username: svc-account
//!     password: secret
//! ```
//!
//! Unrecognised top-level scalars are TGT form fields too, so
//! `username: svc-account` may sit directly beside `uri:`.

use super::types::CasConfig;
use crate::error::{Error, Result, ResultExt};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Default config file location, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/cas_rest_client.yml";

/// Top-level keys read into `CasConfig` fields
const CONFIG_KEYS: &[&str] = &[
    "uri",
    "service",
    "ticket_header",
    "headers",
    "payload",
    "use_cookies",
    "transport",
];

/// Load a config file, falling back to an empty config on any failure
///
/// A missing file, unreadable YAML or an absent environment section all
/// yield `CasConfig::default()` so a client can still be built from explicit
/// overrides.
pub fn load_config(path: impl AsRef<Path>, environment: Option<&str>) -> CasConfig {
    let path = path.as_ref();
    match try_load_config(path, environment) {
        Ok(config) => config,
        Err(e) => {
            warn!(
                "Failed to load CAS config {}: {e}, using empty configuration",
                path.display()
            );
            CasConfig::default()
        }
    }
}

/// Load a config file, returning any failure to the caller
pub fn try_load_config(path: impl AsRef<Path>, environment: Option<&str>) -> Result<CasConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read CAS config '{}'", path.display()))?;

    debug!(
        "Loading CAS config {} (environment: {})",
        path.display(),
        environment.unwrap_or("none")
    );
    load_config_from_str(&content, environment)
}

/// Parse a config from a YAML string
pub fn load_config_from_str(yaml: &str, environment: Option<&str>) -> Result<CasConfig> {
    let document: Value = serde_yaml::from_str(yaml)?;

    let section = match environment {
        Some(env) => select_environment(document, env)?,
        None => document,
    };

    let mut mapping = match section {
        Value::Null => return Ok(CasConfig::default()),
        Value::Mapping(mapping) => mapping,
        _ => return Err(Error::config("CAS configuration must be a mapping")),
    };

    let form_fields = take_form_fields(&mut mapping);
    let mut config: CasConfig = serde_yaml::from_value(Value::Mapping(mapping))?;

    // An explicit `payload` entry wins over a top-level key of the same name
    for (key, value) in form_fields {
        config.payload.entry(key).or_insert(value);
    }

    Ok(config)
}

/// Remove every top-level key `CasConfig` does not read itself
///
/// Such keys are TGT form fields (`username: svc` next to `uri:`), so scalar
/// values are returned as strings. Anything else is dropped with a warning.
fn take_form_fields(mapping: &mut Mapping) -> BTreeMap<String, String> {
    let extra: Vec<Value> = mapping
        .keys()
        .filter(|key| !key.as_str().is_some_and(|k| CONFIG_KEYS.contains(&k)))
        .cloned()
        .collect();

    let mut fields = BTreeMap::new();
    for key in extra {
        let Some(value) = mapping.remove(&key) else {
            continue;
        };
        let Some(name) = scalar_string(&key) else {
            warn!("Ignoring non-scalar key in CAS config");
            continue;
        };
        match scalar_string(&value) {
            Some(value) => {
                debug!("Using config key '{name}' as a TGT form field");
                fields.insert(name, value);
            }
            None => warn!("Ignoring config key '{name}': form fields must be scalar values"),
        }
    }
    fields
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Pick the section for `env` out of an environment-keyed document
fn select_environment(document: Value, env: &str) -> Result<Value> {
    match document {
        Value::Mapping(mut map) => map
            .remove(env)
            .ok_or_else(|| Error::config(format!("No configuration for environment '{env}'"))),
        Value::Null => Ok(Value::Null),
        _ => Err(Error::config("CAS configuration must be a mapping")),
    }
}
