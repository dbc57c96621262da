//! Session cookie jar
//!
//! Holds the cookies captured from the last successful authenticated
//! response. The jar is replaced wholesale rather than merged: a CAS-protected
//! application issues a complete session on every ticket validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cookie name to value map for one application session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookieJar {
    cookies: BTreeMap<String, String>,
}

impl SessionCookieJar {
    /// Create an empty jar
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the jar holds no cookies
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Number of cookies held
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Look up a cookie value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Insert or replace a cookie
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Iterate cookies in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the jar as a `Cookie` request header value
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        let value = self
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(value)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SessionCookieJar {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cookies: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
