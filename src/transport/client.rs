//! reqwest-backed transport
//!
//! Redirects are never followed: the executor needs to see a 3xx and its
//! `Set-Cookie` headers to establish a session after a POST. Cookies are
//! managed by the executor, so the reqwest cookie store stays off and the
//! `Cookie` header is written from the request's jar.

use super::types::{TransportRequest, TransportResponse};
use super::Transport;
use crate::config::TransportOptions;
use crate::error::{Error, Result};
use crate::session::SessionCookieJar;
use async_trait::async_trait;
use reqwest::header::COOKIE;
use reqwest::{redirect, Client, Proxy};
use std::time::Duration;
use tracing::debug;

/// Default request timeout when none is configured
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport over a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Build a transport from the configured options
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let timeout = options.timeout().unwrap_or(DEFAULT_TIMEOUT);
        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("cas-rest-client/{}", env!("CARGO_PKG_VERSION")));

        let mut builder = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .user_agent(user_agent);

        if options.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(proxy) = options.proxy.as_deref() {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            timeout,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse> {
        let TransportRequest {
            method,
            url,
            headers,
            cookies,
            form,
        } = request;

        let mut req = self.client.request(method.clone(), &url);

        for (key, value) in &headers {
            req = req.header(key.as_str(), value.as_str());
        }

        if let Some(value) = cookies.header_value() {
            req = req.header(COOKIE, value);
        }

        if let Some(fields) = form {
            req = req.form(&fields);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let cookies: SessionCookieJar = response
            .cookies()
            .map(|c| (c.name().to_string(), c.value().to_string()))
            .collect();
        let body = response.text().await?;

        // Query strings can carry service tickets
        let path = url.split('?').next().unwrap_or(&url);
        debug!("{} {} -> {}", method, path, status);
        Ok(TransportResponse::new(status, headers, cookies, body))
    }
}
