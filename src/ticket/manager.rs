//! Ticket manager implementation
//!
//! Owns the ticket-granting ticket and turns it into service tickets.
//! Acquisition is single-flight: concurrent callers that find the TGT missing
//! or expired queue on one guard, and whoever gets it second reuses the TGT
//! the first one obtained.

use super::types::{ServiceTicket, TicketGrantingTicket};
use crate::config::CasConfig;
use crate::error::{Error, Result};
use crate::transport::{StatusClass, Transport, TransportRequest};
use reqwest::Method;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Acquires, caches and renews the TGT, and issues service tickets from it
pub struct TicketManager {
    /// Shared client configuration
    config: Arc<CasConfig>,
    /// HTTP transport
    transport: Arc<dyn Transport>,
    /// Currently held TGT
    tgt: RwLock<Option<TicketGrantingTicket>>,
    /// Serializes TGT acquisition
    acquire_guard: Mutex<()>,
}

impl TicketManager {
    /// Create a manager with no TGT; one is acquired on first use
    pub fn new(config: Arc<CasConfig>, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            tgt: RwLock::new(None),
            acquire_guard: Mutex::new(()),
        }
    }

    /// Create a manager seeded with an existing TGT
    pub fn with_tgt(
        config: Arc<CasConfig>,
        transport: Arc<dyn Transport>,
        tgt: TicketGrantingTicket,
    ) -> Self {
        Self {
            config,
            transport,
            tgt: RwLock::new(Some(tgt)),
            acquire_guard: Mutex::new(()),
        }
    }

    /// Snapshot of the currently held TGT
    pub async fn tgt(&self) -> Option<TicketGrantingTicket> {
        self.tgt.read().await.clone()
    }

    /// Request a new TGT from the issuance endpoint, replacing any held one
    ///
    /// A 400 from the server is reported as `AuthenticationRejected`; CAS
    /// answers malformed and bad-credential requests alike with it.
    pub async fn acquire_tgt(&self) -> Result<TicketGrantingTicket> {
        let _guard = self.acquire_guard.lock().await;
        self.acquire_locked().await
    }

    /// Obtain a service ticket for the configured service, or `target`
    ///
    /// If the TGT has expired server-side, a new one is acquired and the
    /// request retried once. A second failure is returned to the caller.
    pub async fn service_ticket(&self, target: Option<&str>) -> Result<ServiceTicket> {
        let service = self
            .config
            .service
            .as_deref()
            .or(target)
            .ok_or_else(|| Error::missing_field("service"))?;

        let tgt = self.current_or_acquire().await?;
        match self.request_service_ticket(&tgt, service).await {
            Err(Error::TicketExpired { .. }) => {
                warn!("TGT {} no longer exists, acquiring a new one", tgt);
                let fresh = self.replace_expired(&tgt).await?;
                self.request_service_ticket(&fresh, service).await
            }
            result => result,
        }
    }

    /// Delete the held TGT on the server
    ///
    /// The local reference is kept; the caller decides whether to discard
    /// the manager.
    pub async fn destroy(&self) -> Result<()> {
        let Some(tgt) = self.tgt().await else {
            debug!("No TGT held, nothing to destroy");
            return Ok(());
        };

        let request = TransportRequest::new(Method::DELETE, tgt.location())
            .headers(self.config.headers.clone());
        let response = self.transport.execute(request).await?;

        if response.class() != StatusClass::Success {
            return Err(Error::http_status(
                response.status(),
                response.into_body(),
            ));
        }

        info!("Destroyed TGT {}", tgt);
        Ok(())
    }

    /// Return the held TGT, acquiring one if none is held
    async fn current_or_acquire(&self) -> Result<TicketGrantingTicket> {
        if let Some(tgt) = self.tgt().await {
            return Ok(tgt);
        }

        let _guard = self.acquire_guard.lock().await;

        // Another task may have acquired while we waited
        if let Some(tgt) = self.tgt().await {
            return Ok(tgt);
        }

        self.acquire_locked().await
    }

    /// Replace `stale` with a fresh TGT unless another task already did
    async fn replace_expired(&self, stale: &TicketGrantingTicket) -> Result<TicketGrantingTicket> {
        let _guard = self.acquire_guard.lock().await;

        if let Some(current) = self.tgt().await {
            if current != *stale {
                debug!("TGT already renewed by another request");
                return Ok(current);
            }
        }

        self.acquire_locked().await
    }

    /// Acquire a TGT; the caller must hold `acquire_guard`
    ///
    /// The held TGT is only overwritten once a replacement has been issued.
    async fn acquire_locked(&self) -> Result<TicketGrantingTicket> {
        let uri = self.config.issuance_uri()?;

        let form = self
            .config
            .payload
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let request = TransportRequest::new(Method::POST, uri)
            .headers(self.config.headers.clone())
            .form(form);

        let response = self.transport.execute(request).await?;

        match response.class() {
            StatusClass::Success => {}
            StatusClass::BadRequest => {
                return Err(Error::AuthenticationRejected {
                    status: response.status(),
                    body: response.into_body(),
                });
            }
            _ => {
                return Err(Error::http_status(
                    response.status(),
                    response.into_body(),
                ));
            }
        }

        let location = response.location().ok_or(Error::MissingLocation)?;
        let tgt = TicketGrantingTicket::new(location);

        *self.tgt.write().await = Some(tgt.clone());
        info!("Acquired TGT {}", tgt);

        Ok(tgt)
    }

    /// POST the service URL to the TGT and read back the ticket
    async fn request_service_ticket(
        &self,
        tgt: &TicketGrantingTicket,
        service: &str,
    ) -> Result<ServiceTicket> {
        let request = TransportRequest::new(Method::POST, tgt.location())
            .headers(self.config.headers.clone())
            .form(vec![("service".to_string(), service.to_string())]);

        let response = self.transport.execute(request).await?;

        match response.class() {
            StatusClass::Success => {}
            StatusClass::NotFound => {
                return Err(Error::TicketExpired {
                    tgt: tgt.location().to_string(),
                });
            }
            _ => {
                return Err(Error::http_status(
                    response.status(),
                    response.into_body(),
                ));
            }
        }

        let value = response.body().trim();
        if value.is_empty() {
            return Err(Error::EmptyTicket {
                service: service.to_string(),
            });
        }

        debug!("Issued service ticket for {}", service);
        Ok(ServiceTicket::new(value, service))
    }
}

impl std::fmt::Debug for TicketManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketManager")
            .field("uri", &self.config.uri)
            .finish_non_exhaustive()
    }
}
