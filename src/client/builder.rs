//! Client builder

use super::executor::CasClient;
use crate::config::{CasConfig, ConfigOverrides};
use crate::error::Result;
use crate::ticket::{TicketGrantingTicket, TicketManager};
use crate::transport::{ReqwestTransport, Transport};
use std::sync::Arc;

/// Builder for [`CasClient`]
#[derive(Default)]
pub struct CasClientBuilder {
    config: CasConfig,
    overrides: Option<ConfigOverrides>,
    tgt: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl CasClientBuilder {
    /// Set the base configuration (usually from `load_config`)
    #[must_use]
    pub fn config(mut self, config: CasConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply explicit overrides on top of the base configuration
    #[must_use]
    pub fn overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Start from an existing TGT, given as a ticket id or its full URI
    #[must_use]
    pub fn tgt(mut self, reference: impl Into<String>) -> Self {
        self.tgt = Some(reference.into());
        self
    }

    /// Use a custom transport instead of the reqwest default
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CasClient> {
        let mut config = self.config;
        if let Some(overrides) = self.overrides {
            overrides.apply(&mut config);
        }
        config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config.transport)?),
        };

        let tgt = self
            .tgt
            .map(|reference| config.tgt_location(&reference))
            .transpose()?;

        let config = Arc::new(config);
        let tickets = match tgt {
            Some(location) => TicketManager::with_tgt(
                Arc::clone(&config),
                Arc::clone(&transport),
                TicketGrantingTicket::new(location),
            ),
            None => TicketManager::new(Arc::clone(&config), Arc::clone(&transport)),
        };

        Ok(CasClient::from_parts(config, transport, tickets))
    }
}
