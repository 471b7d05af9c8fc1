//! Exchange identifier to adapter mapping

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use super::rest::FuturesRestClient;
use crate::common::errors::Result;
use crate::common::traits::ExchangeAdapter;
use crate::common::types::Exchange;
use crate::config::types::{default_rest_url, AppConfig};

/// Adapters available for routing, one per exchange
#[derive(Default, Clone)]
pub struct ExchangeRegistry {
    adapters: BTreeMap<Exchange, Arc<dyn ExchangeAdapter>>,
}

impl ExchangeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every exchange with a complete credential set
    ///
    /// Exchanges without credentials, or without a client that speaks
    /// their API, are left out so that neither the poller nor the router
    /// ever calls them.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut registry = Self::new();

        for exchange in Exchange::ALL {
            let exchange_config = config.exchange(exchange);
            let Some(credentials) = exchange_config.credentials() else {
                if exchange_config.api_key.is_some() || exchange_config.api_secret.is_some() {
                    warn!("{} has an incomplete API key/secret pair, skipping", exchange);
                }
                continue;
            };

            let Some(default_url) = default_rest_url(exchange) else {
                warn!(
                    "{} credentials are set but no REST adapter supports it, skipping",
                    exchange
                );
                continue;
            };
            let base_url = exchange_config.rest_url.as_deref().unwrap_or(default_url);
            let client = FuturesRestClient::with_timeout(
                exchange,
                base_url,
                credentials,
                config.settings.request_timeout(),
            )?;
            registry.register(Arc::new(client));
        }

        info!(
            "Registered exchanges: [{}]",
            registry
                .exchanges()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(registry)
    }

    /// Add or replace the adapter for its exchange
    pub fn register(&mut self, adapter: Arc<dyn ExchangeAdapter>) {
        self.adapters.insert(adapter.exchange(), adapter);
    }

    pub fn get(&self, exchange: Exchange) -> Option<Arc<dyn ExchangeAdapter>> {
        self.adapters.get(&exchange).cloned()
    }

    pub fn adapters(&self) -> impl Iterator<Item = &Arc<dyn ExchangeAdapter>> {
        self.adapters.values()
    }

    pub fn exchanges(&self) -> impl Iterator<Item = Exchange> + '_ {
        self.adapters.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
