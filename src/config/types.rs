//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

use crate::common::types::{Exchange, TradingMode};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Per-exchange settings, keyed by exchange identifier
    #[serde(default)]
    pub exchanges: BTreeMap<Exchange, ExchangeConfig>,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    /// Settings for one exchange (defaults when not configured)
    pub fn exchange(&self, exchange: Exchange) -> ExchangeConfig {
        self.exchanges.get(&exchange).cloned().unwrap_or_default()
    }

    /// How long to wait before checking an order's fill on this exchange
    pub fn fill_wait_time(&self, exchange: Exchange) -> Duration {
        let seconds = self
            .exchanges
            .get(&exchange)
            .and_then(|c| c.fill_wait_time_seconds)
            .unwrap_or(self.settings.fill_wait_time_seconds);
        Duration::from_secs(seconds)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Exchange configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// API key for authenticated requests
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signing requests
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Base URL for the REST API (exchange default when absent)
    #[serde(default)]
    pub rest_url: Option<String>,
    /// Accepted order sides
    #[serde(default)]
    pub mode: TradingMode,
    /// Override of `settings.fill_wait_time_seconds`
    #[serde(default)]
    pub fill_wait_time_seconds: Option<u64>,
}

impl ExchangeConfig {
    /// Complete credential set, if configured
    pub fn credentials(&self) -> Option<ApiCredentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some(ApiCredentials::new(key.clone(), secret.clone()))
            }
            _ => None,
        }
    }
}

/// Default endpoint of exchanges served by the `/fapi` futures REST client
///
/// `None` means no adapter in this crate speaks the exchange's API.
pub fn default_rest_url(exchange: Exchange) -> Option<&'static str> {
    match exchange {
        Exchange::Aster => Some("https://fapi.asterdex.com"),
        _ => None,
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Window in which identical alerts are ignored
    #[serde(default = "default_dedupe_ttl")]
    pub dedupe_ttl_ms: u64,
    /// Position refresh interval
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Grace period before an unfilled order is cancelled
    #[serde(default = "default_fill_wait_time")]
    pub fill_wait_time_seconds: u64,
    /// Minimum profit (percent) required before a closing order is sent
    #[serde(default)]
    pub minimum_profit_percent: Option<Decimal>,
    /// Directory for the per-exchange positions CSV files
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    /// Shared secret alerts must carry, if set
    #[serde(default)]
    pub passphrase: Option<String>,
    /// Exchange request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dedupe_ttl_ms: default_dedupe_ttl(),
            poll_interval_seconds: default_poll_interval(),
            fill_wait_time_seconds: default_fill_wait_time(),
            minimum_profit_percent: None,
            export_dir: default_export_dir(),
            passphrase: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl AppSettings {
    pub fn dedupe_ttl(&self) -> Duration {
        Duration::from_millis(self.dedupe_ttl_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Level to log at; a command line value wins over the configured one
    ///
    /// Unknown level names fall back to `INFO`.
    pub fn effective_log_level(&self, cli_level: Option<&str>) -> Level {
        let name = cli_level.unwrap_or(self.log_level.as_str());
        Level::from_str(name.trim()).unwrap_or(Level::INFO)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dedupe_ttl() -> u64 {
    5000
}

fn default_poll_interval() -> u64 {
    30
}

fn default_fill_wait_time() -> u64 {
    300
}

fn default_export_dir() -> String {
    "./data/custom/exports".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// API credentials for authenticated requests
#[derive(Clone)]
pub struct ApiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}
