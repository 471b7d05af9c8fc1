//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;
use std::str::FromStr;

use super::types::{AppConfig, AppSettings, ExchangeConfig, ServerConfig};
use crate::common::errors::{RelayError, Result};
use crate::common::types::{Exchange, TradingMode};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_, `__` as separator)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| RelayError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| RelayError::Configuration(e.to_string()))
}

/// Load configuration from the legacy flat environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    from_lookup(|key| std::env::var(key).ok())
}

/// Build configuration from any key lookup (the process environment in production)
pub fn from_lookup<F>(lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = AppSettings::default();

    let settings = AppSettings {
        log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        dedupe_ttl_ms: parse_or("DEDUPE_TTL", &lookup, defaults.dedupe_ttl_ms)?,
        poll_interval_seconds: parse_or(
            "UPDATE_POSITIONS_INTERVAL_SECONDS",
            &lookup,
            defaults.poll_interval_seconds,
        )?,
        fill_wait_time_seconds: parse_or(
            "FILL_WAIT_TIME_SECONDS",
            &lookup,
            defaults.fill_wait_time_seconds,
        )?,
        minimum_profit_percent: parse_opt("MINIMUM_PROFIT_PERCENT", &lookup)?,
        export_dir: lookup("POSITIONS_EXPORT_DIR").unwrap_or(defaults.export_dir),
        passphrase: lookup("TRADINGVIEW_PASSPHRASE").filter(|p| !p.is_empty()),
        request_timeout_seconds: defaults.request_timeout_seconds,
    };

    let server_defaults = ServerConfig::default();
    let server = ServerConfig {
        host: lookup("HOST").unwrap_or(server_defaults.host),
        port: parse_or("PORT", &lookup, server_defaults.port)?,
    };

    let mut exchanges = std::collections::BTreeMap::new();
    for exchange in Exchange::ALL {
        let prefix = exchange.env_prefix();
        let mode = match lookup(&format!("{}_MODE", prefix)) {
            Some(raw) => TradingMode::from_str(&raw)?,
            None => TradingMode::Both,
        };
        let config = ExchangeConfig {
            api_key: lookup(&format!("{}_API_KEY", prefix)),
            api_secret: lookup(&format!("{}_API_SECRET", prefix))
                .or_else(|| lookup(&format!("{}_SECRET", prefix))),
            rest_url: lookup(&format!("{}_REST_URL", prefix)),
            mode,
            fill_wait_time_seconds: None,
        };
        exchanges.insert(exchange, config);
    }

    Ok(AppConfig {
        server,
        exchanges,
        settings,
    })
}

fn parse_opt<T, F>(key: &str, lookup: &F) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| RelayError::Configuration(format!("{}: {}", key, e))),
        _ => Ok(None),
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(key, lookup)?.unwrap_or(default))
}
