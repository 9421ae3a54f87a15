use std::{str::FromStr, time::Duration};

use derive_builder::Builder;

use crate::{AppError, Result};

/// Public exchange-rate API, queried as `{api_base}/{BASE}`
pub const DEFAULT_API_BASE: &str = "https://open.er-api.com/v6/latest";
pub const DEFAULT_BASE_CURRENCY: &str = "USD";
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Runtime settings of the dashboard service
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), default, build_fn(validate = "Self::validate"))]
pub struct Config {
    pub api_base: String,
    /// Base currency of the global list and the chart
    pub base_currency: String,
    pub listen_addr: String,
    pub refresh_period: Duration,
    /// Sessions neither read nor commanded for this long are dropped
    pub session_idle_timeout: Duration,
    /// HTTP requests still running after this answer 408
    pub request_timeout: Duration,
    /// Optional cap on points kept per currency series, unbounded when `None`
    pub history_limit: Option<usize>,
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            refresh_period: Duration::from_secs(1),
            session_idle_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(10),
            history_limit: None,
            log_level: tracing::Level::INFO,
        }
    }
}

impl ConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.refresh_period.is_some_and(|p| p.is_zero()) {
            return Err("refresh period must be greater than zero".to_string());
        }
        if self.session_idle_timeout.is_some_and(|t| t.is_zero()) {
            return Err("session idle timeout must be greater than zero".to_string());
        }
        if self.request_timeout.is_some_and(|t| t.is_zero()) {
            return Err("request timeout must be greater than zero".to_string());
        }
        if self
            .base_currency
            .as_ref()
            .is_some_and(|b| b.trim().is_empty())
        {
            return Err("base currency must not be empty".to_string());
        }
        Ok(())
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reads `FX_*` variables from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();
        if let Some(v) = lookup("FX_API_BASE") {
            builder.api_base(v.trim().to_string());
        }
        if let Some(v) = lookup("FX_BASE_CURRENCY") {
            builder.base_currency(v.trim().to_uppercase());
        }
        if let Some(v) = lookup("FX_LISTEN_ADDR") {
            builder.listen_addr(v.trim().to_string());
        }
        if let Some(v) = lookup("FX_REFRESH_MS") {
            let millis: u64 = parse("FX_REFRESH_MS", &v)?;
            builder.refresh_period(Duration::from_millis(millis));
        }
        if let Some(v) = lookup("FX_SESSION_IDLE_SECS") {
            let secs: u64 = parse("FX_SESSION_IDLE_SECS", &v)?;
            builder.session_idle_timeout(Duration::from_secs(secs));
        }
        if let Some(v) = lookup("FX_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse("FX_REQUEST_TIMEOUT_SECS", &v)?;
            builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(v) = lookup("FX_HISTORY_LIMIT") {
            let limit: usize = parse("FX_HISTORY_LIMIT", &v)?;
            builder.history_limit(Some(limit).filter(|l| *l > 0));
        }
        if let Some(v) = lookup("FX_LOG_LEVEL") {
            let level: tracing::Level = parse("FX_LOG_LEVEL", &v)?;
            builder.log_level(level);
        }
        builder
            .build()
            .map_err(|e| AppError::ConfigError(e.to_string()))
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| AppError::ConfigError(format!("{key}={value:?}: {e}")))
}
