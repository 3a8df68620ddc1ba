use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
pub const DEFAULT_LOG_FILTER: &str = "stock_api=info,tower_http=info";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_filter: String,
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl AppConfig {
    /// Load from `STOCK_API_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match lookup("STOCK_API_ADDR") {
            Some(v) => parse_var("STOCK_API_ADDR", &v)?,
            None => defaults.bind_addr,
        };
        let log_filter = lookup("STOCK_API_LOG").unwrap_or(defaults.log_filter);
        let request_timeout = match lookup("STOCK_API_REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_var("STOCK_API_REQUEST_TIMEOUT_SECS", &v)?),
            None => defaults.request_timeout,
        };
        let body_limit_bytes = match lookup("STOCK_API_BODY_LIMIT_BYTES") {
            Some(v) => parse_var("STOCK_API_BODY_LIMIT_BYTES", &v)?,
            None => defaults.body_limit_bytes,
        };

        Ok(Self {
            bind_addr,
            log_filter,
            request_timeout,
            body_limit_bytes,
        })
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
