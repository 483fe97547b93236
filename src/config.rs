use crate::client::credential::Credential;
use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8001";
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:8001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid {expected}: {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("logger already initialized: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Runtime settings, read from `PREQUAL_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where `serve` listens.
    pub bind_addr: SocketAddr,
    /// Root URL of the calculation service `submit` talks to.
    pub service_url: String,
    pub request_timeout: Duration,
    pub credential: Option<Credential>,
    /// `env_logger` filter string, e.g. `info` or `prequal_engine=debug`.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8001)),
            service_url: DEFAULT_SERVICE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credential: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = read("PREQUAL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: "PREQUAL_BIND_ADDR",
            expected: "socket address",
            value: bind_raw.clone(),
        })?;

        let service_url = read("PREQUAL_SERVICE_URL")
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string())
            .trim()
            .to_string();
        if !(service_url.starts_with("http://") || service_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "PREQUAL_SERVICE_URL",
                expected: "http(s) URL",
                value: service_url,
            });
        }

        let request_timeout = match read("PREQUAL_REQUEST_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "PREQUAL_REQUEST_TIMEOUT_SECS",
                        expected: "positive number of seconds",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            bind_addr,
            service_url,
            request_timeout,
            credential: read("PREQUAL_API_TOKEN").and_then(Credential::bearer),
            log_filter: read("PREQUAL_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Install the global logger. Call once, early in `main`.
    pub fn init_logging(&self) -> Result<(), ConfigError> {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(log::LevelFilter::Info);
        builder.parse_filters(&self.log_filter);
        builder.format_timestamp_millis();
        builder.try_init()?;
        Ok(())
    }
}
