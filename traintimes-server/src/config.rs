//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::feed::{FetchPolicy, RetryPolicy};

/// Where arrival rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// Both tables over Postgres. The secondary table lives on its own
    /// database when `secondary_url` is set, otherwise on the primary's.
    Postgres {
        primary_url: String,
        secondary_url: Option<String>,
    },

    /// A JSON rows file standing in for both sources, re-read every
    /// `reload_every`
    File {
        path: PathBuf,
        reload_every: Duration,
    },
}

/// Errors reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("neither DATABASE_URL nor MOCK_ARRIVALS_PATH is set")]
    NoArrivalSource,

    #[error("invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub source: SourceConfig,
    pub stations_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub fetch: FetchPolicy,
    pub cache: CacheConfig,
}

impl ServerConfig {
    pub const DEFAULT_STATIONS_PATH: &'static str = "data/stations.json";
    pub const DEFAULT_MOCK_RELOAD: Duration = Duration::from_secs(30);

    /// Read configuration from process environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `DATABASE_URL` | required unless `MOCK_ARRIVALS_PATH` is set |
    /// | `SECONDARY_DATABASE_URL` | same database as the primary |
    /// | `MOCK_ARRIVALS_PATH` | unset; when set, wins over `DATABASE_URL` |
    /// | `MOCK_RELOAD_SECS` | 30 |
    /// | `STATIONS_PATH` | `data/stations.json` |
    /// | `BIND_ADDR` | `127.0.0.1:3000` |
    /// | `FAILOVER_MS` | 500 |
    /// | `RETRY_ATTEMPTS` | 3 |
    /// | `RETRY_DELAY_MS` | 200 |
    /// | `CACHE_TTL_SECS` | 15 |
    ///
    /// Hosted Postgres usually requires TLS; put `?sslmode=require` on the
    /// database URLs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let source = match (get("MOCK_ARRIVALS_PATH"), get("DATABASE_URL")) {
            (Some(path), _) => {
                let reload_secs: u64 = parse_var(
                    "MOCK_RELOAD_SECS",
                    get("MOCK_RELOAD_SECS"),
                    Self::DEFAULT_MOCK_RELOAD.as_secs(),
                )?;
                if reload_secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "MOCK_RELOAD_SECS",
                        value: "0".to_string(),
                        reason: "reload period must be positive".to_string(),
                    });
                }
                SourceConfig::File {
                    path: PathBuf::from(path),
                    reload_every: Duration::from_secs(reload_secs),
                }
            }
            (None, Some(primary_url)) => SourceConfig::Postgres {
                primary_url,
                secondary_url: get("SECONDARY_DATABASE_URL"),
            },
            (None, None) => return Err(ConfigError::NoArrivalSource),
        };

        let stations_path = PathBuf::from(
            get("STATIONS_PATH").unwrap_or_else(|| Self::DEFAULT_STATIONS_PATH.to_string()),
        );
        let bind_addr = parse_var(
            "BIND_ADDR",
            get("BIND_ADDR"),
            SocketAddr::from(([127, 0, 0, 1], 3000)),
        )?;

        let defaults = FetchPolicy::default();
        let failover_ms: u64 = parse_var(
            "FAILOVER_MS",
            get("FAILOVER_MS"),
            defaults.failover_after.as_millis() as u64,
        )?;
        let attempts: u32 = parse_var(
            "RETRY_ATTEMPTS",
            get("RETRY_ATTEMPTS"),
            defaults.primary.attempts,
        )?;
        if attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "RETRY_ATTEMPTS",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }
        let delay_ms: u64 = parse_var(
            "RETRY_DELAY_MS",
            get("RETRY_DELAY_MS"),
            defaults.primary.delay.as_millis() as u64,
        )?;

        let cache_defaults = CacheConfig::default();
        let ttl_secs: u64 = parse_var(
            "CACHE_TTL_SECS",
            get("CACHE_TTL_SECS"),
            cache_defaults.ttl.as_secs(),
        )?;

        let retry = RetryPolicy::default()
            .with_attempts(attempts)
            .with_delay(Duration::from_millis(delay_ms));

        Ok(Self {
            source,
            stations_path,
            bind_addr,
            fetch: defaults
                .with_failover_after(Duration::from_millis(failover_ms))
                .with_retry(retry),
            cache: cache_defaults.with_ttl(Duration::from_secs(ttl_secs)),
        })
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
