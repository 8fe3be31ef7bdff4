//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::CacheConfig;

/// Default listen address.
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Errors reading server configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Configuration for the planner server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path of the JSON feed snapshot to serve.
    pub dataset: PathBuf,
    /// Address to listen on.
    pub addr: SocketAddr,
    /// Reload the snapshot from disk this often, if set.
    pub reload: Option<Duration>,
    /// Plan result cache settings.
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Create a config for `dataset` with default settings.
    pub fn new(dataset: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            reload: None,
            cache: CacheConfig::default(),
        }
    }

    /// Read configuration from the process environment.
    ///
    /// - `PLANNER_DATASET`: snapshot path (required)
    /// - `PLANNER_ADDR`: listen address, default `127.0.0.1:3000`
    /// - `PLANNER_RELOAD_SECS`: reload period; unset or 0 disables reloading
    /// - `PLANNER_CACHE_TTL_SECS`: plan cache TTL, default 60
    /// - `PLANNER_CACHE_CAPACITY`: plan cache size, default 1000
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let dataset = get("PLANNER_DATASET").ok_or(ConfigError::Missing("PLANNER_DATASET"))?;
        let mut config = Self::new(dataset);

        let addr = get("PLANNER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        config.addr = parse("PLANNER_ADDR", addr)?;

        if let Some(secs) = get("PLANNER_RELOAD_SECS") {
            let secs: u64 = parse("PLANNER_RELOAD_SECS", secs)?;
            config.reload = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(secs) = get("PLANNER_CACHE_TTL_SECS") {
            config.cache.ttl = Duration::from_secs(parse("PLANNER_CACHE_TTL_SECS", secs)?);
        }
        if let Some(capacity) = get("PLANNER_CACHE_CAPACITY") {
            config.cache.max_capacity = parse("PLANNER_CACHE_CAPACITY", capacity)?;
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
