//! Configuration Module
//!
//! Handles loading service configuration from environment variables. The
//! resulting `Config` is built once in `main` and handed to the components
//! that need it.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::KeyScheme;

/// Which `Cache` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown cache backend: {value}")),
        }
    }
}

/// Connection settings for the remote cache backend.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// `host:port` of the backend, or a full `redis://` URI
    pub address: String,
    /// Credential, empty for none
    pub password: String,
    /// Logical database index
    pub database: i64,
    /// Upper bound for every single cache operation
    pub op_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:6379".to_string(),
            password: String::new(),
            database: 0,
            op_timeout: Duration::from_millis(500),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Selected cache backend
    pub backend: CacheBackend,
    /// Remote backend settings (ignored by the memory backend)
    pub cache: CacheConfig,
    /// TTL in seconds applied to entries populated by lookups
    pub cache_ttl: u64,
    /// How cache keys are derived for lookups
    pub key_scheme: KeyScheme,
    /// Memory backend sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: memory)
    /// - `REDIS_ADDRESS` - backend `host:port` or URI (default: 127.0.0.1:6379)
    /// - `REDIS_PASSWORD` - backend credential (default: empty)
    /// - `REDIS_DB` - logical database index (default: 0)
    /// - `CACHE_OP_TIMEOUT_MS` - per-operation timeout in ms (default: 500)
    /// - `CACHE_TTL` - TTL of populated entries in seconds (default: 300)
    /// - `CACHE_KEY_SCHEME` - `entity` or `route` (default: entity)
    /// - `CLEANUP_INTERVAL` - memory backend sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            backend: parse_var("CACHE_BACKEND").unwrap_or(defaults.backend),
            cache: CacheConfig {
                address: env::var("REDIS_ADDRESS").unwrap_or(defaults.cache.address),
                password: env::var("REDIS_PASSWORD").unwrap_or(defaults.cache.password),
                database: parse_var("REDIS_DB").unwrap_or(defaults.cache.database),
                op_timeout: parse_var("CACHE_OP_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.cache.op_timeout),
            },
            cache_ttl: parse_var("CACHE_TTL").unwrap_or(defaults.cache_ttl),
            key_scheme: parse_var("CACHE_KEY_SCHEME").unwrap_or(defaults.key_scheme),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// TTL applied to entries populated by lookups.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            backend: CacheBackend::Memory,
            cache: CacheConfig::default(),
            cache_ttl: 300,
            key_scheme: KeyScheme::Entity,
            cleanup_interval: 1,
        }
    }
}
