//! Redis Cache Backend
//!
//! `Cache` implementation over a remote Redis server. Each command runs under
//! its own timeout, created fresh per call; a command that does not answer in
//! time fails as `Unavailable`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Cmd, FromRedisValue, IntoConnectionInfo, RedisResult};
use tokio::time::timeout;
use tracing::{debug, info};

use super::entry::duration_ms;
use crate::cache::Cache;
use crate::config::CacheConfig;
use crate::error::{CacheError, CacheResult};

// == Redis Cache ==
/// Redis-backed cache. Clones share one multiplexed, auto-reconnecting
/// connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisCache {
    // == Constructor ==
    /// Connects to the backend described by `config` and verifies it answers
    /// a `PING`.
    pub async fn connect(config: &CacheConfig) -> CacheResult<Self> {
        let mut info = connection_url(&config.address)
            .as_str()
            .into_connection_info()?;
        info.redis.db = config.database;
        if !config.password.is_empty() {
            info.redis.password = Some(config.password.clone());
        }

        let client = Client::open(info)?;
        let conn = bounded(config.op_timeout, ConnectionManager::new(client)).await?;

        let cache = Self {
            conn,
            op_timeout: config.op_timeout,
        };
        let pong: String = cache.run(redis::cmd("PING")).await?;
        info!(
            address = %config.address,
            database = config.database,
            reply = %pong,
            "connected to redis"
        );

        Ok(cache)
    }

    async fn run<T: FromRedisValue>(&self, cmd: Cmd) -> CacheResult<T> {
        let mut conn = self.conn.clone();
        bounded(self.op_timeout, cmd.query_async(&mut conn)).await
    }
}

/// Accepts both `host:port` and full `redis://` / `rediss://` URIs.
fn connection_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("redis://{address}")
    }
}

fn set_command(key: &str, payload: String, ttl: Option<Duration>) -> Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(payload);
    if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
        // PX rejects 0, round sub-millisecond TTLs up
        cmd.arg("PX").arg(duration_ms(ttl).max(1));
    }
    cmd
}

/// Awaits `fut` for at most `limit`, mapping both backend errors and an
/// elapsed deadline to `Unavailable`.
async fn bounded<T, F>(limit: Duration, fut: F) -> CacheResult<T>
where
    F: Future<Output = RedisResult<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result.map_err(CacheError::from),
        Err(_) => Err(CacheError::Unavailable(format!(
            "no reply within {}ms",
            limit.as_millis()
        ))),
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn is_connected(&self) -> bool {
        match self.run::<String>(redis::cmd("PING")).await {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "redis ping failed");
                false
            }
        }
    }

    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);

        let value: Option<String> = self.run(cmd).await?;
        value.ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }

    async fn set_raw(&self, key: &str, payload: String, ttl: Option<Duration>) -> CacheResult<()> {
        self.run::<()>(set_command(key, payload, ttl)).await
    }

    async fn remove(&self, keys: &[String]) -> CacheResult<()> {
        // DEL needs at least one key
        if keys.is_empty() {
            return Ok(());
        }

        let mut cmd = redis::cmd("DEL");
        cmd.arg(keys);

        let removed: i64 = self.run(cmd).await?;
        debug!(requested = keys.len(), removed, "redis keys removed");
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut cmd = redis::cmd("KEYS");
        cmd.arg(pattern);

        self.run(cmd).await
    }
}
