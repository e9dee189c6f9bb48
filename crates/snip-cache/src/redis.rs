use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use snip_core::cache::{Result, UrlCache};
use snip_core::{CacheError, ShortCode};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

const DEFAULT_KEY_PREFIX: &str = "snip:url:";

/// A Redis-based implementation of [`UrlCache`].
///
/// Long URLs are stored as plain string values under a configurable key
/// prefix, written with `SET .. EX` so Redis expires them on its own.
/// The connection manager reconnects after Redis comes back from an outage.
#[derive(Clone)]
pub struct RedisUrlCache {
    conn: ConnectionManager,
    key_prefix: String,
}

impl std::fmt::Debug for RedisUrlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisUrlCache")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_dropped() || err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache on an established connection.
    pub fn new(conn: ConnectionManager) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A managed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(conn: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Connects to Redis and verifies the connection with a `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Initialization`] for a malformed URL and
    /// [`CacheError::Unavailable`] when the server cannot be reached.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Initialization(format!("invalid redis url: {e}")))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Unavailable(format!("failed to connect to redis: {e}")))?;

        redis::cmd("PING")
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| map_redis_error("redis PING failed", e))?;

        info!("Connected to Redis");
        Ok(Self::new(conn))
    }

    /// Generates the cache key for a short code.
    fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching mapping from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(long_url)) => {
                debug!(code = %code, "Cache hit in Redis");
                Ok(Some(long_url))
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        let key = self.cache_key(code);
        // EX takes whole seconds; a zero TTL would be rejected by Redis
        let seconds = ttl.as_secs().max(1);
        trace!(code = %code, seconds, "Storing mapping in Redis cache");

        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(&key, long_url, seconds).await {
            Ok(()) => {
                debug!(code = %code, "Cached mapping in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to cache mapping in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }
}
