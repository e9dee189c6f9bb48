use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use snip_core::cache::{Result, UrlCache};
use snip_core::ShortCode;
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

const DEFAULT_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    long_url: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
///
/// Reads leave the deadline untouched; a write resets it.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// This implementation stores mappings in a concurrent, bounded in-process
/// cache. It suits single-node deployments where running Redis is not worth
/// it.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, Entry>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        MokaCacheConfig::builder()
            .max_capacity(max_capacity)
            .build()
            .into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> MokaCacheConfigBuilder {
        MokaCacheConfig::builder()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(entry.long_url))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            long_url: long_url.to_string(),
            ttl,
        };
        self.cache.insert(code.as_str().to_string(), entry).await;
        debug!(code = %code, ttl = ?ttl, "Cached mapping in Moka");
        Ok(())
    }
}

/// Configuration for creating a MokaUrlCache with custom settings.
#[derive(Debug, TypedBuilder)]
pub struct MokaCacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = DEFAULT_CAPACITY)]
    max_capacity: u64,
}

impl From<MokaCacheConfig> for MokaUrlCache {
    fn from(config: MokaCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        MokaUrlCache { cache }
    }
}
