use async_trait::async_trait;
use snip_core::cache::{Result, UrlCache};
use snip_core::ShortCode;
use std::time::Duration;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when caching is disabled or the cache backend could not be reached
/// at startup. Every lookup misses and every write succeeds, so the services
/// run on the mapping store alone.
#[derive(Debug, Clone, Copy)]
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for NullCache {
    async fn get_url(&self, _code: &ShortCode) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_url(&self, _code: &ShortCode, _long_url: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}
