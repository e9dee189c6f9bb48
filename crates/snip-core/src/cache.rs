use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Lifetime of a cache entry unless configured otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// A volatile cache of short code to long URL mappings.
///
/// The cache is never authoritative. Implementations can use Redis,
/// in-process caches, or nothing at all.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get the long URL for a code.
    ///
    /// Returns `Ok(None)` both for keys that were never cached and for keys
    /// whose TTL has passed.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Store a long URL with the given TTL.
    ///
    /// The TTL is fixed when the entry is written. Reads do not extend it;
    /// a later write for the same code replaces both value and TTL.
    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()>;
}

#[async_trait]
impl<T: UrlCache + ?Sized> UrlCache for Arc<T> {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<String>> {
        (**self).get_url(code).await
    }

    async fn set_url(&self, code: &ShortCode, long_url: &str, ttl: Duration) -> Result<()> {
        (**self).set_url(code, long_url, ttl).await
    }
}
