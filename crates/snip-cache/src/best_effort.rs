use snip_core::cache::UrlCache;
use snip_core::{CacheError, ShortCode, DEFAULT_TTL};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(250);

/// How the services use the lookup cache.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct CachePolicy {
    /// TTL given to every entry written by the services.
    #[builder(default = DEFAULT_TTL)]
    pub ttl: Duration,
    /// Upper bound on a single cache call.
    #[builder(default = DEFAULT_CACHE_TIMEOUT)]
    pub timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Cache access that can never fail the caller.
///
/// Every error and every timeout from the wrapped [`UrlCache`] is logged and
/// then dropped: a failed lookup reads as a miss, a failed write as done.
/// Swapping the inner cache for [`NullCache`](crate::NullCache) changes
/// latency only, never results.
#[derive(Debug, Clone)]
pub struct BestEffortCache<C> {
    inner: C,
    policy: CachePolicy,
}

impl<C: UrlCache> BestEffortCache<C> {
    pub fn new(inner: C, policy: CachePolicy) -> Self {
        Self { inner, policy }
    }

    /// Returns a reference to the wrapped cache.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Looks up the cache. Any failure is reported as a miss.
    pub async fn lookup(&self, code: &ShortCode) -> Option<String> {
        match self.bounded(self.inner.get_url(code)).await {
            Ok(Some(long_url)) => {
                debug!(code = %code, "Cache hit");
                Some(long_url)
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss");
                None
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Cache lookup failed, treating as miss");
                None
            }
        }
    }

    /// Writes a mapping with the policy TTL. Failures are logged and ignored.
    pub async fn prime(&self, code: &ShortCode, long_url: &str) {
        match self
            .bounded(self.inner.set_url(code, long_url, self.policy.ttl))
            .await
        {
            Ok(()) => trace!(code = %code, "Cache primed"),
            Err(e) => warn!(code = %code, error = %e, "Cache write failed, continuing without it"),
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, CacheError>>,
    ) -> Result<T, CacheError> {
        tokio::time::timeout(self.policy.timeout, call)
            .await
            .map_err(|_| {
                CacheError::Timeout(format!("cache call exceeded {:?}", self.policy.timeout))
            })?
    }
}
