use async_trait::async_trait;
use snip_core::repository::{ReadRepository, Repository, Result, UrlMapping};
use snip_core::{ShortCode, StorageError};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// A repository decorator that bounds every call with a deadline.
///
/// A call that runs past the deadline is abandoned and reported as
/// [`StorageError::Timeout`].
#[derive(Debug, Clone)]
pub struct TimeoutRepository<R> {
    inner: R,
    timeout: Duration,
}

impl<R> TimeoutRepository<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// Returns a reference to the inner repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        code: &ShortCode,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(code = %code, operation, timeout = ?self.timeout, "Store call timed out");
                Err(StorageError::Timeout(format!(
                    "{operation} exceeded {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl<R: ReadRepository> ReadRepository for TimeoutRepository<R> {
    async fn get(&self, code: &ShortCode) -> Result<Option<String>> {
        self.bounded("get", code, self.inner.get(code)).await
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        self.bounded("exists", code, self.inner.exists(code)).await
    }
}

#[async_trait]
impl<R: Repository> Repository for TimeoutRepository<R> {
    async fn insert(&self, mapping: &UrlMapping) -> Result<()> {
        self.bounded("insert", &mapping.short_code, self.inner.insert(mapping))
            .await
    }
}
