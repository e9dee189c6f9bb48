use crate::redirector::Redirector;
use crate::{RedirectorError, Result};
use async_trait::async_trait;
use snip_cache::BestEffortCache;
use snip_core::{ReadRepository, ShortCode, UrlCache};
use tracing::{debug, trace};

/// Service for handling URL redirects.
///
/// Lookups are cache-aside: a cache hit never touches the store, a miss is
/// read from the store and written back with the cache policy TTL. Codes
/// absent from the store are not cached.
#[derive(Debug, Clone)]
pub struct RedirectorService<R, C> {
    repository: R,
    cache: BestEffortCache<C>,
}

impl<R: ReadRepository, C: UrlCache> RedirectorService<R, C> {
    pub fn new(repository: R, cache: BestEffortCache<C>) -> Self {
        Self { repository, cache }
    }

    pub fn cache(&self) -> &BestEffortCache<C> {
        &self.cache
    }
}

#[async_trait]
impl<R: ReadRepository, C: UrlCache> Redirector for RedirectorService<R, C> {
    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "Resolving short code");

        if let Some(long_url) = self.cache.lookup(code).await {
            return Ok(long_url);
        }

        match self.repository.get(code).await? {
            Some(long_url) => {
                self.cache.prime(code, &long_url).await;
                debug!(code = %code, "Resolved short code from store");
                Ok(long_url)
            }
            None => {
                debug!(code = %code, "Short code not found");
                Err(RedirectorError::NotFound(code.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snip_cache::{CachePolicy, MokaUrlCache, NullCache};
    use snip_core::{Repository, UrlMapping};
    use snip_storage::InMemoryRepository;
    use snip_test_infra::doubles::{CountingRepository, UnavailableCache, UnavailableRepository};
    use std::time::Duration;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    async fn seeded_store(code: &str, long_url: &str) -> CountingRepository<InMemoryRepository> {
        let repo = InMemoryRepository::new();
        repo.insert(&UrlMapping {
            short_code: ShortCode::new(code).unwrap(),
            long_url: long_url.to_string(),
        })
        .await
        .unwrap();
        CountingRepository::new(repo)
    }

    #[tokio::test]
    async fn cache_hit_skips_the_store() {
        let repo = seeded_store("abc123", "https://example.com").await;
        let cache = MokaUrlCache::new();
        cache
            .set_url(&code("abc123"), "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();
        let service = RedirectorService::new(
            repo.clone(),
            BestEffortCache::new(cache, CachePolicy::default()),
        );

        let url = service.resolve(&code("abc123")).await.unwrap();

        assert_eq!(url, "https://example.com");
        assert_eq!(repo.gets(), 0);
    }

    #[tokio::test]
    async fn cache_miss_reads_store_and_repopulates() {
        let repo = seeded_store("abc123", "https://example.com").await;
        let cache = MokaUrlCache::new();
        let service = RedirectorService::new(
            repo.clone(),
            BestEffortCache::new(cache.clone(), CachePolicy::default()),
        );

        assert_eq!(
            service.resolve(&code("abc123")).await.unwrap(),
            "https://example.com"
        );
        assert_eq!(repo.gets(), 1);
        assert_eq!(
            cache.get_url(&code("abc123")).await.unwrap().as_deref(),
            Some("https://example.com")
        );

        service.resolve(&code("abc123")).await.unwrap();
        assert_eq!(repo.gets(), 1);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found_and_not_cached() {
        let repo = CountingRepository::new(InMemoryRepository::new());
        let cache = MokaUrlCache::new();
        let service = RedirectorService::new(
            repo.clone(),
            BestEffortCache::new(cache.clone(), CachePolicy::default()),
        );

        let err = service.resolve(&code("nope42")).await.unwrap_err();

        assert!(matches!(err, RedirectorError::NotFound(ref c) if c == "nope42"));
        assert_eq!(cache.get_url(&code("nope42")).await.unwrap(), None);

        service.resolve(&code("nope42")).await.unwrap_err();
        assert_eq!(repo.gets(), 2);
    }

    #[tokio::test]
    async fn malformed_code_is_not_found_without_lookup() {
        let repo = CountingRepository::new(InMemoryRepository::new());
        let service = RedirectorService::new(
            repo.clone(),
            BestEffortCache::new(NullCache::new(), CachePolicy::default()),
        );

        let too_long = "a".repeat(33);
        for raw in ["______", "", "abc-12", too_long.as_str()] {
            let err = service.resolve_raw(raw).await.unwrap_err();
            assert!(matches!(err, RedirectorError::NotFound(_)));
        }
        assert_eq!(repo.gets(), 0);
    }

    #[tokio::test]
    async fn resolve_raw_delegates_for_valid_codes() {
        let repo = seeded_store("Zz9", "https://example.com/zz9").await;
        let service = RedirectorService::new(
            repo,
            BestEffortCache::new(NullCache::new(), CachePolicy::default()),
        );

        assert_eq!(
            service.resolve_raw("Zz9").await.unwrap(),
            "https://example.com/zz9"
        );
        assert!(matches!(
            service.resolve_raw("zz9").await,
            Err(RedirectorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn cache_outage_falls_back_to_store() {
        let repo = seeded_store("abc123", "https://example.com").await;
        let cache = UnavailableCache::new();
        let service = RedirectorService::new(
            repo.clone(),
            BestEffortCache::new(cache.clone(), CachePolicy::default()),
        );

        for _ in 0..3 {
            assert_eq!(
                service.resolve(&code("abc123")).await.unwrap(),
                "https://example.com"
            );
        }
        assert_eq!(repo.gets(), 3);
        assert_eq!(cache.calls(), 6);
    }

    #[tokio::test]
    async fn expired_entry_falls_back_to_store() {
        let repo = seeded_store("abc123", "https://example.com").await;
        let policy = CachePolicy::builder()
            .ttl(Duration::from_millis(50))
            .build();
        let service = RedirectorService::new(
            repo.clone(),
            BestEffortCache::new(MokaUrlCache::new(), policy),
        );

        service.resolve(&code("abc123")).await.unwrap();
        service.resolve(&code("abc123")).await.unwrap();
        assert_eq!(repo.gets(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        service.resolve(&code("abc123")).await.unwrap();
        assert_eq!(repo.gets(), 2);
    }

    #[tokio::test]
    async fn store_outage_is_unavailable_not_not_found() {
        let service = RedirectorService::new(
            UnavailableRepository,
            BestEffortCache::new(NullCache::new(), CachePolicy::default()),
        );

        let err = service.resolve(&code("abc123")).await.unwrap_err();

        assert!(matches!(err, RedirectorError::Unavailable(_)));
    }
}
