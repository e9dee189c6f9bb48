use crate::allocator::{CodeAllocator, DEFAULT_MAX_GENERATION_ATTEMPTS};
use async_trait::async_trait;
use snip_cache::BestEffortCache;
use snip_core::{Repository, Shortener, ShortenerError, StorageError, UrlCache, UrlMapping};
use snip_generator::Generator;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_INSERT_ATTEMPTS: u32 = 4;

/// Retry budgets for the write path.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ShortenerConfig {
    /// Candidates drawn per allocation before giving up.
    #[builder(default = DEFAULT_MAX_GENERATION_ATTEMPTS)]
    pub max_generation_attempts: u32,
    /// Allocate-then-insert rounds tolerated when the store reports a
    /// duplicate key.
    #[builder(default = DEFAULT_MAX_INSERT_ATTEMPTS)]
    pub max_insert_attempts: u32,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the [`Shortener`] trait.
///
/// Each call allocates a fresh code, inserts the mapping, and writes it
/// through to the cache so the first redirect is a cache hit. The store is
/// the only arbiter of uniqueness: a duplicate key on insert restarts
/// allocation.
pub struct ShortenerService<R, G, C> {
    repository: R,
    allocator: CodeAllocator<G>,
    cache: BestEffortCache<C>,
    max_insert_attempts: u32,
}

impl<R: Repository, G: Generator, C: UrlCache> ShortenerService<R, G, C> {
    pub fn new(
        repository: R,
        generator: G,
        cache: BestEffortCache<C>,
        config: ShortenerConfig,
    ) -> Self {
        Self {
            repository,
            allocator: CodeAllocator::new(generator, config.max_generation_attempts),
            cache,
            max_insert_attempts: config.max_insert_attempts.max(1),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn validate_url(long_url: &str) -> Result<(), ShortenerError> {
        if long_url.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }
        // The URL is echoed back as a Location header on redirect.
        if long_url.chars().any(|c| c.is_ascii_control()) {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot contain control characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Repository, G: Generator, C: UrlCache> Shortener for ShortenerService<R, G, C> {
    async fn shorten(&self, long_url: String) -> Result<UrlMapping, ShortenerError> {
        Self::validate_url(&long_url)?;

        let mut long_url = long_url;
        for attempt in 1..=self.max_insert_attempts {
            let short_code = self.allocator.allocate(&self.repository).await?;
            let mapping = UrlMapping {
                short_code,
                long_url,
            };

            match self.repository.insert(&mapping).await {
                Ok(()) => {
                    self.cache
                        .prime(&mapping.short_code, &mapping.long_url)
                        .await;
                    info!(code = %mapping.short_code, "Shortened URL");
                    return Ok(mapping);
                }
                Err(StorageError::Conflict(_)) => {
                    warn!(code = %mapping.short_code, attempt, "Short code claimed concurrently, retrying");
                    long_url = mapping.long_url;
                }
                Err(e) => return Err(ShortenerError::Unavailable(e)),
            }
        }

        Err(ShortenerError::GenerationExhausted {
            attempts: self.max_insert_attempts,
        })
    }
}
