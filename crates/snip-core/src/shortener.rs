use crate::error::ShortenerError;
use crate::repository::UrlMapping;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a new mapping for `long_url` under a freshly allocated short code.
    ///
    /// Every call creates a new code, even for a URL that was shortened before.
    async fn shorten(&self, long_url: String) -> Result<UrlMapping>;
}
