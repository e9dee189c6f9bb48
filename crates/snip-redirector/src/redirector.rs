use crate::{RedirectorError, Result};
use async_trait::async_trait;
use snip_core::ShortCode;

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to the long URL it was issued for.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;

    /// Resolves an unvalidated code taken from a request path.
    ///
    /// A string that is not a well-formed short code can never have been
    /// issued, so it is answered with `NotFound` without a lookup.
    async fn resolve_raw(&self, raw: &str) -> Result<String> {
        match ShortCode::new(raw) {
            Ok(code) => self.resolve(&code).await,
            Err(_) => Err(RedirectorError::NotFound(raw.to_string())),
        }
    }
}
