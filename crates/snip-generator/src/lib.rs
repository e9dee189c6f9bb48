pub mod random;

pub use random::{RandomGenerator, DEFAULT_CODE_LENGTH};

use snip_core::ShortCode;

/// Trait for generating short code candidates.
///
/// Implementations are pure generators that don't interact with storage.
/// A candidate may collide with an existing code; the shortener checks it
/// against the store before use.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Draws the next candidate.
    fn generate(&self) -> Self::Output;
}
