use snip_core::{ReadRepository, ShortCode, ShortenerError};
use snip_generator::Generator;
use tracing::{debug, trace};

pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 8;

/// Draws candidates from a [`Generator`] until one is absent from the store.
///
/// The allocator only reads. A code it returns may still be claimed by a
/// concurrent writer before the caller inserts it; the store's uniqueness
/// constraint settles that race.
#[derive(Debug, Clone)]
pub struct CodeAllocator<G> {
    generator: G,
    max_attempts: u32,
}

impl<G: Generator> CodeAllocator<G> {
    pub fn new(generator: G, max_attempts: u32) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the first candidate the store does not know.
    ///
    /// Fails with [`ShortenerError::Unavailable`] if an existence check fails,
    /// and with [`ShortenerError::GenerationExhausted`] once every attempt drew
    /// a taken code.
    pub async fn allocate<R>(&self, store: &R) -> Result<ShortCode, ShortenerError>
    where
        R: ReadRepository + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let code: ShortCode = self.generator.generate().into();
            let taken = store
                .exists(&code)
                .await
                .map_err(ShortenerError::Unavailable)?;
            if !taken {
                trace!(code = %code, attempt, "Allocated short code");
                return Ok(code);
            }
            debug!(code = %code, attempt, "Candidate already taken");
        }

        Err(ShortenerError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}
