use crate::Generator;
use rand::Rng;
use snip_core::shortcode::{ALPHABET, MAX_LENGTH};
use snip_core::{CoreError, ShortCode};

pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Draws fixed-length codes uniformly from the 62-symbol alphabet.
///
/// With the default length of 6 the code space holds 62^6 (about 56.8
/// billion) codes, so a draw rarely collides until the store is very full.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Creates a generator producing codes of `length` characters.
    pub fn new(length: usize) -> Result<Self, CoreError> {
        if length == 0 || length > MAX_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "code length must be between 1 and {}, got {}",
                MAX_LENGTH, length
            )));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_length_is_six() {
        let generator = RandomGenerator::default();
        assert_eq!(generator.generate().as_str().len(), 6);
    }

    #[test]
    fn codes_have_configured_length_and_alphabet() {
        let generator = RandomGenerator::new(10).unwrap();

        for _ in 0..200 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), 10);
            assert!(code.as_str().bytes().all(|b| ALPHABET.contains(&b)));
            // generated codes always pass validation
            assert!(ShortCode::new(code.as_str()).is_ok());
        }
    }

    #[test]
    fn rejects_invalid_lengths() {
        assert!(RandomGenerator::new(0).is_err());
        assert!(RandomGenerator::new(MAX_LENGTH + 1).is_err());
        assert!(RandomGenerator::new(MAX_LENGTH).is_ok());
    }

    #[test]
    fn draws_spread_over_the_alphabet() {
        let generator = RandomGenerator::new(1).unwrap();
        let seen: HashSet<String> = (0..5_000)
            .map(|_| generator.generate().as_str().to_string())
            .collect();

        // 5000 single-character draws miss a given symbol with probability ~1e-35
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
