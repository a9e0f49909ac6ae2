use crate::Generator;
use pinhole_core::shortcode::{ALPHABET, MAX_LENGTH, MIN_LENGTH};
use pinhole_core::{CoreError, ShortCode};
use rand::Rng;

pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Draws `length` symbols uniformly from the short-code alphabet.
///
/// Uses the thread-local CSPRNG, so consecutive codes are unpredictable
/// and carry no ordering or timing information.
pub fn generate(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Random fixed-length code generator.
///
/// With 64 symbols a 6 character code has 2^36 possible values, so
/// collisions stay rare until the table holds hundreds of thousands of
/// links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Creates a generator producing codes of `length` characters.
    ///
    /// Fails if `length` is outside the range a [`ShortCode`] accepts.
    pub fn new(length: usize) -> Result<Self, CoreError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(CoreError::InvalidShortCode(format!(
                "generated code length must be between {} and {}, got {}",
                MIN_LENGTH, MAX_LENGTH, length
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
        ShortCode::new_unchecked(generate(self.length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_have_requested_length_and_alphabet() {
        for length in [1, 6, 12, 20] {
            for _ in 0..200 {
                let code = generate(length);
                assert_eq!(code.len(), length);
                assert!(code.bytes().all(|b| ALPHABET.contains(&b)), "{code}");
            }
        }
    }

    #[test]
    fn generated_codes_pass_validation() {
        let generator = RandomGenerator::default();
        for _ in 0..200 {
            let code = generator.generate();
            assert!(ShortCode::new(code.as_str()).is_ok());
            assert_eq!(code.as_str().len(), DEFAULT_CODE_LENGTH);
        }
    }

    #[test]
    fn codes_are_not_repeated() {
        let generator = RandomGenerator::new(10).unwrap();
        let codes: HashSet<_> = (0..1_000).map(|_| generator.generate()).collect();
        assert_eq!(codes.len(), 1_000);
    }

    #[test]
    fn draws_from_whole_alphabet() {
        let seen: HashSet<u8> = (0..200).flat_map(|_| generate(20).into_bytes()).collect();
        // 4000 draws over 64 symbols; missing one is vanishingly unlikely.
        assert_eq!(seen.len(), ALPHABET.len());
    }

    #[test]
    fn rejects_out_of_range_length() {
        assert!(RandomGenerator::new(0).is_err());
        assert!(RandomGenerator::new(21).is_err());
        assert_eq!(RandomGenerator::new(20).unwrap().length(), 20);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}
