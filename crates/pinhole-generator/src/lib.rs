pub mod random;

pub use random::{generate, RandomGenerator, DEFAULT_CODE_LENGTH};

use pinhole_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// A generated code is only a candidate: uniqueness is settled by the
/// repository when the code is inserted.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortCode>;

    /// Produces the next candidate short code.
    fn generate(&self) -> Self::Output;
}
