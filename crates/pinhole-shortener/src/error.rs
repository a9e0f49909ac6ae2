use pinhole_core::{CoreError, ErrorKind, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid custom code: {0}")]
    InvalidCustomCode(String),
    #[error("custom code already taken: {0}")]
    CustomCodeTaken(String),
    #[error("no free short code found after {attempts} attempts")]
    ExhaustedRetries { attempts: u32 },
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl ShortenerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShortenerError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            ShortenerError::InvalidCustomCode(_) => ErrorKind::InvalidCustomCode,
            ShortenerError::CustomCodeTaken(_) => ErrorKind::CustomCodeTaken,
            ShortenerError::ExhaustedRetries { .. } => ErrorKind::ExhaustedRetries,
            ShortenerError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Whether repeating the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ShortenerError::ExhaustedRetries { .. } | ShortenerError::Storage(_)
        )
    }
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidUrl(message) => Self::InvalidUrl(message),
            CoreError::InvalidShortCode(message) => Self::InvalidCustomCode(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_request_errors() {
        let err: ShortenerError = CoreError::InvalidUrl("x".into()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);

        let err: ShortenerError = CoreError::InvalidShortCode("x".into()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidCustomCode);
    }

    #[test]
    fn only_exhaustion_and_storage_are_transient() {
        assert!(ShortenerError::ExhaustedRetries { attempts: 5 }.is_transient());
        assert!(ShortenerError::Storage(StorageError::Timeout("t".into())).is_transient());
        assert!(!ShortenerError::CustomCodeTaken("abc".into()).is_transient());
        assert!(!ShortenerError::InvalidUrl("bad".into()).is_transient());
    }
}
