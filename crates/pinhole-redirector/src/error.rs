use pinhole_core::{ErrorKind, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}

impl RedirectorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RedirectorError::NotFound(_) => ErrorKind::NotFound,
            RedirectorError::Storage(_) => ErrorKind::Storage,
        }
    }
}
