use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pinhole_core::{ErrorKind, StorageError};
use pinhole_redirector::RedirectorError;
use pinhole_shortener::ShortenerError;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Shorten(ShortenerError),
    Resolve(RedirectorError),
    Lookup(StorageError),
    NotFound(String),
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        AppError::Shorten(value)
    }
}

impl From<RedirectorError> for AppError {
    fn from(value: RedirectorError) -> Self {
        AppError::Resolve(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        AppError::Lookup(value)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidUrl | ErrorKind::InvalidCustomCode => StatusCode::BAD_REQUEST,
        ErrorKind::CustomCodeTaken => StatusCode::CONFLICT,
        ErrorKind::ExhaustedRetries => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (kind, message) = match self {
            AppError::Shorten(e) => (e.kind(), e.to_string()),
            AppError::Resolve(e) => (e.kind(), e.to_string()),
            AppError::Lookup(e) => (ErrorKind::Storage, e.to_string()),
            AppError::NotFound(code) => {
                (ErrorKind::NotFound, format!("short code not found: {code}"))
            }
        };

        // Storage details stay in the logs.
        let message = if kind == ErrorKind::Storage {
            error!(error = %message, "request failed on storage");
            "internal storage error".to_string()
        } else {
            message
        };

        let body = ErrorResponse {
            error_kind: kind,
            message,
        };
        (status_for(kind), Json(body)).into_response()
    }
}
