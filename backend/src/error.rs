//! HTTP-facing error type. Every handler returns `Result<_, AppError>` and the
//! `ResponseError` impl turns the variant into a status code plus a JSON body of
//! the form `{ "error": "..." }`.

use crate::store::files::FileStoreError;
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before anything was written.
    #[error("{0}")]
    Validation(String),
    #[error("missing or invalid bearer token")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<FileStoreError> for AppError {
    fn from(err: FileStoreError) -> Self {
        match err {
            FileStoreError::UnsupportedType(_) | FileStoreError::Empty(_) => {
                AppError::Validation(err.to_string())
            }
            FileStoreError::Io(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Store(StoreError::AlreadyExists { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::Store(StoreError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("request failed: {}", self);
        }
        HttpResponse::build(status).json(serde_json::json!({ "error": self.to_string() }))
    }
}

/// Fallback for verbs a resource does not support.
pub async fn method_not_allowed() -> Result<HttpResponse, AppError> {
    Err(AppError::MethodNotAllowed)
}
