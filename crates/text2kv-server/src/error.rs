use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::text_response;

/// Body returned on token mismatch.
pub const AUTH_FAILED_BODY: &str = "token 有误";
/// Body returned when a plain read finds no value.
pub const NOT_FOUND_BODY: &str = "File not found";

pub type AppResult<T> = Result<T, AppError>;

/// Request-scoped failures. Each maps onto exactly one status code.
#[derive(Error, Debug)]
pub enum AppError {
    /// No key-value backend is bound to the process.
    #[error("KV 命名空间未绑定")]
    Configuration,

    #[error("token 有误")]
    Auth,

    #[error("File not found")]
    NotFound,

    #[error("Invalid base64 string")]
    Decode,

    /// Readback after a put did not match what was written.
    #[error("Content verification failed after write operation")]
    Verification,

    /// Any failure surfaced by the backend itself.
    #[error("{0}")]
    Backend(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Configuration
            | AppError::Decode
            | AppError::Verification
            | AppError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Auth | AppError::NotFound => self.to_string(),
            other => {
                tracing::error!(error = %other, "request failed");
                format!("Error: {other}")
            }
        };
        text_response(status, body, &[])
    }
}
