//! API error handling
//!
//! [`AppError`] is the query-side error type; command endpoints return
//! `CommandResponse` bodies with a status derived from the error code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::order::{CommandErrorCode, CommandResponse};
use tracing::error;

/// API error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Application errors for the query endpoints
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Storage(msg) => {
                error!(target: "storage", error = %msg, "Storage error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// HTTP status for a command response, derived from its error code
pub fn command_status(response: &CommandResponse) -> StatusCode {
    let Some(error) = &response.error else {
        return StatusCode::OK;
    };
    match error.code {
        CommandErrorCode::OrderNotFound
        | CommandErrorCode::ItemNotFound
        | CommandErrorCode::RoundNotFound => StatusCode::NOT_FOUND,

        CommandErrorCode::ValidationError
        | CommandErrorCode::InvalidCoupon
        | CommandErrorCode::Overpayment
        | CommandErrorCode::NotFullyPaid
        | CommandErrorCode::DiscountBelowPaid => StatusCode::BAD_REQUEST,

        CommandErrorCode::OrderAlreadyClosed
        | CommandErrorCode::ItemAlreadySent
        | CommandErrorCode::DiscountAlreadyApplied
        | CommandErrorCode::StaleVersion => StatusCode::CONFLICT,

        CommandErrorCode::RemoteError => StatusCode::BAD_GATEWAY,

        CommandErrorCode::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,

        CommandErrorCode::InternalError
        | CommandErrorCode::StorageFull
        | CommandErrorCode::OutOfMemory
        | CommandErrorCode::StorageCorrupted => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
