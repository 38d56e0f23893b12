use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vtconsole_core::error::CoreError;

use crate::backend::BackendError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`BackendError`] for failed
/// backend reads. Failures inside a dialog never come through here: they
/// become dialog state instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `vtconsole_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backend could not be reached or rejected the call.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Preparation(msg) => {
                    (StatusCode::BAD_REQUEST, "PREPARATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Dispatch(msg) => {
                    (StatusCode::BAD_GATEWAY, "DISPATCH_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Backend errors ---
            AppError::Backend(err) => {
                tracing::warn!(error = %err, "Backend call failed");
                (StatusCode::BAD_GATEWAY, "BACKEND_ERROR", err.to_string())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
