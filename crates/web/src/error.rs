use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shelfmark_db::error::StoreError;

use crate::render::RenderError;

/// Application-level error type for HTTP handlers.
///
/// Handlers intercept the domain errors they want to render as form errors
/// (duplicates, bad credentials); anything that reaches `IntoResponse`
/// here is mapped to a plain-text status response. Server-side failures are
/// logged with detail and answered with a generic body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain error from the persistence layer.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A template lookup or substitution failure.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request requires a logged-in user.
    #[error("Unauthorized")]
    Unauthorized,

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Store(store) => match store {
                StoreError::NoRecord => (StatusCode::NOT_FOUND, "Not Found".to_string()),
                // Handlers render these as form errors; reaching here means
                // a path forgot to, so answer with the closest status.
                StoreError::DuplicateUsername
                | StoreError::DuplicateEmail
                | StoreError::DuplicateIsbn => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Unprocessable Entity".to_string(),
                ),
                StoreError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
                }
                StoreError::PasswordHash(msg) => {
                    tracing::error!(error = %msg, "Password hash error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
                StoreError::Database(err) => {
                    tracing::error!(error = %err, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },

            AppError::Render(err) => {
                tracing::error!(error = %err, "Template render error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
