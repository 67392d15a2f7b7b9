//! Request-level error type
//!
//! Handlers return `AppError`; the `IntoResponse` impl maps it to an
//! HTTP status. Internal failures (database, template, mail transport)
//! are logged and surface as 500 with no detail leaked to the client.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::services::post::PostServiceError;
use crate::theme::ThemeError;

/// Error type for the page handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Unknown post, tag, or detail lookup
    #[error("Not found")]
    NotFound,

    /// Any internal failure: database, template, mail transport
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<PostServiceError> for AppError {
    fn from(err: PostServiceError) -> Self {
        match err {
            PostServiceError::NotFound(what) => {
                tracing::debug!(%what, "lookup missed");
                AppError::NotFound
            }
            PostServiceError::Internal(e) => AppError::Internal(e),
        }
    }
}

impl From<ThemeError> for AppError {
    fn from(err: ThemeError) -> Self {
        AppError::Internal(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Html("<h1>404 Not Found</h1>".to_string()),
            )
                .into_response(),
            AppError::Internal(err) => {
                tracing::error!("request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>500 Internal Server Error</h1>".to_string()),
                )
                    .into_response()
            }
        }
    }
}
