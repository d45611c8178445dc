//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to an HTTP response with an appropriate status code.
//!
//! **Security note:** Storage errors are logged with full detail but only a
//! generic message is returned to the caller so that file paths, SQL, or
//! other implementation details never leak to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the collector-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the SQLite (or other) store.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            // Client errors: the validation message itself is the body,
            // as plain text.
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m).into_response(),

            // Storage errors: log the full detail, return a generic
            // retry-later message.
            ServerError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "internal server error, please try again later",
                    })),
                )
                    .into_response()
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
