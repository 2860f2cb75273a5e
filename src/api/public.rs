//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

/// Returned to callers when the upstream call fails. Details only go
/// to the server logs.
pub const UPSTREAM_ERROR_TEXT: &str = "Error al obtener respuesta de la IA";

pub enum ApiError {
    /// Malformed request, described to the caller.
    Validation(String),
    /// Upstream or internal failure, logged in full and surfaced as a
    /// generic message.
    Upstream(anyhow::Error),
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Upstream(err) => {
                tracing::error!("Relay error: {}. Root cause: {}", err, err.root_cause());

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": UPSTREAM_ERROR_TEXT })),
                )
                    .into_response()
            }
        }
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Upstream(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}
