use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Gateway error taxonomy: invalid client input vs. backend failure.
/// Languages and health degrade silently and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),
    #[error("Translation failed: {0}")]
    Backend(String),
}

impl GatewayError {
    pub fn backend(err: anyhow::Error) -> Self {
        GatewayError::Backend(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            GatewayError::Backend(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Translation failed",
                    "details": details
                })),
            )
                .into_response(),
        }
    }
}
