//! HTTP handlers.

use crate::AppState;
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use companion_chat::ChatError;
use companion_types::{ChatRequest, ChatResponse};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    /// The hosted model failed or replied with something unusable.
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::MalformedModelOutput(_) | ChatError::Model(_) => {
                ApiError::BadGateway(e.to_string())
            }
            ChatError::Voice(_) => ApiError::InternalServerError(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `GET /`.
pub async fn root() -> &'static str {
    "Hello World!"
}

/// Health check handler.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Handler for `GET /voices`. No voice catalogue is exposed.
pub async fn voices() -> Json<Vec<Value>> {
    Json(Vec::new())
}

/// Handler for `POST /chat`.
///
/// An empty body is the same as `{}` and gets the greeting.
pub async fn chat(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        ChatRequest::default()
    } else {
        serde_json::from_slice::<ChatRequest>(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid chat request: {}", e)))?
    };

    match state.pipeline.handle(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!(error = %e, "chat request failed");
            Err(e.into())
        }
    }
}
