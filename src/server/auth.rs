//! Admin API key check.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// Header carrying the admin key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Shared state for the admin key check.
#[derive(Clone)]
pub struct AuthState {
    api_key: Arc<str>,
}

impl AuthState {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: Arc::from(api_key),
        }
    }

    /// Whether a presented key matches the configured one.
    pub fn validate_key(&self, key: &str) -> bool {
        !self.api_key.is_empty() && key == &*self.api_key
    }
}

/// Reject requests whose `X-API-Key` header is missing or wrong.
pub async fn require_api_key(
    State(auth): State<AuthState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match api_key {
        Some(key) if auth.validate_key(key) => next.run(request).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Unauthorized" })),
        )
            .into_response(),
    }
}
