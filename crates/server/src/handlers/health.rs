//! Liveness endpoint.

use super::common::dir_exists;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the content root is a reachable directory.
    pub content_root: bool,
    /// Files waiting for the next notification.
    pub pending_notifications: usize,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let content_root = dir_exists(state.layout.root()).await.unwrap_or(false);
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        content_root,
        pending_notifications: state.notifier.pending_len(),
    })
}
