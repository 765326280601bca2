//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use super::payments::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub payments: usize,
}

/// GET /health — returns service status and the number of tracked payments.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        payments: state.registry.len(),
    })
}
