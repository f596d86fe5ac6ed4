//! Liveness endpoint

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

const SERVICE_NAME: &str = "calendar-api";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
}

/// GET / and GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: SERVICE_NAME,
    })
}
