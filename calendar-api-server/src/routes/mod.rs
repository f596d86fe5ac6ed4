pub mod health;
pub mod versions;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use calendar_api_core::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::cors;
use crate::state::AppState;

/// Points operators at the settings and bootstrap files that usually cause failures.
pub const FAILURE_HINT: &str = "Revisa GH_OWNER, GH_REPO, GH_BRANCH, GH_TOKEN y archivos data/latest.json + data/versions/state_initial.json";

/// Build the full application: routes, 404 fallback, origin guard and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(versions::router())
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cors::origin_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of a 500 response
#[derive(Serialize)]
pub struct FailureResponse {
    pub ok: bool,
    pub error: String,
    pub hint: &'static str,
}

/// Everything a handler can fail with, mapped onto HTTP statuses.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Origin no permitido")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(err) => {
                warn!(error = %err, "request failed");
                let body = Json(FailureResponse {
                    ok: false,
                    error: err.to_string(),
                    hint: FAILURE_HINT,
                });
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Parse a request body against a route's schema.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("cuerpo JSON inválido: {}", e)))
}
