//! Calendar state endpoints (latest, save, restore, versions)

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use calendar_api_core::LatestPointer;
use calendar_api_core::version_path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::routes::{AppError, parse_body};
use crate::state::AppState;
use crate::versions::NewVersion;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/latest", get(latest))
        .route("/save", post(save))
        .route("/restore", post(restore))
        .route("/versions", get(list_versions))
}

#[derive(Serialize)]
pub struct LatestResponse {
    pub latest: Value,
    pub state: Value,
}

/// Request body for saving a new version
#[derive(Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub days: Option<Map<String, Value>>,
    #[serde(default)]
    pub saved_by: Option<String>,
}

impl SaveRequest {
    fn into_new_version(self) -> Result<NewVersion, AppError> {
        let year = self
            .year
            .ok_or_else(|| AppError::Validation("year requerido".to_string()))?;

        Ok(NewVersion {
            year,
            days: self.days.unwrap_or_default(),
            saved_by: self.saved_by,
        })
    }
}

#[derive(Serialize)]
pub struct SaveResponse {
    pub ok: bool,
    pub latest: LatestPointer,
    #[serde(rename = "versionPath")]
    pub version_path: String,
}

/// Request body for restoring a version
#[derive(Deserialize)]
pub struct RestoreRequest {
    #[serde(default, rename = "versionPath")]
    pub version_path: Option<String>,
}

#[derive(Serialize)]
pub struct RestoreResponse {
    pub ok: bool,
    pub latest: LatestPointer,
}

#[derive(Serialize)]
pub struct VersionsResponse {
    pub versions: Vec<String>,
}

/// GET /latest - Current pointer and the document it names
async fn latest(State(state): State<AppState>) -> Result<Json<LatestResponse>, AppError> {
    let (latest, document) = state.versions.latest().await?;
    Ok(Json(LatestResponse {
        latest,
        state: document,
    }))
}

/// POST /save - Store a new version and make it current
async fn save(State(state): State<AppState>, body: Bytes) -> Result<Json<SaveResponse>, AppError> {
    let req: SaveRequest = parse_body(&body)?;
    let new = req.into_new_version()?;

    let saved = state.versions.save(new, state.clock.now()).await?;

    Ok(Json(SaveResponse {
        ok: true,
        latest: saved.latest,
        version_path: saved.version_path,
    }))
}

/// POST /restore - Make an existing version current
async fn restore(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RestoreResponse>, AppError> {
    let req: RestoreRequest = parse_body(&body)?;
    let path = req
        .version_path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("versionPath requerido".to_string()))?;

    if !version_path::is_version_path(&path) {
        return Err(AppError::Validation("versionPath inválido".to_string()));
    }

    let latest = state.versions.restore(&path, state.clock.now()).await?;

    Ok(Json(RestoreResponse { ok: true, latest }))
}

/// GET /versions - All stored versions, newest first
async fn list_versions(
    State(state): State<AppState>,
) -> Result<Json<VersionsResponse>, AppError> {
    let versions = state.versions.list().await?;
    Ok(Json(VersionsResponse { versions }))
}
