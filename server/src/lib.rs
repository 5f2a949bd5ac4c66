use anyhow::Result;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use serde::Deserialize;
use songrec_core::{BuildOptions, Engine, EngineStats, RecommendationResult};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const MAX_K: usize = 50;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub dataset: PathBuf,
    pub build: BuildOptions,
    pub admin_token: Option<String>,
    /// Comma-separated allowed origins; any origin when unset or empty.
    pub cors_allow_origin: Option<String>,
}

#[derive(Deserialize)]
pub struct RecommendParams {
    pub song: String,
    pub artist: Option<String>,
    #[serde(default = "default_k")]
    pub k: i64,
}
fn default_k() -> i64 { 10 }

/// Shared handle to the live engine. Readers clone the inner `Arc` and keep
/// that engine for the whole request; a reload only replaces the handle.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<RwLock<Arc<Engine>>>,
    dataset: PathBuf,
    build: BuildOptions,
    admin_token: Option<String>,
}

impl AppState {
    pub fn new(engine: Engine, config: &ServerConfig) -> Self {
        Self {
            engine: Arc::new(RwLock::new(Arc::new(engine))),
            dataset: config.dataset.clone(),
            build: config.build.clone(),
            admin_token: config.admin_token.clone(),
        }
    }

    pub fn engine(&self) -> Arc<Engine> { self.engine.read().clone() }

    fn swap(&self, engine: Engine) { *self.engine.write() = Arc::new(engine); }
}

/// Error body is `{"detail": message}`.
#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "detail": self.1 }))).into_response()
    }
}

impl From<songrec_core::Error> for ApiError {
    fn from(err: songrec_core::Error) -> Self {
        let status = match err {
            songrec_core::Error::Validation(_) => StatusCode::BAD_REQUEST,
            songrec_core::Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, err.to_string())
    }
}

/// Build the engine from the configured dataset and wire up the routes.
/// Construction errors are returned so startup can abort.
pub fn build_app(config: ServerConfig) -> Result<Router> {
    let engine = Engine::construct_with(&config.dataset, &config.build)?;
    let state = AppState::new(engine, &config);
    Ok(router(state, config.cors_allow_origin.as_deref()))
}

pub fn router(state: AppState, cors_allow_origin: Option<&str>) -> Router {
    let origins: Vec<_> = cors_allow_origin
        .unwrap_or("")
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({ "status": "ok" })) }))
        .route("/recommend", get(recommend_handler))
        .route("/stats", get(stats_handler))
        .route("/admin/reload", post(reload_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    params: Result<Query<RecommendParams>, QueryRejection>,
) -> Result<Json<RecommendationResult>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError(StatusCode::BAD_REQUEST, rejection.body_text()))?;
    if params.k < 1 || params.k > MAX_K as i64 {
        return Err(ApiError(StatusCode::BAD_REQUEST, format!("k must be between 1 and {MAX_K}")));
    }
    let engine = state.engine();
    let result = engine.recommend(&params.song, params.k as usize, params.artist.as_deref())?;
    tracing::debug!(song = %params.song, returned = result.recommendations.len(), "recommend");
    Ok(Json(result))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<EngineStats> {
    Json(state.engine().stats())
}

async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<EngineStats>, ApiError> {
    authorize(&state, &headers)?;
    let dataset = state.dataset.clone();
    let build = state.build.clone();
    let engine = tokio::task::spawn_blocking(move || Engine::construct_with(&dataset, &build))
        .await
        .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, format!("reload task failed: {e}")))?
        .map_err(|e| {
            tracing::warn!(error = %e, "reload failed, keeping current engine");
            ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    let stats = engine.stats();
    state.swap(engine);
    tracing::info!(entries = stats.entries, "engine reloaded");
    Ok(Json(stats))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError(StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
