//! Proxy routes in front of the upstream recipe API.
//!
//! Payloads are passed through unchanged; each route only adds its
//! `Cache-Control` policy.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use radar_client::Endpoint;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::state::AppState;

const SEARCH_CACHE: &str = "public, max-age=60";
const MEAL_CACHE: &str = "public, max-age=300";
const CATEGORIES_CACHE: &str = "public, max-age=3600";
const FILTER_CACHE: &str = "public, max-age=600";
const NO_STORE: &str = "no-store";

/// Build the proxy with its middleware stack: tracing, permissive CORS and
/// gzip compression.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/api/meal/{id}", get(meal))
        .route("/api/categories", get(categories))
        .route("/api/filter", get(filter))
        .route("/api/random", get(random))
        .fallback(not_found)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct FilterParams {
    #[serde(default)]
    category: String,
}

fn cached(policy: &'static str, payload: Value) -> Response {
    ([(header::CACHE_CONTROL, policy)], Json(payload)).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Response, AppError> {
    let payload = state.upstream().fetch(&Endpoint::Search { name: params.query }).await?;
    Ok(cached(SEARCH_CACHE, payload))
}

async fn meal(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, AppError> {
    let payload = state.upstream().fetch(&Endpoint::Lookup { id }).await?;
    Ok(cached(MEAL_CACHE, payload))
}

async fn categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let payload = state.categories().get(state.upstream()).await?;
    Ok(cached(CATEGORIES_CACHE, payload))
}

async fn filter(State(state): State<AppState>, Query(params): Query<FilterParams>) -> Result<Response, AppError> {
    if params.category.is_empty() {
        return Err(AppError::BadRequest("category query is required".to_string()));
    }

    let payload = state.upstream().fetch(&Endpoint::FilterByCategory { category: params.category }).await?;
    Ok(cached(FILTER_CACHE, payload))
}

async fn random(State(state): State<AppState>) -> Result<Response, AppError> {
    let payload = state.upstream().fetch(&Endpoint::Random).await?;
    Ok(cached(NO_STORE, payload))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found", "path": uri.path() })))
}
