//! Health and readiness handlers

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::{db, error::AppResult, state::AppState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness: the process is up and serving requests
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: env!("CARGO_PKG_NAME"),
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Readiness: the database answers queries
async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    db::test_connection(state.db()).await?;

    Ok(Json(HealthResponse {
        service: env!("CARGO_PKG_NAME"),
        status: "ready",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

/// Health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
}
