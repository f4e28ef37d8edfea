//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Module name ("ptax-va")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Active property data backend ("http" or "fixture")
    pub provider: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "ptax-va".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.property_provider.name().to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
