//! ptax-va library - Valuation & Assessment check service
//!
//! Estimates a property's market value from comparable sales, compares it
//! with the assessed value and reports whether an appeal is worth filing.
//!
//! - [`valuation`]: the pure comparable-sales engine
//! - [`providers`]: property data and AVM sources
//! - [`api`]: axum handlers over both

pub mod api;
pub mod config;
pub mod error;
pub mod providers;
pub mod valuation;

pub use crate::config::ServiceConfig;
pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::providers::{PropertyDataProvider, ValuationProvider};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Subject lookup and comparable-sale search
    pub property_provider: Arc<dyn PropertyDataProvider>,
    /// Optional AVM source; `None` disables blending
    pub valuation_provider: Option<Arc<dyn ValuationProvider>>,
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(
        property_provider: Arc<dyn PropertyDataProvider>,
        valuation_provider: Option<Arc<dyn ValuationProvider>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            property_provider,
            valuation_provider,
            config: Arc::new(config),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::analysis_routes())
        .merge(api::property_routes())
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
