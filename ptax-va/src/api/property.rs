//! Address verification endpoint
//!
//! Lets a client confirm which property record an address resolves to
//! before asking for an analysis; the confirmed record can then be posted
//! back as `verifiedProperty` to skip the second lookup.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use ptax_common::SubjectProperty;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PropertyQuery {
    pub address: Option<String>,
}

/// GET /api/property?address=...
pub async fn lookup_property(
    State(state): State<AppState>,
    Query(query): Query<PropertyQuery>,
) -> ApiResult<Json<SubjectProperty>> {
    let address = query
        .address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("address query parameter is required".to_string()))?;

    let property = state.property_provider.lookup_property(&address).await?;
    info!(
        address = %address,
        resolved = %property.address.formatted(),
        provider = state.property_provider.name(),
        "Property lookup"
    );
    Ok(Json(property))
}

pub fn property_routes() -> Router<AppState> {
    Router::new().route("/api/property", get(lookup_property))
}
