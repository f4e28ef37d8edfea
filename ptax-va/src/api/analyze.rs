//! Assessment analysis endpoint
//!
//! POST /api/analyze resolves the subject property, fetches comparable sales
//! and the AVM estimate concurrently, then runs the valuation engine.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use ptax_common::time::now;
use ptax_common::{Address, SubjectProperty};

use crate::error::{ApiError, ApiResult};
use crate::providers::fetch_avm;
use crate::valuation::{analyze, AnalysisResult};
use crate::AppState;

/// Request body for POST /api/analyze
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// One-line address as typed by the user
    #[serde(default)]
    pub address: String,
    /// Structured address from an autocomplete selection
    #[serde(default)]
    pub address_data: Option<Address>,
    /// Property record already confirmed via GET /api/property
    #[serde(default)]
    pub verified_property: Option<SubjectProperty>,
}

impl AnalysisRequest {
    /// Address used to look up the subject (structured form preferred)
    fn lookup_address(&self) -> Option<String> {
        self.address_data
            .as_ref()
            .map(Address::formatted)
            .filter(|a| !a.trim().is_empty())
            .or_else(|| Some(self.address.trim().to_string()).filter(|a| !a.is_empty()))
    }
}

/// POST /api/analyze
pub async fn analyze_property(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let subject = match request.verified_property.clone() {
        Some(property) => {
            debug!(address = %property.address.formatted(), "Using verified property");
            property
        }
        None => {
            let address = request
                .lookup_address()
                .ok_or_else(|| ApiError::BadRequest("address is required".to_string()))?;
            state.property_provider.lookup_property(&address).await?
        }
    };

    let avm_address = Some(request.address.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| subject.address.formatted());

    let provider_config = &state.config.provider;
    let (comparables, avm) = tokio::join!(
        state.property_provider.get_comparable_sales(
            &subject,
            provider_config.search_radius_miles,
            provider_config.months_back,
        ),
        fetch_avm(state.valuation_provider.as_deref(), &avm_address),
    );
    let comparables = comparables?;

    info!(
        address = %subject.address.formatted(),
        candidates = comparables.len(),
        avm = avm.is_some(),
        "Running assessment analysis"
    );

    let result = analyze(
        &subject,
        &comparables,
        avm.as_ref(),
        &state.config.valuation,
        now(),
    );
    Ok(Json(result))
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze_property))
}
