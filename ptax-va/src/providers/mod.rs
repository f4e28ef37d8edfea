//! Property data providers
//!
//! Two collaborator capabilities feed the valuation engine:
//! - [`PropertyDataProvider`]: subject lookup and comparable-sale search
//! - [`ValuationProvider`]: optional automated valuation (AVM)
//!
//! AVM lookups never fail an analysis: go through [`fetch_avm`], which turns
//! every provider error into `None`.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use ptax_common::{RawComparable, SubjectProperty};

use crate::valuation::AvmEstimate;

pub mod fixture;
pub mod http_client;

pub use fixture::{FixtureData, FixtureProvider, FixtureValuation};
pub use http_client::HttpPropertyClient;

/// Provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Property not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Subject lookup and comparable-sale search
#[async_trait]
pub trait PropertyDataProvider: Send + Sync {
    /// Provider identifier for logs (e.g. "http", "fixture")
    fn name(&self) -> &'static str;

    /// Find the property record for a one-line address
    async fn lookup_property(&self, address: &str) -> Result<SubjectProperty, ProviderError>;

    /// Recent sales near the subject
    ///
    /// Empty when nothing matches; "no results" is not an error.
    async fn get_comparable_sales(
        &self,
        subject: &SubjectProperty,
        radius_miles: f64,
        months_back: u32,
    ) -> Result<Vec<RawComparable>, ProviderError>;
}

/// Automated valuation lookup
#[async_trait]
pub trait ValuationProvider: Send + Sync {
    async fn get_valuation(&self, address: &str) -> Result<AvmEstimate, ProviderError>;
}

/// AVM lookup that degrades every failure to "unavailable"
pub async fn fetch_avm(provider: Option<&dyn ValuationProvider>, address: &str) -> Option<AvmEstimate> {
    let provider = provider?;
    match provider.get_valuation(address).await {
        Ok(estimate) if estimate.is_usable() => Some(estimate),
        Ok(estimate) => {
            warn!(address = %address, value = estimate.value, "Ignoring unusable AVM value");
            None
        }
        Err(e) => {
            warn!(address = %address, error = %e, "AVM unavailable");
            None
        }
    }
}

/// Blank addresses are rejected before any upstream call
pub(crate) fn require_address(address: &str) -> Result<&str, ProviderError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        Err(ProviderError::InvalidInput("address is required".to_string()))
    } else {
        Ok(trimmed)
    }
}
