//! Fixture-backed provider
//!
//! Serves subject properties, sales and AVM values from a JSON document, for
//! offline runs (`ptax-va --fixture data.json`) and tests. Behaves like the
//! HTTP client at the trait boundary: unknown addresses are `NotFound`, the
//! comparable search honors radius and sale window, and the subject is never
//! returned as its own comparable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use ptax_common::models::normalize_address;
use ptax_common::time::{months_before, now};
use ptax_common::{RawComparable, SubjectProperty};

use super::{require_address, PropertyDataProvider, ProviderError, ValuationProvider};
use crate::valuation::AvmEstimate;

/// AVM value for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureValuation {
    pub address: String,
    pub value: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Fixture document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureData {
    #[serde(default)]
    pub properties: Vec<SubjectProperty>,
    #[serde(default)]
    pub sales: Vec<RawComparable>,
    #[serde(default)]
    pub valuations: Vec<FixtureValuation>,
}

pub struct FixtureProvider {
    properties: HashMap<String, SubjectProperty>,
    sales: Vec<RawComparable>,
    valuations: HashMap<String, AvmEstimate>,
}

impl FixtureProvider {
    pub fn new(data: FixtureData) -> Self {
        let properties = data
            .properties
            .into_iter()
            .map(|p| (p.address.lookup_key(), p))
            .collect();
        let valuations = data
            .valuations
            .into_iter()
            .map(|v| {
                (
                    normalize_address(&v.address),
                    AvmEstimate {
                        value: v.value,
                        confidence: v.confidence,
                    },
                )
            })
            .collect();

        Self {
            properties,
            sales: data.sales,
            valuations,
        }
    }

    /// Load a fixture document from disk
    pub fn from_file(path: &Path) -> ptax_common::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let data: FixtureData = serde_json::from_str(&content).map_err(|e| {
            ptax_common::Error::Config(format!("Invalid fixture file {}: {}", path.display(), e))
        })?;
        info!(
            path = %path.display(),
            properties = data.properties.len(),
            sales = data.sales.len(),
            valuations = data.valuations.len(),
            "Loaded fixture data"
        );
        Ok(Self::new(data))
    }
}

#[async_trait]
impl PropertyDataProvider for FixtureProvider {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn lookup_property(&self, address: &str) -> Result<SubjectProperty, ProviderError> {
        let address = require_address(address)?;
        self.properties
            .get(&normalize_address(address))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(address.to_string()))
    }

    async fn get_comparable_sales(
        &self,
        subject: &SubjectProperty,
        radius_miles: f64,
        months_back: u32,
    ) -> Result<Vec<RawComparable>, ProviderError> {
        let cutoff = months_before(now().date_naive(), months_back);
        let subject_key = subject.address.lookup_key();

        Ok(self
            .sales
            .iter()
            .filter(|sale| sale.address.lookup_key() != subject_key)
            .filter(|sale| sale.sale_date >= cutoff)
            .filter(|sale| {
                // Unknown distance is left for the engine to reject
                sale.with_distance_from(subject)
                    .distance_miles
                    .map_or(true, |d| d <= radius_miles)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ValuationProvider for FixtureProvider {
    async fn get_valuation(&self, address: &str) -> Result<AvmEstimate, ProviderError> {
        let address = require_address(address)?;
        self.valuations
            .get(&normalize_address(address))
            .copied()
            .ok_or_else(|| ProviderError::NotFound(format!("no valuation for {}", address)))
    }
}
