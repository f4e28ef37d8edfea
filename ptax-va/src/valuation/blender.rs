//! Optional AVM blending
//!
//! With thin comparable evidence (below `min_comparables`), the final value
//! hedges the comparable estimate with an independent automated valuation:
//! `w * market + (1 - w) * avm`. With enough comparables the AVM is only
//! logged for cross-checking. With no comparables at all there is nothing to
//! weight, so an available AVM stands alone.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::BlendSettings;

/// Independent automated valuation of the subject
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvmEstimate {
    pub value: f64,
    /// 0.0-1.0, derived from the provider's price range when it reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl AvmEstimate {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            confidence: None,
        }
    }

    /// Usable estimates are finite and positive
    pub fn is_usable(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

/// How the final value was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValuationMethod {
    Comparables,
    Blended,
    AvmOnly,
}

/// Final value and how it was reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blend {
    pub final_value: f64,
    pub method: ValuationMethod,
}

/// Combine the comparable-derived value with an optional AVM value
pub fn blend(
    market_value: f64,
    avm: Option<&AvmEstimate>,
    sample_size: usize,
    settings: &BlendSettings,
) -> Blend {
    let Some(avm) = avm.filter(|a| a.is_usable()) else {
        return Blend {
            final_value: market_value,
            method: ValuationMethod::Comparables,
        };
    };

    if sample_size == 0 {
        info!(avm = avm.value, "No comparables survived filtering, using AVM value");
        return Blend {
            final_value: avm.value,
            method: ValuationMethod::AvmOnly,
        };
    }

    if sample_size < settings.min_comparables {
        let w = settings.comparable_weight;
        let final_value = w * market_value + (1.0 - w) * avm.value;
        info!(
            market_value,
            avm = avm.value,
            final_value,
            sample_size,
            "Blended thin comparable evidence with AVM"
        );
        return Blend {
            final_value,
            method: ValuationMethod::Blended,
        };
    }

    debug!(
        market_value,
        avm = avm.value,
        gap_pct = (avm.value - market_value) / market_value * 100.0,
        "AVM cross-check (not blended)"
    );
    Blend {
        final_value: market_value,
        method: ValuationMethod::Comparables,
    }
}
