//! Assessment verdict
//!
//! `difference = assessed - market`, `percentage = difference / assessed * 100`
//! (0 when nothing is assessed). Within the tolerance band the assessment is
//! fair; above it over-assessed, below it under-assessed. A market value of
//! zero or less means there was no evidence at all, and is reported as
//! insufficient data rather than as a 100% over-assessment. The arithmetic
//! is still reported as computed, so `difference == assessed - market` holds
//! for every result.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    OverAssessed,
    Fair,
    UnderAssessed,
    /// No usable market value. `difference` and `percentage_difference`
    /// still follow their formulas against the zero market value; no savings
    /// are claimed.
    InsufficientData,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::OverAssessed => "over-assessed",
            Verdict::Fair => "fair",
            Verdict::UnderAssessed => "under-assessed",
            Verdict::InsufficientData => "insufficient-data",
        }
    }
}

/// Assessed-vs-market comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub difference: f64,
    pub percentage_difference: f64,
    pub verdict: Verdict,
}

/// Percentage by which `assessed` exceeds `market`; 0 when `assessed <= 0`
pub fn percentage_difference(assessed: f64, market: f64) -> f64 {
    if assessed <= 0.0 {
        return 0.0;
    }
    (assessed - market) / assessed * 100.0
}

/// Compare the assessed value with the final market value
pub fn classify(assessed: f64, market: f64, tolerance_pct: f64) -> Assessment {
    let difference = assessed - market;
    let pct = percentage_difference(assessed, market);

    let verdict = if !market.is_finite() || market <= 0.0 {
        Verdict::InsufficientData
    } else if pct.abs() <= tolerance_pct {
        Verdict::Fair
    } else if pct > tolerance_pct {
        Verdict::OverAssessed
    } else {
        Verdict::UnderAssessed
    };

    Assessment {
        difference,
        percentage_difference: pct,
        verdict,
    }
}
