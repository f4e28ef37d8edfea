//! Valuation tunables
//!
//! Every rate and threshold the engine uses lives here so a jurisdiction can
//! retune them from the `[valuation]` TOML table without touching the
//! algorithm. Defaults reproduce the stock rate table.

use serde::Deserialize;

use ptax_common::{Error, Result};

/// All valuation settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    pub filter: FilterThresholds,
    pub rates: AdjustmentRates,
    /// Fraction trimmed from EACH end of the sorted adjusted prices
    pub trim_fraction: f64,
    pub confidence: ConfidenceThresholds,
    pub blend: BlendSettings,
    /// Percentage band (either side of zero) considered a fair assessment
    pub verdict_tolerance_pct: f64,
    /// Effective property-tax rate applied to the over-assessment
    pub tax_rate: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            filter: FilterThresholds::default(),
            rates: AdjustmentRates::default(),
            trim_fraction: 0.2,
            confidence: ConfidenceThresholds::default(),
            blend: BlendSettings::default(),
            verdict_tolerance_pct: 5.0,
            tax_rate: 0.055,
        }
    }
}

/// Similarity, recency and distance limits for candidate comparables
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterThresholds {
    /// Allowed living-area ratio is `[1 - size_tolerance, 1 + size_tolerance]`
    pub size_tolerance: f64,
    pub max_bedroom_difference: u32,
    pub max_bathroom_difference: f64,
    /// Allowed lot-size ratio is `[1 - lot_tolerance, 1 + lot_tolerance]`
    pub lot_tolerance: f64,
    pub max_distance_miles: f64,
    pub max_sale_age_months: u32,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            size_tolerance: 0.20,
            max_bedroom_difference: 1,
            max_bathroom_difference: 1.0,
            lot_tolerance: 0.25,
            max_distance_miles: 1.0,
            max_sale_age_months: 6,
        }
    }
}

/// Dollar value of one unit of each feature difference
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdjustmentRates {
    pub per_sqft: f64,
    pub per_bedroom: f64,
    pub per_bathroom: f64,
    pub per_acre: f64,
    pub per_year: f64,
}

impl Default for AdjustmentRates {
    fn default() -> Self {
        Self {
            per_sqft: 150.0,
            per_bedroom: 25_000.0,
            per_bathroom: 15_000.0,
            per_acre: 50_000.0,
            per_year: 1_000.0,
        }
    }
}

/// Minimum comparable counts for each confidence tier
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub high_min: usize,
    pub medium_min: usize,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high_min: 5,
            medium_min: 3,
        }
    }
}

/// AVM blending for thin comparable evidence
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlendSettings {
    /// Blend only below this many comparables
    pub min_comparables: usize,
    /// Weight given to the comparable-derived value (AVM gets the remainder)
    pub comparable_weight: f64,
}

impl Default for BlendSettings {
    fn default() -> Self {
        Self {
            min_comparables: 3,
            comparable_weight: 0.7,
        }
    }
}

impl ValuationConfig {
    /// Reject settings the algorithm cannot work with
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, msg: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::Config(format!("valuation: {}", msg)))
            }
        }

        let f = &self.filter;
        check((0.0..1.0).contains(&f.size_tolerance), "filter.size_tolerance must be in [0, 1)")?;
        check((0.0..1.0).contains(&f.lot_tolerance), "filter.lot_tolerance must be in [0, 1)")?;
        check(f.max_bathroom_difference >= 0.0, "filter.max_bathroom_difference must be >= 0")?;
        check(f.max_distance_miles > 0.0, "filter.max_distance_miles must be > 0")?;

        let r = &self.rates;
        for (name, rate) in [
            ("per_sqft", r.per_sqft),
            ("per_bedroom", r.per_bedroom),
            ("per_bathroom", r.per_bathroom),
            ("per_acre", r.per_acre),
            ("per_year", r.per_year),
        ] {
            check(rate.is_finite() && rate >= 0.0, &format!("rates.{} must be a non-negative number", name))?;
        }

        check((0.0..0.5).contains(&self.trim_fraction), "trim_fraction must be in [0, 0.5)")?;
        check(
            self.confidence.high_min >= self.confidence.medium_min,
            "confidence.high_min must be >= confidence.medium_min",
        )?;
        check(
            (0.0..=1.0).contains(&self.blend.comparable_weight),
            "blend.comparable_weight must be in [0, 1]",
        )?;
        check(self.verdict_tolerance_pct >= 0.0, "verdict_tolerance_pct must be >= 0")?;
        check((0.0..1.0).contains(&self.tax_rate), "tax_rate must be in [0, 1)")?;
        Ok(())
    }
}
