//! Confidence tier from comparable count

use serde::{Deserialize, Serialize};

use super::config::ConfidenceThresholds;

/// Qualitative support for the market value estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::High => "high",
        }
    }
}

/// Map a comparable count to a tier (defaults: >=5 high, 3-4 medium, <3 low)
pub fn score(sample_size: usize, thresholds: &ConfidenceThresholds) -> ConfidenceLevel {
    if sample_size >= thresholds.high_min {
        ConfidenceLevel::High
    } else if sample_size >= thresholds.medium_min {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}
