//! Per-feature price adjustments
//!
//! Each adjustment moves a comparable's sale price toward what the subject
//! would have sold for: a comparable that is larger/newer/has more rooms than
//! the subject gets a negative adjustment, a smaller one a positive
//! adjustment. Sign is always opposite the raw feature difference.

use serde::{Deserialize, Serialize};

use ptax_common::{RawComparable, SubjectProperty};

use super::config::AdjustmentRates;

/// Adjusted feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentKind {
    Size,
    Bedroom,
    Bathroom,
    LotSize,
    Age,
}

impl AdjustmentKind {
    /// Wire name of the adjustment
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Size => "size",
            AdjustmentKind::Bedroom => "bedroom",
            AdjustmentKind::Bathroom => "bathroom",
            AdjustmentKind::LotSize => "lotSize",
            AdjustmentKind::Age => "age",
        }
    }
}

/// Named adjustment amounts in currency units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustments {
    pub size: f64,
    pub bedroom: f64,
    pub bathroom: f64,
    pub lot_size: f64,
    pub age: f64,
}

impl Adjustments {
    /// Sum of all adjustments
    pub fn total(&self) -> f64 {
        self.size + self.bedroom + self.bathroom + self.lot_size + self.age
    }

    /// `(kind, amount)` pairs in a fixed order
    pub fn iter(&self) -> impl Iterator<Item = (AdjustmentKind, f64)> {
        [
            (AdjustmentKind::Size, self.size),
            (AdjustmentKind::Bedroom, self.bedroom),
            (AdjustmentKind::Bathroom, self.bathroom),
            (AdjustmentKind::LotSize, self.lot_size),
            (AdjustmentKind::Age, self.age),
        ]
        .into_iter()
    }
}

/// A filtered comparable with its adjustments applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedComparable {
    #[serde(flatten)]
    pub comparable: RawComparable,
    pub adjustments: Adjustments,
    pub adjusted_price: f64,
}

// -0.0 for a zero difference reads badly in JSON output
fn against(difference: f64, rate: f64) -> f64 {
    let amount = -difference * rate;
    if amount == 0.0 {
        0.0
    } else {
        amount
    }
}

/// Adjustments for one candidate relative to the subject
pub fn adjust(
    subject: &SubjectProperty,
    candidate: &RawComparable,
    rates: &AdjustmentRates,
) -> Adjustments {
    let s = &subject.characteristics;
    let c = &candidate.characteristics;

    Adjustments {
        size: against(c.living_area_sqft - s.living_area_sqft, rates.per_sqft),
        bedroom: against(c.bedrooms as f64 - s.bedrooms as f64, rates.per_bedroom),
        bathroom: against(c.bathrooms - s.bathrooms, rates.per_bathroom),
        lot_size: against(c.lot_size_acres - s.lot_size_acres, rates.per_acre),
        age: against((c.year_built - s.year_built) as f64, rates.per_year),
    }
}

/// Build the adjusted comparable: `adjusted_price = sale_price + total`
pub fn adjust_comparable(
    subject: &SubjectProperty,
    candidate: &RawComparable,
    rates: &AdjustmentRates,
) -> AdjustedComparable {
    let adjustments = adjust(subject, candidate, rates);
    AdjustedComparable {
        adjusted_price: candidate.sale_price + adjustments.total(),
        comparable: candidate.clone(),
        adjustments,
    }
}
