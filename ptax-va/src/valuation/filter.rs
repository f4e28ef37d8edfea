//! Comparable filter
//!
//! Keeps only candidate sales similar enough to the subject to be used as
//! evidence: living area and lot size within a ratio band, bedroom and
//! bathroom counts within one, sold nearby and recently. Every predicate is
//! independent; a candidate must pass all of them. Thresholds are never
//! relaxed automatically; thin results show up as lower confidence instead.

use chrono::NaiveDate;
use std::fmt;
use tracing::debug;

use ptax_common::time::months_before;
use ptax_common::{RawComparable, SubjectProperty};

use super::config::FilterThresholds;

/// Why a candidate was excluded (first failing predicate)
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Subject living area or lot size is zero/negative/non-finite, so no
    /// ratio can be formed
    DegenerateSubject,
    LivingArea { ratio: f64 },
    Bedrooms { difference: u32 },
    Bathrooms { difference: f64 },
    LotSize { ratio: f64 },
    /// No distance given and no coordinates to compute one
    UnknownDistance,
    Distance { miles: f64 },
    SaleTooOld { sale_date: NaiveDate, cutoff: NaiveDate },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::DegenerateSubject => write!(f, "subject size/lot unusable for ratios"),
            Rejection::LivingArea { ratio } => write!(f, "living area ratio {:.3} out of range", ratio),
            Rejection::Bedrooms { difference } => write!(f, "bedroom difference {}", difference),
            Rejection::Bathrooms { difference } => write!(f, "bathroom difference {}", difference),
            Rejection::LotSize { ratio } => write!(f, "lot size ratio {:.3} out of range", ratio),
            Rejection::UnknownDistance => write!(f, "distance unknown"),
            Rejection::Distance { miles } => write!(f, "{:.2} miles away", miles),
            Rejection::SaleTooOld { sale_date, cutoff } => {
                write!(f, "sold {} before cutoff {}", sale_date, cutoff)
            }
        }
    }
}

fn usable_denominator(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn ratio_within(ratio: f64, tolerance: f64) -> bool {
    ratio >= 1.0 - tolerance && ratio <= 1.0 + tolerance
}

/// Check one candidate against the subject
///
/// `as_of` anchors the recency window (`as_of` minus `max_sale_age_months`
/// calendar months, inclusive).
pub fn evaluate(
    subject: &SubjectProperty,
    candidate: &RawComparable,
    thresholds: &FilterThresholds,
    as_of: NaiveDate,
) -> Result<(), Rejection> {
    let s = &subject.characteristics;
    let c = &candidate.characteristics;

    if !usable_denominator(s.living_area_sqft) || !usable_denominator(s.lot_size_acres) {
        return Err(Rejection::DegenerateSubject);
    }

    let size_ratio = c.living_area_sqft / s.living_area_sqft;
    if !ratio_within(size_ratio, thresholds.size_tolerance) {
        return Err(Rejection::LivingArea { ratio: size_ratio });
    }

    let bedroom_difference = c.bedrooms.abs_diff(s.bedrooms);
    if bedroom_difference > thresholds.max_bedroom_difference {
        return Err(Rejection::Bedrooms {
            difference: bedroom_difference,
        });
    }

    let bathroom_difference = (c.bathrooms - s.bathrooms).abs();
    // NaN fails the comparison and is rejected too
    if !(bathroom_difference <= thresholds.max_bathroom_difference) {
        return Err(Rejection::Bathrooms {
            difference: bathroom_difference,
        });
    }

    let lot_ratio = c.lot_size_acres / s.lot_size_acres;
    if !ratio_within(lot_ratio, thresholds.lot_tolerance) {
        return Err(Rejection::LotSize { ratio: lot_ratio });
    }

    match candidate.distance_miles {
        None => return Err(Rejection::UnknownDistance),
        Some(miles) if !(miles <= thresholds.max_distance_miles) => {
            return Err(Rejection::Distance { miles });
        }
        Some(_) => {}
    }

    let cutoff = months_before(as_of, thresholds.max_sale_age_months);
    if candidate.sale_date < cutoff {
        return Err(Rejection::SaleTooOld {
            sale_date: candidate.sale_date,
            cutoff,
        });
    }

    Ok(())
}

/// Candidates that pass every predicate, in input order
pub fn filter(
    subject: &SubjectProperty,
    candidates: &[RawComparable],
    thresholds: &FilterThresholds,
    as_of: NaiveDate,
) -> Vec<RawComparable> {
    candidates
        .iter()
        .filter(|candidate| match evaluate(subject, candidate, thresholds, as_of) {
            Ok(()) => true,
            Err(reason) => {
                debug!(
                    address = %candidate.address.formatted(),
                    reason = %reason,
                    "Comparable rejected"
                );
                false
            }
        })
        .cloned()
        .collect()
}
