//! Valuation orchestrator
//!
//! Composes the pipeline stages:
//! raw comparables -> distance resolution -> filter -> adjust -> aggregate
//! -> (optional) AVM blend -> verdict -> savings.
//!
//! Pure and synchronous. `as_of` fixes both the recency window and the
//! `generatedAt` stamp, so identical inputs give identical results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use ptax_common::{RawComparable, SubjectProperty};

use super::adjustment::{adjust_comparable, AdjustedComparable};
use super::aggregator::aggregate;
use super::blender::{blend, AvmEstimate, ValuationMethod};
use super::confidence::{score, ConfidenceLevel};
use super::config::ValuationConfig;
use super::filter::filter;
use super::savings::estimate;
use super::verdict::{classify, Verdict};

/// Comparable-only valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub market_value_estimate: f64,
    pub confidence: ConfidenceLevel,
    pub comparables_used: Vec<AdjustedComparable>,
    pub sample_size: usize,
}

/// Final output of one analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub subject_property: SubjectProperty,
    pub comparables_used: Vec<AdjustedComparable>,
    pub market_value: f64,
    pub assessed_value: f64,
    pub difference: f64,
    pub percentage_difference: f64,
    pub tax_rate: f64,
    pub annual_savings: f64,
    pub monthly_savings: f64,
    pub confidence: ConfidenceLevel,
    pub verdict: Verdict,
    pub sample_size: usize,
    pub valuation_method: ValuationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avm_value: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

/// Filter, adjust and aggregate raw comparables into a market value
pub fn value_comparables(
    subject: &SubjectProperty,
    raw_comparables: &[RawComparable],
    config: &ValuationConfig,
    as_of: DateTime<Utc>,
) -> ValuationResult {
    let located: Vec<RawComparable> = raw_comparables
        .iter()
        .map(|c| c.with_distance_from(subject))
        .collect();

    let kept = filter(subject, &located, &config.filter, as_of.date_naive());

    let comparables_used: Vec<AdjustedComparable> = kept
        .iter()
        .map(|c| adjust_comparable(subject, c, &config.rates))
        .collect();

    let sample_size = comparables_used.len();
    let market_value_estimate = aggregate(&comparables_used, config.trim_fraction);
    let confidence = score(sample_size, &config.confidence);

    info!(
        candidates = raw_comparables.len(),
        kept = sample_size,
        market_value = market_value_estimate,
        confidence = confidence.as_str(),
        "Comparable valuation complete"
    );

    ValuationResult {
        market_value_estimate,
        confidence,
        comparables_used,
        sample_size,
    }
}

/// Run the full analysis for one subject property
pub fn analyze(
    subject: &SubjectProperty,
    raw_comparables: &[RawComparable],
    avm: Option<&AvmEstimate>,
    config: &ValuationConfig,
    as_of: DateTime<Utc>,
) -> AnalysisResult {
    let valuation = value_comparables(subject, raw_comparables, config, as_of);

    let blended = blend(
        valuation.market_value_estimate,
        avm,
        valuation.sample_size,
        &config.blend,
    );

    let assessed_value = subject.assessed_value();
    let assessment = classify(assessed_value, blended.final_value, config.verdict_tolerance_pct);
    let savings = estimate(assessment.difference, assessment.verdict, config.tax_rate);

    info!(
        address = %subject.address.formatted(),
        assessed_value,
        market_value = blended.final_value,
        verdict = assessment.verdict.as_str(),
        annual_savings = savings.annual,
        "Assessment analysis complete"
    );

    AnalysisResult {
        subject_property: subject.clone(),
        comparables_used: valuation.comparables_used,
        market_value: blended.final_value,
        assessed_value,
        difference: assessment.difference,
        percentage_difference: assessment.percentage_difference,
        tax_rate: config.tax_rate,
        annual_savings: savings.annual,
        monthly_savings: savings.monthly,
        confidence: valuation.confidence,
        verdict: assessment.verdict,
        sample_size: valuation.sample_size,
        valuation_method: blended.method,
        avm_value: avm.map(|a| a.value),
        generated_at: as_of,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use ptax_common::{Address, Characteristics, GeoPoint, PropertyType};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 15, 12, 0, 0).unwrap()
    }

    fn subject() -> SubjectProperty {
        SubjectProperty {
            address: Address::from_line("100 Subject St"),
            location: Some(GeoPoint::new(30.2672, -97.7431)),
            characteristics: Characteristics {
                living_area_sqft: 2000.0,
                bedrooms: 3,
                bathrooms: 2.0,
                lot_size_acres: 0.25,
                year_built: 2010,
                property_type: PropertyType::SingleFamily,
            },
            current_assessed_value: Some(500_000.0),
            assessment_year: Some(2024),
        }
    }

    fn comp(line: &str, price: f64, location: Option<GeoPoint>, distance: Option<f64>) -> RawComparable {
        RawComparable {
            address: Address::from_line(line),
            location,
            sale_price: price,
            sale_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            characteristics: subject().characteristics,
            distance_miles: distance,
        }
    }

    #[test]
    fn test_distance_resolved_from_coordinates() {
        // ~0.69 miles north: kept
        let near = comp("1 Near", 450_000.0, Some(GeoPoint::new(30.2772, -97.7431)), None);
        // ~6.9 miles north: rejected
        let far = comp("2 Far", 450_000.0, Some(GeoPoint::new(30.3672, -97.7431)), None);
        // no coordinates, no distance: rejected
        let unknown = comp("3 Unknown", 450_000.0, None, None);

        let result = value_comparables(&subject(), &[near, far, unknown], &ValuationConfig::default(), as_of());
        assert_eq!(result.sample_size, 1);
        let used = &result.comparables_used[0];
        assert_eq!(used.comparable.address.line1, "1 Near");
        assert!(used.comparable.distance_miles.unwrap() < 0.7);
    }

    #[test]
    fn test_inputs_untouched() {
        let raw = vec![comp("1 Near", 450_000.0, Some(GeoPoint::new(30.2772, -97.7431)), None)];
        let before = raw.clone();
        let _ = analyze(&subject(), &raw, None, &ValuationConfig::default(), as_of());
        assert_eq!(raw, before);
    }

    #[test]
    fn test_idempotent() {
        let raw = vec![
            comp("1 A", 440_000.0, None, Some(0.2)),
            comp("2 B", 470_000.0, None, Some(0.4)),
        ];
        let avm = AvmEstimate::new(455_000.0);
        let config = ValuationConfig::default();
        let a = analyze(&subject(), &raw, Some(&avm), &config, as_of());
        let b = analyze(&subject(), &raw, Some(&avm), &config, as_of());
        assert_eq!(a, b);
    }

    #[test]
    fn test_result_json_shape() {
        let raw = vec![comp("1 A", 440_000.0, None, Some(0.2))];
        let result = analyze(&subject(), &raw, None, &ValuationConfig::default(), as_of());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["verdict"], "over-assessed");
        assert_eq!(json["confidence"], "low");
        assert_eq!(json["valuationMethod"], "comparables");
        assert_eq!(json["sampleSize"], 1);
        assert_eq!(json["generatedAt"], "2024-09-15T12:00:00Z");
        assert!(json["comparablesUsed"].is_array());
        assert!(json.get("avmValue").is_none());
    }
}
