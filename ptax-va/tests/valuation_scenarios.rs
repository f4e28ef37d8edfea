//! End-to-end valuation scenarios through `ptax_va::valuation::analyze`
//!
//! Tests cover:
//! - Over-assessment with three comparables (no trimming at n=3)
//! - No surviving comparables, with and without an AVM
//! - Zero assessed value
//! - AVM blending for thin comparable evidence
//! - Pipeline properties: price bounds, sign of adjustments, verdict/percentage
//!   consistency, non-negative savings

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use ptax_common::{Address, Characteristics, GeoPoint, PropertyType, RawComparable, SubjectProperty};
use ptax_va::valuation::{
    analyze, value_comparables, AvmEstimate, ConfidenceLevel, ValuationConfig, ValuationMethod, Verdict,
};

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 15, 12, 0, 0).unwrap()
}

fn recent() -> NaiveDate {
    as_of().date_naive() - Duration::days(45)
}

fn subject(assessed: f64) -> SubjectProperty {
    SubjectProperty {
        address: Address {
            line1: "100 Subject St".to_string(),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            zip_code: Some("78701".to_string()),
        },
        location: Some(GeoPoint::new(30.2672, -97.7431)),
        characteristics: Characteristics {
            living_area_sqft: 2000.0,
            bedrooms: 3,
            bathrooms: 2.0,
            lot_size_acres: 0.25,
            year_built: 2010,
            property_type: PropertyType::SingleFamily,
        },
        current_assessed_value: Some(assessed),
        assessment_year: Some(2024),
    }
}

/// Comparable identical to the subject, so adjusted price == sale price
fn twin(line: &str, price: f64) -> RawComparable {
    RawComparable {
        address: Address::from_line(line),
        location: None,
        sale_price: price,
        sale_date: recent(),
        characteristics: subject(0.0).characteristics,
        distance_miles: Some(0.3),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_over_assessed_with_three_comparables() {
    // 100 sqft larger: -$15,000 brings 470,000 down to 455,000
    let mut larger = twin("3 Larger Ln", 470_000.0);
    larger.characteristics.living_area_sqft = 2100.0;

    let raw = vec![twin("1 Oak St", 440_000.0), twin("2 Elm St", 435_000.0), larger];
    let result = analyze(&subject(500_000.0), &raw, None, &ValuationConfig::default(), as_of());

    let adjusted: Vec<f64> = result.comparables_used.iter().map(|c| c.adjusted_price).collect();
    assert_eq!(adjusted, vec![440_000.0, 435_000.0, 455_000.0]);

    assert_close(result.market_value, 440_000.0);
    assert_close(result.difference, 60_000.0);
    assert_close(result.percentage_difference, 12.0);
    assert_eq!(result.verdict, Verdict::OverAssessed);
    assert_eq!(result.confidence, ConfidenceLevel::Medium);
    assert_eq!(result.sample_size, 3);
    assert_eq!(result.valuation_method, ValuationMethod::Comparables);
    assert_close(result.annual_savings, 3_300.0);
    assert_close(result.monthly_savings, 275.0);
}

#[test]
fn test_no_comparables_is_insufficient_data() {
    let mut far = twin("9 Far Rd", 450_000.0);
    far.distance_miles = Some(4.0);
    let mut stale = twin("8 Old Rd", 450_000.0);
    stale.sale_date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    let result = analyze(&subject(500_000.0), &[far, stale], None, &ValuationConfig::default(), as_of());

    assert_eq!(result.market_value, 0.0);
    assert_eq!(result.difference, result.assessed_value - result.market_value);
    assert_eq!(result.sample_size, 0);
    assert!(result.comparables_used.is_empty());
    assert_eq!(result.confidence, ConfidenceLevel::Low);
    assert_eq!(result.verdict, Verdict::InsufficientData);
    assert_eq!(result.annual_savings, 0.0);
    assert_eq!(result.monthly_savings, 0.0);
}

#[test]
fn test_no_comparables_falls_back_to_avm() {
    let avm = AvmEstimate::new(460_000.0);
    let result = analyze(&subject(500_000.0), &[], Some(&avm), &ValuationConfig::default(), as_of());

    assert_eq!(result.valuation_method, ValuationMethod::AvmOnly);
    assert_close(result.market_value, 460_000.0);
    assert_eq!(result.confidence, ConfidenceLevel::Low);
    assert_eq!(result.verdict, Verdict::OverAssessed);
    assert_eq!(result.avm_value, Some(460_000.0));
}

#[test]
fn test_zero_assessed_value_is_fair() {
    let raw = vec![twin("1 Oak St", 440_000.0)];
    let result = analyze(&subject(0.0), &raw, None, &ValuationConfig::default(), as_of());

    assert_eq!(result.percentage_difference, 0.0);
    assert_eq!(result.verdict, Verdict::Fair);
    assert_eq!(result.annual_savings, 0.0);
}

#[test]
fn test_missing_assessed_value_treated_as_zero() {
    let mut s = subject(0.0);
    s.current_assessed_value = None;
    let result = analyze(&s, &[twin("1 Oak St", 440_000.0)], None, &ValuationConfig::default(), as_of());

    assert_eq!(result.assessed_value, 0.0);
    assert_eq!(result.verdict, Verdict::Fair);
}

#[test]
fn test_two_comparables_blend_with_avm() {
    let raw = vec![twin("1 Oak St", 395_000.0), twin("2 Elm St", 405_000.0)];
    let avm = AvmEstimate::new(410_000.0);
    let result = analyze(&subject(420_000.0), &raw, Some(&avm), &ValuationConfig::default(), as_of());

    assert_eq!(result.sample_size, 2);
    assert_eq!(result.valuation_method, ValuationMethod::Blended);
    assert_close(result.market_value, 403_000.0);
    assert_eq!(result.confidence, ConfidenceLevel::Low);
}

#[test]
fn test_avm_ignored_with_enough_comparables() {
    let raw = vec![
        twin("1 Oak St", 395_000.0),
        twin("2 Elm St", 405_000.0),
        twin("3 Ash St", 400_000.0),
    ];
    let avm = AvmEstimate::new(900_000.0);
    let result = analyze(&subject(400_000.0), &raw, Some(&avm), &ValuationConfig::default(), as_of());

    assert_eq!(result.valuation_method, ValuationMethod::Comparables);
    assert_close(result.market_value, 400_000.0);
    assert_eq!(result.verdict, Verdict::Fair);
}

#[test]
fn test_trimming_discards_outliers() {
    // n=5 trims one price from each end before taking the median
    let raw = vec![
        twin("1 A", 100_000.0),
        twin("2 B", 430_000.0),
        twin("3 C", 440_000.0),
        twin("4 D", 450_000.0),
        twin("5 E", 2_000_000.0),
    ];
    let valuation = value_comparables(&subject(500_000.0), &raw, &ValuationConfig::default(), as_of());

    assert_eq!(valuation.sample_size, 5);
    assert_eq!(valuation.confidence, ConfidenceLevel::High);
    assert_close(valuation.market_value_estimate, 440_000.0);
}

#[test]
fn test_market_value_within_adjusted_price_range() {
    let prices = [410_000.0, 455_000.0, 398_000.0, 472_500.0, 430_000.0, 441_000.0, 415_250.0];
    for n in 1..=prices.len() {
        let raw: Vec<_> = prices[..n]
            .iter()
            .enumerate()
            .map(|(i, p)| twin(&format!("{} Test St", i), *p))
            .collect();
        let valuation = value_comparables(&subject(500_000.0), &raw, &ValuationConfig::default(), as_of());

        let min = prices[..n].iter().cloned().fold(f64::INFINITY, f64::min);
        let max = prices[..n].iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(
            valuation.market_value_estimate >= min && valuation.market_value_estimate <= max,
            "n={} value {} outside [{}, {}]",
            n,
            valuation.market_value_estimate,
            min,
            max
        );
    }
}

#[test]
fn test_adjustments_oppose_feature_differences() {
    let mut better = twin("1 Better", 450_000.0);
    better.characteristics.living_area_sqft = 2200.0;
    better.characteristics.bedrooms = 4;
    better.characteristics.bathrooms = 2.5;
    better.characteristics.lot_size_acres = 0.3;
    better.characteristics.year_built = 2015;

    let mut worse = twin("2 Worse", 450_000.0);
    worse.characteristics.living_area_sqft = 1800.0;
    worse.characteristics.bedrooms = 2;
    worse.characteristics.bathrooms = 1.5;
    worse.characteristics.lot_size_acres = 0.2;
    worse.characteristics.year_built = 2000;

    let valuation = value_comparables(&subject(500_000.0), &[better, worse], &ValuationConfig::default(), as_of());
    assert_eq!(valuation.sample_size, 2);

    let better = &valuation.comparables_used[0];
    assert!(better.adjustments.iter().all(|(_, amount)| amount < 0.0));
    assert!(better.adjusted_price < better.comparable.sale_price);

    let worse = &valuation.comparables_used[1];
    assert!(worse.adjustments.iter().all(|(_, amount)| amount > 0.0));
    assert!(worse.adjusted_price > worse.comparable.sale_price);
}

#[test]
fn test_verdict_matches_percentage() {
    let config = ValuationConfig::default();
    for assessed in [300_000.0, 380_000.0, 400_000.0, 419_000.0, 421_000.0, 450_000.0, 600_000.0] {
        let result = analyze(&subject(assessed), &[twin("1 Oak St", 400_000.0)], None, &config, as_of());
        let pct = result.percentage_difference;
        let expected = if pct > config.verdict_tolerance_pct {
            Verdict::OverAssessed
        } else if pct < -config.verdict_tolerance_pct {
            Verdict::UnderAssessed
        } else {
            Verdict::Fair
        };
        assert_eq!(result.verdict, expected, "assessed {}", assessed);
        assert!(result.annual_savings >= 0.0);
        assert!(result.monthly_savings >= 0.0);
        if result.verdict != Verdict::OverAssessed {
            assert_eq!(result.annual_savings, 0.0);
        }
    }
}

#[test]
fn test_degenerate_subject_rejects_everything() {
    let mut s = subject(500_000.0);
    s.characteristics.lot_size_acres = 0.0;
    let result = analyze(&s, &[twin("1 Oak St", 440_000.0)], None, &ValuationConfig::default(), as_of());

    assert_eq!(result.sample_size, 0);
    assert_eq!(result.verdict, Verdict::InsufficientData);
}

#[test]
fn test_custom_rates_change_adjustments() {
    let mut config = ValuationConfig::default();
    config.rates.per_sqft = 200.0;

    let mut larger = twin("1 Larger", 470_000.0);
    larger.characteristics.living_area_sqft = 2100.0;
    let valuation = value_comparables(&subject(500_000.0), &[larger], &config, as_of());

    assert_close(valuation.comparables_used[0].adjustments.size, -20_000.0);
    assert_close(valuation.comparables_used[0].adjusted_price, 450_000.0);
}
