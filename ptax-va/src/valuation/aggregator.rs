//! Market value aggregation
//!
//! Sorts adjusted prices, drops `floor(n * trim_fraction)` from each end and
//! takes the median of what is left. Trimming knocks out distressed sales and
//! over-improved outliers; the median handles whatever skew remains.

use super::adjustment::AdjustedComparable;

// Keeps floor() from losing a whole element to representation error,
// e.g. 10 * 0.3 == 2.9999999999999996
const TRIM_EPSILON: f64 = 1e-9;

/// Number of elements trimmed from EACH end for a sample of `n`
pub fn trim_count(n: usize, trim_fraction: f64) -> usize {
    let count = ((n as f64) * trim_fraction + TRIM_EPSILON).floor() as usize;
    // Never trim everything away
    if count * 2 >= n {
        n.saturating_sub(1) / 2
    } else {
        count
    }
}

/// Adjusted prices sorted ascending with both tails removed
pub fn trimmed_prices(comparables: &[AdjustedComparable], trim_fraction: f64) -> Vec<f64> {
    let mut prices: Vec<f64> = comparables.iter().map(|c| c.adjusted_price).collect();
    prices.sort_by(|a, b| a.total_cmp(b));

    let trim = trim_count(prices.len(), trim_fraction);
    prices[trim..prices.len() - trim].to_vec()
}

/// Median of an ascending-sorted slice; 0 when empty
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    if n % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Market value estimate from adjusted comparables
///
/// Returns 0 for empty input; callers surface that as insufficient data.
pub fn aggregate(comparables: &[AdjustedComparable], trim_fraction: f64) -> f64 {
    if comparables.is_empty() {
        return 0.0;
    }
    median(&trimmed_prices(comparables, trim_fraction))
}
