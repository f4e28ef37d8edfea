//! Tax savings estimate
//!
//! Only an over-assessment produces savings: `annual = |difference| * rate`,
//! `monthly = annual / 12`. The rate is a flat placeholder, not derived from
//! the subject's jurisdiction.

use super::verdict::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Savings {
    pub annual: f64,
    pub monthly: f64,
}

pub fn estimate(difference: f64, verdict: Verdict, tax_rate: f64) -> Savings {
    if verdict != Verdict::OverAssessed {
        return Savings::default();
    }
    let annual = difference.abs() * tax_rate;
    Savings {
        annual,
        monthly: annual / 12.0,
    }
}
