//! Comparable sales valuation engine
//!
//! Stateless stages over immutable inputs, composed by [`engine::analyze`].
//! Safe to call concurrently; nothing here touches global state.

pub mod adjustment;
pub mod aggregator;
pub mod blender;
pub mod confidence;
pub mod config;
pub mod engine;
pub mod filter;
pub mod savings;
pub mod verdict;

pub use adjustment::{AdjustedComparable, Adjustments};
pub use blender::{AvmEstimate, ValuationMethod};
pub use confidence::ConfidenceLevel;
pub use config::ValuationConfig;
pub use engine::{analyze, value_comparables, AnalysisResult, ValuationResult};
pub use verdict::Verdict;
