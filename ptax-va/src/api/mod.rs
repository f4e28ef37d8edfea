//! HTTP API handlers for ptax-va

pub mod analyze;
pub mod buildinfo;
pub mod health;
pub mod property;

pub use analyze::{analyze_property, analysis_routes, AnalysisRequest};
pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use property::{lookup_property, property_routes};
