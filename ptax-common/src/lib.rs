//! # PTAX Common Library
//!
//! Shared code for the property-tax assessment check services including:
//! - Property and comparable-sale models
//! - Great-circle distance
//! - Configuration file resolution
//! - Error types
//! - Time helpers

pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod time;

pub use error::{Error, Result};
pub use geo::{distance_miles, GeoPoint};
pub use models::{Address, Characteristics, PropertyType, RawComparable, SubjectProperty};
