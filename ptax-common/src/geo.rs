//! Great-circle distance between two coordinates
//!
//! Plain Haversine on a spherical Earth. Accurate to well under 1% at the
//! neighborhood scale comparables are searched at, which is all we need.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3_959.0;

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Distance to `other` in miles
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_miles(*self, *other)
    }
}

/// Haversine distance between `a` and `b` in miles
///
/// Total over finite input. NaN coordinates propagate to a NaN result, so
/// callers must only pass points they actually have.
pub fn distance_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}
