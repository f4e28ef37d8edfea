//! Property and comparable-sale models
//!
//! Shapes shared by the valuation engine and the data providers. All wire
//! names are camelCase; calendar dates serialize as `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Postal address of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Street line, e.g. "123 Main St"
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

impl Address {
    /// Address with only a street line (or a full one-line address)
    pub fn from_line(line: impl Into<String>) -> Self {
        Self {
            line1: line.into(),
            city: None,
            state: None,
            zip_code: None,
        }
    }

    /// One-line rendering: "123 Main St, Austin, TX 78701"
    pub fn formatted(&self) -> String {
        let mut out = self.line1.trim().to_string();
        if let Some(city) = self.city.as_deref().filter(|c| !c.trim().is_empty()) {
            out.push_str(", ");
            out.push_str(city.trim());
        }
        let state = self.state.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let zip = self.zip_code.as_deref().map(str::trim).filter(|z| !z.is_empty());
        match (state, zip) {
            (Some(s), Some(z)) => {
                out.push_str(", ");
                out.push_str(s);
                out.push(' ');
                out.push_str(z);
            }
            (Some(s), None) => {
                out.push_str(", ");
                out.push_str(s);
            }
            (None, Some(z)) => {
                out.push(' ');
                out.push_str(z);
            }
            (None, None) => {}
        }
        out
    }

    /// Case-, punctuation- and whitespace-insensitive key for matching
    pub fn lookup_key(&self) -> String {
        normalize_address(&self.formatted())
    }
}

/// Normalize a free-form address string for equality matching
pub fn normalize_address(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == ',' || c == '.' { ' ' } else { c.to_ascii_lowercase() })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Residential property category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    SingleFamily,
    Condo,
    Townhouse,
    MultiFamily,
    Manufactured,
    Land,
    #[default]
    #[serde(other)]
    Other,
}

impl PropertyType {
    /// Parse a provider label such as "Single Family" or "Multi-Family"
    pub fn from_label(label: &str) -> Self {
        let key: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "singlefamily" | "sfr" | "house" => PropertyType::SingleFamily,
            "condo" | "condominium" | "apartment" => PropertyType::Condo,
            "townhouse" | "townhome" => PropertyType::Townhouse,
            "multifamily" | "duplex" | "triplex" | "quadruplex" => PropertyType::MultiFamily,
            "manufactured" | "mobilehome" => PropertyType::Manufactured,
            "land" | "lot" => PropertyType::Land,
            _ => PropertyType::Other,
        }
    }

    /// Label in the form data providers expect in queries
    pub fn as_label(&self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "Single Family",
            PropertyType::Condo => "Condo",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::MultiFamily => "Multi-Family",
            PropertyType::Manufactured => "Manufactured",
            PropertyType::Land => "Land",
            PropertyType::Other => "Other",
        }
    }
}

/// Physical characteristics compared between subject and comparables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Characteristics {
    pub living_area_sqft: f64,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub lot_size_acres: f64,
    pub year_built: i32,
    #[serde(default)]
    pub property_type: PropertyType,
}

/// The property whose assessment is being checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectProperty {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub characteristics: Characteristics,
    #[serde(default)]
    pub current_assessed_value: Option<f64>,
    #[serde(default)]
    pub assessment_year: Option<i32>,
}

impl SubjectProperty {
    /// Assessed value, 0 when the record carries none
    pub fn assessed_value(&self) -> f64 {
        self.current_assessed_value.unwrap_or(0.0)
    }
}

/// An unadjusted candidate sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComparable {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub sale_price: f64,
    pub sale_date: NaiveDate,
    pub characteristics: Characteristics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl RawComparable {
    /// Copy of this comparable with `distance_miles` filled in from coordinates
    ///
    /// Only computed when the distance is absent and both the subject and the
    /// comparable carry a location; otherwise the comparable is returned as is.
    pub fn with_distance_from(&self, subject: &SubjectProperty) -> RawComparable {
        let mut located = self.clone();
        if located.distance_miles.is_none() {
            if let (Some(from), Some(to)) = (subject.location, self.location) {
                located.distance_miles = Some(from.distance_to(&to));
            }
        }
        located
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn characteristics() -> Characteristics {
        Characteristics {
            living_area_sqft: 2000.0,
            bedrooms: 3,
            bathrooms: 2.0,
            lot_size_acres: 0.25,
            year_built: 2010,
            property_type: PropertyType::SingleFamily,
        }
    }

    fn subject(location: Option<GeoPoint>) -> SubjectProperty {
        SubjectProperty {
            address: Address::from_line("1 Subject Way"),
            location,
            characteristics: characteristics(),
            current_assessed_value: Some(500_000.0),
            assessment_year: Some(2024),
        }
    }

    fn comparable(location: Option<GeoPoint>, distance: Option<f64>) -> RawComparable {
        RawComparable {
            address: Address::from_line("2 Comparable Ct"),
            location,
            sale_price: 450_000.0,
            sale_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            characteristics: characteristics(),
            distance_miles: distance,
        }
    }

    #[test]
    fn test_address_formatted_full() {
        let address = Address {
            line1: "123 Main St".to_string(),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            zip_code: Some("78701".to_string()),
        };
        assert_eq!(address.formatted(), "123 Main St, Austin, TX 78701");
    }

    #[test]
    fn test_address_formatted_line_only() {
        assert_eq!(Address::from_line("  9 Elm Rd ").formatted(), "9 Elm Rd");
    }

    #[test]
    fn test_lookup_key_ignores_case_and_punctuation() {
        let a = Address::from_line("123 Main St., Austin,  TX 78701");
        let b = Address {
            line1: "123 main st".to_string(),
            city: Some("AUSTIN".to_string()),
            state: Some("tx".to_string()),
            zip_code: Some("78701".to_string()),
        };
        assert_eq!(a.lookup_key(), b.lookup_key());
    }

    #[test]
    fn test_property_type_from_label() {
        assert_eq!(PropertyType::from_label("Single Family"), PropertyType::SingleFamily);
        assert_eq!(PropertyType::from_label("Multi-Family"), PropertyType::MultiFamily);
        assert_eq!(PropertyType::from_label("Condo"), PropertyType::Condo);
        assert_eq!(PropertyType::from_label("Houseboat"), PropertyType::Other);
    }

    #[test]
    fn test_property_type_unknown_deserializes_to_other() {
        let t: PropertyType = serde_json::from_str("\"castle\"").unwrap();
        assert_eq!(t, PropertyType::Other);
        let t: PropertyType = serde_json::from_str("\"single-family\"").unwrap();
        assert_eq!(t, PropertyType::SingleFamily);
    }

    #[test]
    fn test_assessed_value_defaults_to_zero() {
        let json = r#"{
            "address": {"line1": "1 Subject Way"},
            "characteristics": {
                "livingAreaSqft": 1800, "bedrooms": 3, "bathrooms": 2,
                "lotSizeAcres": 0.2, "yearBuilt": 1999
            }
        }"#;
        let subject: SubjectProperty = serde_json::from_str(json).unwrap();
        assert_eq!(subject.assessed_value(), 0.0);
        assert_eq!(subject.characteristics.property_type, PropertyType::Other);
    }

    #[test]
    fn test_sale_date_serializes_iso() {
        let json = serde_json::to_value(comparable(None, Some(0.3))).unwrap();
        assert_eq!(json["saleDate"], "2024-06-01");
        assert_eq!(json["salePrice"], 450_000.0);
    }

    #[test]
    fn test_with_distance_from_computes_when_missing() {
        let s = subject(Some(GeoPoint::new(30.00, -97.0)));
        let c = comparable(Some(GeoPoint::new(30.01, -97.0)), None);
        let located = c.with_distance_from(&s);
        let d = located.distance_miles.unwrap();
        assert!((d - 0.691).abs() < 0.001, "got {}", d);
        // original untouched
        assert!(c.distance_miles.is_none());
    }

    #[test]
    fn test_with_distance_from_keeps_existing() {
        let s = subject(Some(GeoPoint::new(30.00, -97.0)));
        let c = comparable(Some(GeoPoint::new(35.0, -97.0)), Some(0.4));
        assert_eq!(c.with_distance_from(&s).distance_miles, Some(0.4));
    }

    #[test]
    fn test_with_distance_from_needs_both_points() {
        let c = comparable(Some(GeoPoint::new(30.01, -97.0)), None);
        assert_eq!(c.with_distance_from(&subject(None)).distance_miles, None);

        let c = comparable(None, None);
        let s = subject(Some(GeoPoint::new(30.00, -97.0)));
        assert_eq!(c.with_distance_from(&s).distance_miles, None);
    }
}
