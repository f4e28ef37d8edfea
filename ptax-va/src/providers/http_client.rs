//! HTTP property-data client
//!
//! Speaks a RentCast-style REST API:
//! - `GET /properties?address=...` for the subject record
//! - `GET /properties?latitude=&longitude=&radius=&saleDateRange=...` for
//!   recently sold neighbors
//! - `GET /avm/value?address=...` for the automated valuation
//!
//! Requests carry the API key in `X-Api-Key` and are throttled client-side
//! with a token bucket so bursts of analyses don't trip the upstream quota.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};

use ptax_common::{Address, Characteristics, GeoPoint, PropertyType, RawComparable, SubjectProperty};

use super::{require_address, PropertyDataProvider, ProviderError, ValuationProvider};
use crate::valuation::AvmEstimate;

const USER_AGENT: &str = concat!("ptax-va/", env!("CARGO_PKG_VERSION"));
const SQFT_PER_ACRE: f64 = 43_560.0;
/// Upper bound on days per month when converting a month window to days
const DAYS_PER_MONTH: u32 = 31;

/// Look-back window in days for the upstream `saleDateRange` parameter
fn sale_date_range_days(months_back: u32) -> u32 {
    months_back.max(1).saturating_mul(DAYS_PER_MONTH)
}

/// Property record as returned by `/properties`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyRecord {
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    address_line1: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    zip_code: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    property_type: Option<String>,
    #[serde(default)]
    bedrooms: Option<f64>,
    #[serde(default)]
    bathrooms: Option<f64>,
    #[serde(default)]
    square_footage: Option<f64>,
    /// Square feet
    #[serde(default)]
    lot_size: Option<f64>,
    #[serde(default)]
    year_built: Option<i32>,
    #[serde(default)]
    last_sale_date: Option<String>,
    #[serde(default)]
    last_sale_price: Option<f64>,
    /// Keyed by year ("2023": {...})
    #[serde(default)]
    tax_assessments: HashMap<String, TaxAssessment>,
}

#[derive(Debug, Clone, Deserialize)]
struct TaxAssessment {
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    value: Option<f64>,
}

/// `/avm/value` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvmResponse {
    price: f64,
    #[serde(default)]
    price_range_low: Option<f64>,
    #[serde(default)]
    price_range_high: Option<f64>,
}

impl PropertyRecord {
    fn address(&self) -> Address {
        let line1 = self
            .address_line1
            .clone()
            .or_else(|| self.formatted_address.clone())
            .unwrap_or_default();
        Address {
            line1,
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
        }
    }

    fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }

    /// Missing numbers become 0; the comparable filter rejects what it
    /// cannot compare.
    fn characteristics(&self) -> Characteristics {
        Characteristics {
            living_area_sqft: self.square_footage.unwrap_or(0.0),
            bedrooms: self.bedrooms.map(|b| b.max(0.0).round() as u32).unwrap_or(0),
            bathrooms: self.bathrooms.unwrap_or(0.0),
            lot_size_acres: self.lot_size.map(|sqft| sqft / SQFT_PER_ACRE).unwrap_or(0.0),
            year_built: self.year_built.unwrap_or(0),
            property_type: self
                .property_type
                .as_deref()
                .map(PropertyType::from_label)
                .unwrap_or_default(),
        }
    }

    /// Most recent assessment with a value: (value, year)
    fn latest_assessment(&self) -> Option<(f64, i32)> {
        self.tax_assessments
            .iter()
            .filter_map(|(key, a)| {
                let year = a.year.or_else(|| key.parse().ok())?;
                Some((a.value?, year))
            })
            .max_by_key(|(_, year)| *year)
    }

    fn to_subject(&self) -> SubjectProperty {
        let assessment = self.latest_assessment();
        SubjectProperty {
            address: self.address(),
            location: self.location(),
            characteristics: self.characteristics(),
            current_assessed_value: assessment.map(|(value, _)| value),
            assessment_year: assessment.map(|(_, year)| year),
        }
    }

    /// `None` for records without a usable last sale
    fn to_comparable(&self) -> Option<RawComparable> {
        let sale_price = self.last_sale_price.filter(|p| *p > 0.0)?;
        let sale_date = parse_sale_date(self.last_sale_date.as_deref()?)?;
        Some(RawComparable {
            address: self.address(),
            location: self.location(),
            sale_price,
            sale_date,
            characteristics: self.characteristics(),
            distance_miles: None,
        })
    }
}

/// Accepts RFC 3339 timestamps ("2024-03-01T00:00:00.000Z") or plain dates
fn parse_sale_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
}

fn avm_confidence(price: f64, low: Option<f64>, high: Option<f64>) -> Option<f64> {
    let (low, high) = (low?, high?);
    if price <= 0.0 || high < low {
        return None;
    }
    Some((1.0 - (high - low) / price).clamp(0.0, 1.0))
}

/// RentCast-style REST client
pub struct HttpPropertyClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    comparable_limit: u32,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl HttpPropertyClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        requests_per_second: u32,
        comparable_limit: u32,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let per_second = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            comparable_limit: comparable_limit.max(1),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    /// Throttled GET returning the decoded JSON body
    ///
    /// 404 maps to `NotFound(context)`, 429 to `RateLimited`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, ProviderError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, context = %context, "Querying property data API");

        let mut request = self.http_client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(context.to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PropertyDataProvider for HttpPropertyClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn lookup_property(&self, address: &str) -> Result<SubjectProperty, ProviderError> {
        let address = require_address(address)?;
        let records: Vec<PropertyRecord> = self
            .get_json("/properties", &[("address", address.to_string())], address)
            .await?;

        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(address.to_string()))?;

        let subject = record.to_subject();
        info!(
            address = %subject.address.formatted(),
            assessed = ?subject.current_assessed_value,
            "Retrieved subject property"
        );
        Ok(subject)
    }

    async fn get_comparable_sales(
        &self,
        subject: &SubjectProperty,
        radius_miles: f64,
        months_back: u32,
    ) -> Result<Vec<RawComparable>, ProviderError> {
        let mut query: Vec<(&str, String)> = match subject.location {
            Some(point) => vec![
                ("latitude", point.latitude.to_string()),
                ("longitude", point.longitude.to_string()),
            ],
            None => vec![("address", subject.address.formatted())],
        };
        query.push(("radius", radius_miles.to_string()));
        query.push(("saleDateRange", sale_date_range_days(months_back).to_string()));
        query.push(("limit", self.comparable_limit.to_string()));
        if subject.characteristics.property_type != PropertyType::Other {
            query.push((
                "propertyType",
                subject.characteristics.property_type.as_label().to_string(),
            ));
        }

        let records: Vec<PropertyRecord> = match self
            .get_json("/properties", &query, "comparable sales")
            .await
        {
            Ok(records) => records,
            // Some APIs answer an empty radius search with 404
            Err(ProviderError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        let subject_key = subject.address.lookup_key();
        let comparables: Vec<RawComparable> = records
            .iter()
            .filter_map(PropertyRecord::to_comparable)
            .filter(|c| c.address.lookup_key() != subject_key)
            .collect();

        info!(
            returned = records.len(),
            with_sales = comparables.len(),
            radius_miles,
            "Retrieved comparable sales"
        );
        Ok(comparables)
    }
}

#[async_trait]
impl ValuationProvider for HttpPropertyClient {
    async fn get_valuation(&self, address: &str) -> Result<AvmEstimate, ProviderError> {
        let address = require_address(address)?;
        let avm: AvmResponse = self
            .get_json("/avm/value", &[("address", address.to_string())], address)
            .await?;

        Ok(AvmEstimate {
            value: avm.price,
            confidence: avm_confidence(avm.price, avm.price_range_low, avm.price_range_high),
        })
    }
}
