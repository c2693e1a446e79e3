//! Wire shapes of the geo/drivers backend.

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{
    domain::{DriverSighting, GeoPoint, SearchResult},
    error::GeoPointError,
};

pub const REVERSE_PATH: &str = "/api/geo/reverse";
pub const SEARCH_PATH: &str = "/api/geo/search";
pub const NEARBY_DRIVERS_PATH: &str = "/api/drivers/nearby";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PointQuery {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeoPoint> for PointQuery {
    fn from(point: GeoPoint) -> Self {
        Self {
            lat: point.lat,
            lon: point.lon,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery<'a> {
    pub q: &'a str,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ReverseGeocodeResponse {
    /// Returns the label when the backend produced a usable one.
    pub fn label(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(deserialize_with = "number_or_string")]
    pub lat: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub lon: f64,
}

impl TryFrom<SearchHit> for SearchResult {
    type Error = GeoPointError;

    fn try_from(hit: SearchHit) -> Result<Self, Self::Error> {
        let point = GeoPoint::new(hit.lat, hit.lon)?;
        let display_name = match hit.display_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => point.coordinate_label(),
        };
        Ok(SearchResult {
            display_name,
            point,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NearbyDriver {
    #[serde(deserialize_with = "string_or_number")]
    pub driver_id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub age_seconds: i64,
}

impl TryFrom<NearbyDriver> for DriverSighting {
    type Error = GeoPointError;

    fn try_from(driver: NearbyDriver) -> Result<Self, Self::Error> {
        Ok(DriverSighting {
            driver_id: driver.driver_id,
            point: GeoPoint::new(driver.lat, driver.lon)?,
            age_seconds: driver.age_seconds,
        })
    }
}

/// The nearby endpoint may answer with anything; only an array carries drivers.
pub fn parse_nearby_drivers(body: serde_json::Value) -> serde_json::Result<Vec<NearbyDriver>> {
    match body {
        serde_json::Value::Array(_) => serde_json::from_value(body),
        _ => Ok(Vec::new()),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(f64),
    Text(String),
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Scalar::deserialize(deserializer)? {
        Scalar::Number(value) => Ok(value),
        Scalar::Text(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|err| de::Error::custom(format!("invalid coordinate '{raw}': {err}"))),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Int(i64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Int(value) => value.to_string(),
        Id::Text(value) => value,
    })
}
