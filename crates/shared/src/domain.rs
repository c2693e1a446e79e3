use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GeoPointError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoPointError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lon)
    }
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoPointError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoPointError::LatitudeOutOfRange(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(GeoPointError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Label used wherever a human-readable address could not be resolved.
    pub fn coordinate_label(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lon)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate_label())
    }
}

/// A point together with the label shown to the rider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedAddress {
    #[serde(flatten)]
    pub point: GeoPoint,
    pub address: String,
}

impl LocatedAddress {
    pub fn new(point: GeoPoint, address: impl Into<String>) -> Self {
        Self {
            point,
            address: address.into(),
        }
    }

    /// Uses `address` when present and non-blank, the coordinate label otherwise.
    pub fn with_fallback(point: GeoPoint, address: Option<&str>) -> Self {
        match address.map(str::trim).filter(|label| !label.is_empty()) {
            Some(label) => Self::new(point, label),
            None => Self::new(point, point.coordinate_label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverSighting {
    pub driver_id: String,
    pub point: GeoPoint,
    pub age_seconds: i64,
}

impl DriverSighting {
    pub fn popup_label(&self) -> String {
        format!("Driver {} • {}s", self.driver_id, self.age_seconds)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub display_name: String,
    pub point: GeoPoint,
}

/// Order handed to the host bridge once both endpoints are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub from: LocatedAddress,
    pub to: Vec<LocatedAddress>,
    pub comment: String,
}

impl OrderPayload {
    pub fn single_stop(from: LocatedAddress, to: LocatedAddress, comment: &str) -> Self {
        Self {
            from,
            to: vec![to],
            comment: comment.trim().to_string(),
        }
    }
}
