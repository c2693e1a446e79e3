//! Read-only queries against the geocoding/drivers backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use shared::{
    domain::{DriverSighting, GeoPoint, SearchResult},
    protocol::{
        parse_nearby_drivers, PointQuery, ReverseGeocodeResponse, SearchHit, SearchQuery,
        NEARBY_DRIVERS_PATH, REVERSE_PATH, SEARCH_PATH,
    },
};
use tracing::debug;
use url::Url;

use crate::{
    config::PickerConfig,
    error::{PickerError, PickerResult},
};

#[async_trait]
pub trait GeoService: Send + Sync {
    /// `Ok(None)` means the backend answered but had no usable label.
    async fn reverse(&self, point: GeoPoint) -> PickerResult<Option<String>>;
    async fn search(&self, query: &str, limit: u32) -> PickerResult<Vec<SearchResult>>;
    async fn nearby_drivers(&self, origin: GeoPoint) -> PickerResult<Vec<DriverSighting>>;
}

pub struct GeoClient {
    http: Client,
    api_base: String,
}

impl GeoClient {
    pub fn new(api_base: &str, timeout: Duration) -> PickerResult<Self> {
        let api_base = api_base.trim().trim_end_matches('/').to_string();
        Url::parse(&api_base)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, api_base })
    }

    pub fn from_config(config: &PickerConfig) -> PickerResult<Self> {
        Self::new(&config.api_base, config.http_timeout)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> PickerResult<Url> {
        Ok(Url::parse(&format!("{}{path}", self.api_base))?)
    }

    async fn get_json<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> PickerResult<serde_json::Value> {
        let url = self.endpoint(path)?;
        debug!(%url, "geo backend request");
        let body = self
            .http
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;
        Ok(body)
    }
}

fn malformed(what: &str, err: impl std::fmt::Display) -> PickerError {
    PickerError::NetworkFailure(format!("malformed {what} response: {err}"))
}

#[async_trait]
impl GeoService for GeoClient {
    async fn reverse(&self, point: GeoPoint) -> PickerResult<Option<String>> {
        let body = self.get_json(REVERSE_PATH, &PointQuery::from(point)).await?;
        let response: ReverseGeocodeResponse = serde_json::from_value(body).unwrap_or_default();
        Ok(response.label().map(str::to_string))
    }

    async fn search(&self, query: &str, limit: u32) -> PickerResult<Vec<SearchResult>> {
        let body = self
            .get_json(SEARCH_PATH, &SearchQuery { q: query, limit })
            .await?;
        if !body.is_array() {
            return Ok(Vec::new());
        }
        let hits: Vec<SearchHit> =
            serde_json::from_value(body).map_err(|err| malformed("search", err))?;
        hits.into_iter()
            .map(|hit| SearchResult::try_from(hit).map_err(PickerError::from))
            .collect()
    }

    async fn nearby_drivers(&self, origin: GeoPoint) -> PickerResult<Vec<DriverSighting>> {
        let body = self
            .get_json(NEARBY_DRIVERS_PATH, &PointQuery::from(origin))
            .await?;
        let drivers = parse_nearby_drivers(body).map_err(|err| malformed("drivers", err))?;
        drivers
            .into_iter()
            .map(|driver| DriverSighting::try_from(driver).map_err(PickerError::from))
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/geo_client_tests.rs"]
mod tests;
