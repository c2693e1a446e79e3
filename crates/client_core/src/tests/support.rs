use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use shared::domain::{DriverSighting, GeoPoint, SearchResult};

use crate::{
    error::{PickerError, PickerResult},
    geo_client::GeoService,
    geolocation::{Geolocation, PositionRequest},
};

pub fn point(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).expect("valid test point")
}

pub fn sighting(driver_id: &str, lat: f64, lon: f64, age_seconds: i64) -> DriverSighting {
    DriverSighting {
        driver_id: driver_id.to_string(),
        point: point(lat, lon),
        age_seconds,
    }
}

pub fn result(display_name: &str, lat: f64, lon: f64) -> SearchResult {
    SearchResult {
        display_name: display_name.to_string(),
        point: point(lat, lon),
    }
}

/// Scripted backend. Queued answers are consumed in order; an empty queue
/// answers "no label" / no drivers.
#[derive(Default)]
pub struct FakeGeo {
    reverse_answers: Mutex<VecDeque<Result<Option<String>, String>>>,
    search_answer: Mutex<Option<Result<Vec<SearchResult>, String>>>,
    driver_answers: Mutex<VecDeque<Result<Vec<DriverSighting>, String>>>,
    driver_delay: Mutex<Option<Duration>>,
    pub reverse_calls: Mutex<Vec<GeoPoint>>,
    pub search_calls: Mutex<Vec<(String, u32)>>,
    pub driver_calls: Mutex<Vec<GeoPoint>>,
}

impl FakeGeo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_reverse(&self, answer: Result<Option<&str>, &str>) {
        self.reverse_answers.lock().expect("lock").push_back(
            answer
                .map(|label| label.map(str::to_string))
                .map_err(str::to_string),
        );
    }

    pub fn set_search(&self, answer: Result<Vec<SearchResult>, &str>) {
        *self.search_answer.lock().expect("lock") = Some(answer.map_err(str::to_string));
    }

    pub fn push_drivers(&self, answer: Result<Vec<DriverSighting>, &str>) {
        self.driver_answers
            .lock()
            .expect("lock")
            .push_back(answer.map_err(str::to_string));
    }

    pub fn delay_drivers(&self, delay: Duration) {
        *self.driver_delay.lock().expect("lock") = Some(delay);
    }

    pub fn search_queries(&self) -> Vec<String> {
        self.search_calls
            .lock()
            .expect("lock")
            .iter()
            .map(|(query, _)| query.clone())
            .collect()
    }

    pub fn driver_polls(&self) -> Vec<GeoPoint> {
        self.driver_calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl GeoService for FakeGeo {
    async fn reverse(&self, point: GeoPoint) -> PickerResult<Option<String>> {
        self.reverse_calls.lock().expect("lock").push(point);
        let answer = self.reverse_answers.lock().expect("lock").pop_front();
        match answer {
            Some(Ok(label)) => Ok(label),
            Some(Err(err)) => Err(PickerError::NetworkFailure(err)),
            None => Ok(None),
        }
    }

    async fn search(&self, query: &str, limit: u32) -> PickerResult<Vec<SearchResult>> {
        self.search_calls
            .lock()
            .expect("lock")
            .push((query.to_string(), limit));
        let answer = self.search_answer.lock().expect("lock").clone();
        match answer {
            Some(Ok(results)) => Ok(results),
            Some(Err(err)) => Err(PickerError::NetworkFailure(err)),
            None => Ok(Vec::new()),
        }
    }

    async fn nearby_drivers(&self, origin: GeoPoint) -> PickerResult<Vec<DriverSighting>> {
        self.driver_calls.lock().expect("lock").push(origin);
        let answer = self.driver_answers.lock().expect("lock").pop_front();
        let delay = *self.driver_delay.lock().expect("lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match answer {
            Some(Ok(drivers)) => Ok(drivers),
            Some(Err(err)) => Err(PickerError::NetworkFailure(err)),
            None => Ok(Vec::new()),
        }
    }
}

pub enum FakePosition {
    At(GeoPoint),
    Denied,
    Hang,
}

pub struct FakeGeolocation(pub FakePosition);

#[async_trait]
impl Geolocation for FakeGeolocation {
    async fn current_position(&self, _request: PositionRequest) -> PickerResult<GeoPoint> {
        match &self.0 {
            FakePosition::At(point) => Ok(*point),
            FakePosition::Denied => Err(PickerError::GeolocationDenied),
            FakePosition::Hang => {
                std::future::pending::<()>().await;
                Err(PickerError::GeolocationUnavailable)
            }
        }
    }
}
