use std::time::Duration;

use async_trait::async_trait;
use shared::domain::GeoPoint;

use crate::error::{PickerError, PickerResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

/// One-shot device position source.
#[async_trait]
pub trait Geolocation: Send + Sync {
    async fn current_position(&self, request: PositionRequest) -> PickerResult<GeoPoint>;
}

/// Enforces the timeout regardless of whether the provider honours it.
pub async fn acquire_position(
    provider: &dyn Geolocation,
    timeout: Duration,
) -> PickerResult<GeoPoint> {
    let request = PositionRequest {
        high_accuracy: true,
        timeout,
    };
    match tokio::time::timeout(timeout, provider.current_position(request)).await {
        Ok(result) => result,
        Err(_) => Err(PickerError::GeolocationTimeout),
    }
}

pub struct UnavailableGeolocation;

#[async_trait]
impl Geolocation for UnavailableGeolocation {
    async fn current_position(&self, _request: PositionRequest) -> PickerResult<GeoPoint> {
        Err(PickerError::GeolocationUnavailable)
    }
}

pub struct FixedGeolocation(pub GeoPoint);

#[async_trait]
impl Geolocation for FixedGeolocation {
    async fn current_position(&self, _request: PositionRequest) -> PickerResult<GeoPoint> {
        Ok(self.0)
    }
}
