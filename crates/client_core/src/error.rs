use shared::error::GeoPointError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("network failure: {0}")]
    NetworkFailure(String),
    #[error("address could not be resolved")]
    UnresolvedAddress,
    #[error("origin and destination must both be selected")]
    IncompleteSelection,
    #[error("geolocation is unavailable")]
    GeolocationUnavailable,
    #[error("geolocation permission denied")]
    GeolocationDenied,
    #[error("geolocation timed out")]
    GeolocationTimeout,
    #[error("invalid coordinates: {0}")]
    InvalidPoint(#[from] GeoPointError),
    #[error("failed to encode order payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("host bridge rejected the order: {0}")]
    Bridge(String),
}

impl From<reqwest::Error> for PickerError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkFailure(err.to_string())
    }
}

impl From<url::ParseError> for PickerError {
    fn from(err: url::ParseError) -> Self {
        Self::NetworkFailure(format!("invalid endpoint url: {err}"))
    }
}

pub type PickerResult<T> = std::result::Result<T, PickerError>;
