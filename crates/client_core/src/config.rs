use std::time::Duration;

use shared::domain::GeoPoint;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_STYLE_URL: &str = "https://demotiles.maplibre.org/style.json";

#[derive(Debug, Clone)]
pub struct PickerConfig {
    pub api_base: String,
    pub style_url: String,
    pub http_timeout: Duration,
    pub search_debounce: Duration,
    pub search_min_chars: usize,
    pub search_limit: u32,
    pub driver_poll_interval: Duration,
    pub geolocation_timeout: Duration,
    pub initial_center: GeoPoint,
    pub initial_zoom: f64,
    pub focus_zoom: f64,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            style_url: DEFAULT_STYLE_URL.into(),
            http_timeout: Duration::from_secs(15),
            search_debounce: Duration::from_millis(300),
            search_min_chars: 3,
            search_limit: 6,
            driver_poll_interval: Duration::from_secs(5),
            geolocation_timeout: Duration::from_secs(8),
            initial_center: GeoPoint {
                lat: 52.93,
                lon: 158.40,
            },
            initial_zoom: 11.0,
            focus_zoom: 15.0,
        }
    }
}
