use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::{config::DEFAULT_STYLE_URL, PickerConfig};
use shared::domain::GeoPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base: String,
    pub style_url: String,
    pub poll_interval_secs: u64,
    pub search_debounce_ms: u64,
    pub geolocation_timeout_secs: u64,
    pub fixed_position: Option<GeoPoint>,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = PickerConfig::default();
        Self {
            api_base: defaults.api_base,
            style_url: DEFAULT_STYLE_URL.into(),
            poll_interval_secs: defaults.driver_poll_interval.as_secs(),
            search_debounce_ms: defaults.search_debounce.as_millis() as u64,
            geolocation_timeout_secs: defaults.geolocation_timeout.as_secs(),
            fixed_position: None,
        }
    }
}

impl Settings {
    pub fn picker_config(&self) -> PickerConfig {
        PickerConfig {
            api_base: self.api_base.clone(),
            style_url: self.style_url.clone(),
            driver_poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            geolocation_timeout: Duration::from_secs(self.geolocation_timeout_secs.max(1)),
            ..PickerConfig::default()
        }
    }
}

/// Defaults, then `path` (flat toml table) when it exists, then environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();
    apply_file(&mut settings, path)?;
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Values may be written as toml strings, integers or floats.
fn apply_file(settings: &mut Settings, path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let file_cfg = toml::from_str::<toml::Table>(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    apply_overrides(settings, |key| file_cfg.get(key).and_then(scalar))
}

fn scalar(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(v) => Some(v.clone()),
        toml::Value::Integer(v) => Some(v.to_string()),
        toml::Value::Float(v) => Some(v.to_string()),
        _ => None,
    }
}

fn apply_env_overrides(settings: &mut Settings) -> anyhow::Result<()> {
    apply_overrides(settings, |key| {
        let upper = key.to_ascii_uppercase();
        std::env::var(format!("APP__{upper}"))
            .ok()
            .or_else(|| match key {
                "api_base" => std::env::var("TAXI_API_BASE").ok(),
                "style_url" => std::env::var("TAXI_STYLE_URL").ok(),
                _ => None,
            })
    })
}

fn apply_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(v) = value("api_base") {
        settings.api_base = v;
    }
    if let Some(v) = value("style_url") {
        settings.style_url = v;
    }
    if let Some(v) = value("poll_interval_secs") {
        settings.poll_interval_secs = v
            .parse()
            .with_context(|| format!("invalid poll_interval_secs '{v}'"))?;
    }
    if let Some(v) = value("search_debounce_ms") {
        settings.search_debounce_ms = v
            .parse()
            .with_context(|| format!("invalid search_debounce_ms '{v}'"))?;
    }
    if let Some(v) = value("geolocation_timeout_secs") {
        settings.geolocation_timeout_secs = v
            .parse()
            .with_context(|| format!("invalid geolocation_timeout_secs '{v}'"))?;
    }
    if let Some(v) = value("position") {
        settings.fixed_position = Some(parse_position(&v)?);
    }
    Ok(())
}

/// Parses `"lat,lon"`.
pub fn parse_position(raw: &str) -> anyhow::Result<GeoPoint> {
    let (lat, lon) = raw
        .split_once(',')
        .with_context(|| format!("position '{raw}' must look like 'lat,lon'"))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid latitude in '{raw}'"))?;
    let lon = lon
        .trim()
        .parse::<f64>()
        .with_context(|| format!("invalid longitude in '{raw}'"))?;
    Ok(GeoPoint::new(lat, lon)?)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
