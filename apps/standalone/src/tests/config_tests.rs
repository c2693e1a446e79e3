use super::*;

use std::{
    env, fs,
    time::{SystemTime, UNIX_EPOCH},
};

fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}

#[test]
fn defaults_match_picker_constants() {
    let settings = Settings::default();
    let config = settings.picker_config();

    assert_eq!(config.driver_poll_interval, Duration::from_secs(5));
    assert_eq!(config.search_debounce, Duration::from_millis(300));
    assert_eq!(config.geolocation_timeout, Duration::from_secs(8));
    assert_eq!(config.search_limit, 6);
    assert!(settings.fixed_position.is_none());
}

#[test]
fn overrides_replace_only_present_keys() {
    let mut settings = Settings::default();
    apply_overrides(
        &mut settings,
        lookup(&[
            ("api_base", " https://taxi.example "),
            ("poll_interval_secs", "10"),
            ("style_url", ""),
            ("position", "52.97, 158.60"),
        ]),
    )
    .expect("overrides");

    assert_eq!(settings.api_base, "https://taxi.example");
    assert_eq!(settings.poll_interval_secs, 10);
    assert_eq!(settings.style_url, DEFAULT_STYLE_URL);
    assert_eq!(
        settings.fixed_position,
        Some(GeoPoint {
            lat: 52.97,
            lon: 158.60
        })
    );
}

#[test]
fn malformed_numbers_are_rejected() {
    let mut settings = Settings::default();
    let err = apply_overrides(&mut settings, lookup(&[("search_debounce_ms", "soon")]))
        .expect_err("must fail");
    assert!(err.to_string().contains("search_debounce_ms"));
}

#[test]
fn parse_position_validates_range() {
    assert!(parse_position("52.97,158.60").is_ok());
    assert!(parse_position("52.97").is_err());
    assert!(parse_position("95,10").is_err());
}

fn temp_settings_dir(label: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("picker_standalone_{label}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp root");
    dir
}

#[test]
fn settings_file_is_read_when_present() {
    let temp_root = temp_settings_dir("quoted");
    let path = temp_root.join("picker.toml");
    fs::write(&path, "search_debounce_ms = \"450\"\n").expect("write settings");

    let mut settings = Settings::default();
    apply_file(&mut settings, &path).expect("load");
    assert_eq!(settings.search_debounce_ms, 450);

    let mut missing = Settings::default();
    apply_file(&mut missing, &temp_root.join("absent.toml")).expect("missing file is fine");
    assert_eq!(missing, Settings::default());

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn settings_file_accepts_plain_toml_numbers() {
    let temp_root = temp_settings_dir("numbers");
    let path = temp_root.join("picker.toml");
    fs::write(
        &path,
        "poll_interval_secs = 10\nsearch_debounce_ms = 250\napi_base = \"http://10.0.0.5:8000\"\n",
    )
    .expect("write settings");

    let mut settings = Settings::default();
    apply_file(&mut settings, &path).expect("integers are accepted");

    assert_eq!(settings.poll_interval_secs, 10);
    assert_eq!(settings.search_debounce_ms, 250);
    assert_eq!(settings.api_base, "http://10.0.0.5:8000");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn unparseable_settings_file_is_reported() {
    let temp_root = temp_settings_dir("broken");
    let path = temp_root.join("picker.toml");
    fs::write(&path, "poll_interval_secs = = 10\n").expect("write settings");

    let err = apply_file(&mut Settings::default(), &path).expect_err("broken toml");
    assert!(err.to_string().contains("failed to parse settings file"));

    fs::remove_dir_all(temp_root).expect("cleanup");
}
