//! UI-facing events published by the picker session.

use shared::domain::SearchResult;

use crate::{bridge::ThemeVariables, error::PickerError, selection::Endpoint};

pub const STATUS_CHOOSE_FROM: &str = "Choose “From” and tap the map";
pub const STATUS_FORCED_FROM: &str = "Mode: choosing “From”. Tap the map";
pub const STATUS_FORCED_TO: &str = "Mode: choosing “To”. Tap the map";
pub const STATUS_FROM_SET: &str = "From selected ✅. Now choose “To”";
pub const STATUS_TO_SET: &str = "To selected ✅. You can press “Order”";

pub const ALERT_TAP_UNRESOLVED: &str = "Could not resolve the address. Try again.";
pub const ALERT_INCOMPLETE: &str = "Choose both “From” and “To”.";
pub const ALERT_GEOLOCATION_UNAVAILABLE: &str = "Geolocation is unavailable.";
pub const ALERT_GEOLOCATION_FAILED: &str = "Could not get your position.";
pub const ALERT_SUBMIT_FAILED: &str = "Could not send the order. Try again.";
pub const ALERT_STANDALONE_SUBMIT: &str =
    "Opened outside the chat app. Inside the mini app the order goes to the bot automatically.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ok,
    Warn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    Status {
        text: String,
        kind: StatusKind,
    },
    InputsChanged {
        from: String,
        to: String,
    },
    DriversUpdated {
        count: usize,
    },
    SearchResults(Vec<SearchResult>),
    Alert(String),
    ThemeApplied(ThemeVariables),
    OrderSubmitted {
        delivered: bool,
    },
}

impl PickerEvent {
    pub fn status(text: &str, kind: StatusKind) -> Self {
        Self::Status {
            text: text.to_string(),
            kind,
        }
    }

    pub fn assigned(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Origin => Self::status(STATUS_FROM_SET, StatusKind::Ok),
            Endpoint::Destination => Self::status(STATUS_TO_SET, StatusKind::Ok),
        }
    }

    pub fn forced(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Origin => Self::status(STATUS_FORCED_FROM, StatusKind::Warn),
            Endpoint::Destination => Self::status(STATUS_FORCED_TO, StatusKind::Warn),
        }
    }

    pub fn alert(text: &str) -> Self {
        Self::Alert(text.to_string())
    }
}

/// User-facing text for failures that are surfaced at all.
pub fn alert_text(err: &PickerError) -> &'static str {
    match err {
        PickerError::IncompleteSelection => ALERT_INCOMPLETE,
        PickerError::GeolocationUnavailable => ALERT_GEOLOCATION_UNAVAILABLE,
        PickerError::GeolocationDenied | PickerError::GeolocationTimeout => {
            ALERT_GEOLOCATION_FAILED
        }
        PickerError::Bridge(_) | PickerError::Encode(_) => ALERT_SUBMIT_FAILED,
        _ => ALERT_TAP_UNRESOLVED,
    }
}
