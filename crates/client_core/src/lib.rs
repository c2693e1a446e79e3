//! Client-side controller for the ride origin/destination map picker.

pub mod bridge;
pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod geo_client;
pub mod geolocation;
pub mod markers;
pub mod order;
pub mod search;
pub mod selection;
pub mod session;

pub use bridge::{select_bridge, ChannelBridge, HostBridge, LoggingBridge};
pub use config::PickerConfig;
pub use error::{PickerError, PickerResult};
pub use events::PickerEvent;
pub use geo_client::{GeoClient, GeoService};
pub use markers::{HeadlessMap, MapSurface, MarkerStore};
pub use session::PickerSession;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
