//! Map overlay ownership. `MarkerStore` is the only writer of markers.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use shared::domain::{DriverSighting, GeoPoint};
use tracing::debug;

pub const ORIGIN_COLOR: &str = "#16a34a";
pub const DESTINATION_COLOR: &str = "#111111";
pub const DRIVER_COLOR: &str = "#0f172a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    Origin,
    Destination,
    Driver,
}

impl MarkerRole {
    pub fn color(self) -> &'static str {
        match self {
            Self::Origin => ORIGIN_COLOR,
            Self::Destination => DESTINATION_COLOR,
            Self::Driver => DRIVER_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub role: MarkerRole,
    pub point: GeoPoint,
    pub popup: Option<String>,
}

/// Rendering side of the map library.
pub trait MapSurface: Send + Sync {
    fn add_marker(&self, spec: MarkerSpec) -> MarkerHandle;
    fn remove_marker(&self, handle: MarkerHandle);
    fn fly_to(&self, center: GeoPoint, zoom: f64);
}

pub struct MarkerStore {
    surface: Arc<dyn MapSurface>,
    origin: Option<MarkerHandle>,
    destination: Option<MarkerHandle>,
    drivers: Vec<MarkerHandle>,
}

impl MarkerStore {
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self {
            surface,
            origin: None,
            destination: None,
            drivers: Vec::new(),
        }
    }

    pub fn set_origin(&mut self, point: GeoPoint) {
        if let Some(previous) = self.origin.take() {
            self.surface.remove_marker(previous);
        }
        self.origin = Some(self.surface.add_marker(MarkerSpec {
            role: MarkerRole::Origin,
            point,
            popup: None,
        }));
    }

    pub fn set_destination(&mut self, point: GeoPoint) {
        if let Some(previous) = self.destination.take() {
            self.surface.remove_marker(previous);
        }
        self.destination = Some(self.surface.add_marker(MarkerSpec {
            role: MarkerRole::Destination,
            point,
            popup: None,
        }));
    }

    /// Replaces the whole driver overlay; nothing is carried over between calls.
    pub fn set_drivers(&mut self, sightings: &[DriverSighting]) -> usize {
        for handle in self.drivers.drain(..) {
            self.surface.remove_marker(handle);
        }
        self.drivers = sightings
            .iter()
            .map(|sighting| {
                self.surface.add_marker(MarkerSpec {
                    role: MarkerRole::Driver,
                    point: sighting.point,
                    popup: Some(sighting.popup_label()),
                })
            })
            .collect();
        self.drivers.len()
    }

    pub fn clear_all(&mut self) {
        let handles = self
            .origin
            .take()
            .into_iter()
            .chain(self.destination.take())
            .chain(self.drivers.drain(..))
            .collect::<Vec<_>>();
        debug!(removed = handles.len(), "clearing map overlay");
        for handle in handles {
            self.surface.remove_marker(handle);
        }
    }

    pub fn has_origin(&self) -> bool {
        self.origin.is_some()
    }

    pub fn has_destination(&self) -> bool {
        self.destination.is_some()
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn center_on(&self, point: GeoPoint, zoom: f64) {
        self.surface.fly_to(point, zoom);
    }
}

/// In-memory map used when no rendering library is attached.
#[derive(Default)]
pub struct HeadlessMap {
    next_handle: AtomicU64,
    live: Mutex<BTreeMap<MarkerHandle, MarkerSpec>>,
    camera: Mutex<Option<(GeoPoint, f64)>>,
}

impl HeadlessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_markers(&self) -> Vec<MarkerSpec> {
        self.live
            .lock()
            .map(|live| live.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, role: MarkerRole) -> usize {
        self.live_markers()
            .iter()
            .filter(|spec| spec.role == role)
            .count()
    }

    pub fn camera(&self) -> Option<(GeoPoint, f64)> {
        self.camera.lock().ok().and_then(|camera| *camera)
    }
}

impl MapSurface for HeadlessMap {
    fn add_marker(&self, spec: MarkerSpec) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        debug!(handle = handle.0, role = ?spec.role, point = %spec.point, "marker added");
        if let Ok(mut live) = self.live.lock() {
            live.insert(handle, spec);
        }
        handle
    }

    fn remove_marker(&self, handle: MarkerHandle) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(&handle);
        }
    }

    fn fly_to(&self, center: GeoPoint, zoom: f64) {
        debug!(%center, zoom, "camera moved");
        if let Ok(mut camera) = self.camera.lock() {
            *camera = Some((center, zoom));
        }
    }
}

#[cfg(test)]
#[path = "tests/markers_tests.rs"]
mod tests;
