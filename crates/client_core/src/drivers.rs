//! Nearby-driver polling anchored at the current origin.

use std::{future::Future, sync::Arc, time::Duration};

use shared::domain::GeoPoint;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    error::PickerResult, events::PickerEvent, geo_client::GeoService, markers::MarkerStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Rendered(usize),
    /// The origin moved or was cleared while the poll was in flight.
    Superseded,
}

pub struct DriverSyncLoop {
    geo: Arc<dyn GeoService>,
    markers: Arc<Mutex<MarkerStore>>,
    events: broadcast::Sender<PickerEvent>,
    anchor: Mutex<Option<GeoPoint>>,
}

impl DriverSyncLoop {
    pub fn new(
        geo: Arc<dyn GeoService>,
        markers: Arc<Mutex<MarkerStore>>,
        events: broadcast::Sender<PickerEvent>,
    ) -> Self {
        Self {
            geo,
            markers,
            events,
            anchor: Mutex::new(None),
        }
    }

    pub async fn anchor(&self) -> Option<GeoPoint> {
        *self.anchor.lock().await
    }

    /// Records the origin polls are anchored at. Only the selection owner calls this,
    /// so a poll started for an older origin can never take the anchor back.
    pub async fn track(&self, origin: GeoPoint) {
        *self.anchor.lock().await = Some(origin);
    }

    /// Polls around `origin` if it is still the anchor. A failed poll leaves the
    /// rendered drivers and the badge as they were.
    pub async fn refresh(&self, origin: GeoPoint) -> PickerResult<RefreshOutcome> {
        if *self.anchor.lock().await != Some(origin) {
            debug!(%origin, "skipping driver poll for an origin that is no longer current");
            return Ok(RefreshOutcome::Superseded);
        }

        let sightings = match self.geo.nearby_drivers(origin).await {
            Ok(sightings) => sightings,
            Err(err) => {
                warn!(error = %err, %origin, "driver poll failed; keeping previous drivers");
                return Err(err);
            }
        };

        let anchor = self.anchor.lock().await;
        if *anchor != Some(origin) {
            debug!(%origin, "discarding driver poll for a superseded origin");
            return Ok(RefreshOutcome::Superseded);
        }
        let count = self.markers.lock().await.set_drivers(&sightings);
        drop(anchor);

        debug!(count, %origin, "driver markers replaced");
        let _ = self.events.send(PickerEvent::DriversUpdated { count });
        Ok(RefreshOutcome::Rendered(count))
    }

    pub fn spawn_refresh(self: &Arc<Self>, origin: GeoPoint) -> JoinHandle<()> {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            // Failures are already logged; nothing is surfaced to the rider.
            let _ = sync.refresh(origin).await;
        })
    }

    /// Forgets the anchor and removes every driver marker.
    pub async fn clear(&self) {
        let mut anchor = self.anchor.lock().await;
        *anchor = None;
        self.markers.lock().await.set_drivers(&[]);
        drop(anchor);
        let _ = self.events.send(PickerEvent::DriversUpdated { count: 0 });
    }

    /// Ticks every `period`; a tick without an origin does nothing.
    pub fn spawn_periodic<F, Fut>(
        self: &Arc<Self>,
        period: Duration,
        current_origin: F,
    ) -> JoinHandle<()>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Option<GeoPoint>> + Send + 'static,
    {
        let sync = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(origin) = current_origin().await else {
                    continue;
                };
                let _ = sync.refresh(origin).await;
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/drivers_tests.rs"]
mod tests;
