//! Wires rider input to the selection machine, markers, search, driver polling
//! and order handoff. All selection mutations go through `selection`.

use std::sync::Arc;

use shared::domain::{GeoPoint, LocatedAddress, SearchResult};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    bridge::{HostBridge, MainButton, ThemeVariables},
    config::PickerConfig,
    drivers::{DriverSyncLoop, RefreshOutcome},
    error::{PickerError, PickerResult},
    events::{alert_text, PickerEvent, StatusKind, ALERT_STANDALONE_SUBMIT, STATUS_CHOOSE_FROM},
    geo_client::GeoService,
    geolocation::{acquire_position, Geolocation},
    markers::{MapSurface, MarkerStore},
    order::{OrderComposer, SubmitOutcome},
    search::SearchController,
    selection::{Endpoint, SelectionState, SelectionStateMachine, Transition},
};

pub struct PickerSession {
    config: PickerConfig,
    geo: Arc<dyn GeoService>,
    geolocation: Arc<dyn Geolocation>,
    bridge: Arc<dyn HostBridge>,
    selection: Mutex<SelectionStateMachine>,
    markers: Arc<Mutex<MarkerStore>>,
    search: SearchController,
    drivers: Arc<DriverSyncLoop>,
    order: OrderComposer,
    comment: Mutex<String>,
    events: broadcast::Sender<PickerEvent>,
    poll_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl PickerSession {
    pub fn new(
        config: PickerConfig,
        geo: Arc<dyn GeoService>,
        surface: Arc<dyn MapSurface>,
        bridge: Arc<dyn HostBridge>,
        geolocation: Arc<dyn Geolocation>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let markers = Arc::new(Mutex::new(MarkerStore::new(surface)));
        let search = SearchController::new(Arc::clone(&geo), events.clone(), &config);
        let drivers = Arc::new(DriverSyncLoop::new(
            Arc::clone(&geo),
            Arc::clone(&markers),
            events.clone(),
        ));
        let order = OrderComposer::new(Arc::clone(&bridge));

        Arc::new(Self {
            config,
            geo,
            geolocation,
            bridge,
            selection: Mutex::new(SelectionStateMachine::new()),
            markers,
            search,
            drivers,
            order,
            comment: Mutex::new(String::new()),
            events,
            poll_task: std::sync::Mutex::new(None),
        })
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PickerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: PickerEvent) {
        let _ = self.events.send(event);
    }

    /// Host handshake, initial camera, clean selection, and the periodic driver poll.
    pub async fn start(self: &Arc<Self>) {
        self.on_theme_changed();
        self.bridge.ready();
        self.bridge.expand();
        self.bridge.set_main_button(MainButton::Hidden);
        self.markers
            .lock()
            .await
            .center_on(self.config.initial_center, self.config.initial_zoom);
        self.reset().await;

        let weak = Arc::downgrade(self);
        let task = self
            .drivers
            .spawn_periodic(self.config.driver_poll_interval, move || {
                let weak = weak.clone();
                async move {
                    let session = weak.upgrade()?;
                    session.origin_point().await
                }
            });
        let previous = match self.poll_task.lock() {
            Ok(mut slot) => slot.replace(task),
            Err(poisoned) => poisoned.into_inner().replace(task),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
        info!(api_base = %self.config.api_base, "picker session started");
    }

    pub fn shutdown(&self) {
        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }

    /// Re-reads the host theme; hosts call this on their theme-changed notification.
    pub fn on_theme_changed(&self) -> ThemeVariables {
        let theme = self
            .bridge
            .theme_params()
            .map(|params| ThemeVariables::from_params(&params))
            .unwrap_or_default();
        self.emit(PickerEvent::ThemeApplied(theme.clone()));
        theme
    }

    pub async fn selection(&self) -> SelectionState {
        self.selection.lock().await.state().clone()
    }

    pub async fn origin_point(&self) -> Option<GeoPoint> {
        self.selection.lock().await.state().origin_point()
    }

    pub async fn driver_count(&self) -> usize {
        self.markers.lock().await.driver_count()
    }

    pub async fn search_results(&self) -> Vec<SearchResult> {
        self.search.results().await
    }

    /// A tap exists only to resolve that spot, so a failed lookup abandons the pick.
    pub async fn on_map_tap(&self, point: GeoPoint) -> PickerResult<Transition> {
        let located = match self.resolve_address(point).await {
            Ok(address) => LocatedAddress::new(point, address),
            Err(PickerError::UnresolvedAddress) => LocatedAddress::with_fallback(point, None),
            Err(err) => {
                warn!(error = %err, %point, "reverse geocode failed for map tap");
                self.emit(PickerEvent::alert(alert_text(&err)));
                return Err(err);
            }
        };
        Ok(self.apply_pick(located, false).await)
    }

    pub async fn on_search_input(&self, text: &str) {
        self.search.input(text).await;
    }

    pub async fn on_search_pick(&self, index: usize) -> Option<Transition> {
        let chosen = self.search.choose(index).await?;
        self.markers
            .lock()
            .await
            .center_on(chosen.point, self.config.focus_zoom);
        let located = LocatedAddress::new(chosen.point, chosen.display_name);
        Some(self.apply_pick(located, false).await)
    }

    /// Device position becomes "From" when no origin is set yet; address lookup is best-effort.
    pub async fn on_locate_me(&self) -> PickerResult<Transition> {
        let point =
            match acquire_position(self.geolocation.as_ref(), self.config.geolocation_timeout)
                .await
            {
                Ok(point) => point,
                Err(err) => {
                    warn!(error = %err, "geolocation failed");
                    self.emit(PickerEvent::alert(alert_text(&err)));
                    return Err(err);
                }
            };

        self.markers
            .lock()
            .await
            .center_on(point, self.config.focus_zoom);

        let located = match self.resolve_address(point).await {
            Ok(address) => LocatedAddress::new(point, address),
            Err(err) => {
                debug!(error = %err, %point, "no address for device position; using coordinates");
                LocatedAddress::with_fallback(point, None)
            }
        };
        Ok(self.apply_pick(located, true).await)
    }

    async fn resolve_address(&self, point: GeoPoint) -> PickerResult<String> {
        self.geo
            .reverse(point)
            .await?
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .ok_or(PickerError::UnresolvedAddress)
    }

    pub async fn force_pick(&self, endpoint: Endpoint) {
        self.selection.lock().await.force(endpoint);
        self.emit(PickerEvent::forced(endpoint));
    }

    pub async fn set_comment(&self, text: &str) {
        *self.comment.lock().await = text.to_string();
    }

    pub async fn reset(&self) {
        let state = {
            let mut machine = self.selection.lock().await;
            machine.reset();
            self.drivers.clear().await;
            self.markers.lock().await.clear_all();
            machine.state().clone()
        };
        self.search.clear().await;

        self.emit_inputs(&state);
        self.order.refresh_affordance(&state);
        self.emit(PickerEvent::status(STATUS_CHOOSE_FROM, StatusKind::Warn));
    }

    /// On-demand poll around the current origin; `None` when there is no origin.
    pub async fn refresh_drivers(&self) -> PickerResult<Option<RefreshOutcome>> {
        match self.origin_point().await {
            Some(origin) => self.drivers.refresh(origin).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn submit(&self) -> PickerResult<SubmitOutcome> {
        let state = self.selection().await;
        let comment = self.comment.lock().await.clone();

        match self.order.submit(&state, &comment) {
            Ok(outcome) => {
                let delivered = matches!(outcome, SubmitOutcome::Delivered(_));
                if !delivered {
                    self.emit(PickerEvent::alert(ALERT_STANDALONE_SUBMIT));
                }
                self.emit(PickerEvent::OrderSubmitted { delivered });
                Ok(outcome)
            }
            Err(err) => {
                if !matches!(err, PickerError::IncompleteSelection) {
                    warn!(error = %err, "order submission failed");
                }
                self.emit(PickerEvent::alert(alert_text(&err)));
                Err(err)
            }
        }
    }

    async fn apply_pick(&self, located: LocatedAddress, origin_first: bool) -> Transition {
        let (transition, state) = {
            let mut machine = self.selection.lock().await;
            if origin_first && machine.origin().is_none() {
                machine.force(Endpoint::Origin);
            }
            let transition = machine.select(located.point, located.address);

            let mut markers = self.markers.lock().await;
            match transition.assigned {
                Endpoint::Origin => markers.set_origin(transition.located.point),
                Endpoint::Destination => markers.set_destination(transition.located.point),
            }
            drop(markers);
            if let Some(anchor) = transition.driver_anchor {
                self.drivers.track(anchor).await;
            }
            (transition, machine.state().clone())
        };

        debug!(
            assigned = ?transition.assigned,
            address = %transition.located.address,
            "point selected"
        );
        self.emit(PickerEvent::assigned(transition.assigned));
        self.emit_inputs(&state);
        self.order.refresh_affordance(&state);

        if let Some(anchor) = transition.driver_anchor {
            self.drivers.spawn_refresh(anchor);
        }
        transition
    }

    fn emit_inputs(&self, state: &SelectionState) {
        let label = |point: &Option<LocatedAddress>| {
            point
                .as_ref()
                .map(|located| located.address.clone())
                .unwrap_or_default()
        };
        self.emit(PickerEvent::InputsChanged {
            from: label(&state.origin),
            to: label(&state.destination),
        });
    }
}

impl Drop for PickerSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
