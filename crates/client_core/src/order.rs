//! Outbound order payload: readiness, composition, and handoff to the host.

use std::sync::Arc;

use shared::domain::OrderPayload;
use tracing::{debug, info};

use crate::{
    bridge::{HostBridge, MainButton},
    error::{PickerError, PickerResult},
    selection::SelectionState,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Handed to the embedding runtime.
    Delivered(OrderPayload),
    /// Standalone run: the serialized payload was only logged.
    LoggedOnly(String),
}

pub struct OrderComposer {
    bridge: Arc<dyn HostBridge>,
}

impl OrderComposer {
    pub fn new(bridge: Arc<dyn HostBridge>) -> Self {
        Self { bridge }
    }

    pub fn is_ready(state: &SelectionState) -> bool {
        state.is_complete()
    }

    pub fn compose(state: &SelectionState, comment: &str) -> PickerResult<OrderPayload> {
        match (&state.origin, &state.destination) {
            (Some(from), Some(to)) => Ok(OrderPayload::single_stop(
                from.clone(),
                to.clone(),
                comment,
            )),
            _ => Err(PickerError::IncompleteSelection),
        }
    }

    /// Pushes the submit control state for `state` to the host and returns it.
    pub fn refresh_affordance(&self, state: &SelectionState) -> MainButton {
        let button = if Self::is_ready(state) {
            MainButton::order()
        } else {
            MainButton::Hidden
        };
        self.bridge.set_main_button(button.clone());
        button
    }

    pub fn submit(&self, state: &SelectionState, comment: &str) -> PickerResult<SubmitOutcome> {
        let payload = Self::compose(state, comment)?;
        let json = serde_json::to_string(&payload)?;

        self.bridge
            .send_data(&json)
            .map_err(|err| PickerError::Bridge(err.to_string()))?;

        if !self.bridge.is_embedded() {
            return Ok(SubmitOutcome::LoggedOnly(json));
        }

        info!(bytes = json.len(), "order handed to host bridge");
        if let Err(err) = self.bridge.close() {
            debug!(error = %err, "host bridge close signal failed");
        }
        Ok(SubmitOutcome::Delivered(payload))
    }
}

#[cfg(test)]
#[path = "tests/order_tests.rs"]
mod tests;
