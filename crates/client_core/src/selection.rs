//! Pick-mode state machine. The single `SelectionState` lives here and is only
//! mutated through `SelectionStateMachine` methods.

use shared::domain::{GeoPoint, LocatedAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickMode {
    /// Next pick target is inferred from which endpoint is still unset.
    #[default]
    None,
    PickingFrom,
    PickingTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Origin,
    Destination,
}

impl Endpoint {
    fn mode(self) -> PickMode {
        match self {
            Self::Origin => PickMode::PickingFrom,
            Self::Destination => PickMode::PickingTo,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub pick_mode: PickMode,
    pub origin: Option<LocatedAddress>,
    pub destination: Option<LocatedAddress>,
}

impl SelectionState {
    pub fn is_complete(&self) -> bool {
        self.origin.is_some() && self.destination.is_some()
    }

    pub fn origin_point(&self) -> Option<GeoPoint> {
        self.origin.as_ref().map(|origin| origin.point)
    }
}

/// Outcome of one `select` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub assigned: Endpoint,
    pub located: LocatedAddress,
    pub next_mode: PickMode,
    /// Origin to poll drivers around after this transition.
    pub driver_anchor: Option<GeoPoint>,
}

#[derive(Debug, Default)]
pub struct SelectionStateMachine {
    state: SelectionState,
}

impl SelectionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn pick_mode(&self) -> PickMode {
        self.state.pick_mode
    }

    pub fn origin(&self) -> Option<&LocatedAddress> {
        self.state.origin.as_ref()
    }

    pub fn destination(&self) -> Option<&LocatedAddress> {
        self.state.destination.as_ref()
    }

    pub fn next_target(&self) -> Endpoint {
        match self.state.pick_mode {
            PickMode::PickingFrom => Endpoint::Origin,
            PickMode::PickingTo => Endpoint::Destination,
            PickMode::None if self.state.origin.is_none() => Endpoint::Origin,
            PickMode::None => Endpoint::Destination,
        }
    }

    pub fn select(&mut self, point: GeoPoint, address: impl Into<String>) -> Transition {
        let located = LocatedAddress::new(point, address);
        let assigned = self.next_target();
        match assigned {
            Endpoint::Origin => {
                self.state.origin = Some(located.clone());
                self.state.pick_mode = PickMode::PickingTo;
            }
            Endpoint::Destination => {
                self.state.destination = Some(located.clone());
                self.state.pick_mode = PickMode::None;
            }
        }

        Transition {
            assigned,
            located,
            next_mode: self.state.pick_mode,
            driver_anchor: self.state.origin_point(),
        }
    }

    /// Explicit "pick from"/"pick to" command; overrides inference for the next pick.
    pub fn force(&mut self, endpoint: Endpoint) {
        self.state.pick_mode = endpoint.mode();
    }

    pub fn reset(&mut self) {
        self.state = SelectionState::default();
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
