//! Viewport synchronization
//!
//! [`ViewportMachine`] is the transition table: it consumes one
//! [`ViewportEvent`] at a time and returns the [`Effect`]s to perform.
//! [`ViewportController`] is the single task that owns the machine, feeds
//! it from an event queue and carries out effects (timers, fetches, map
//! commands). Presentation code holds a [`ViewportHandle`].

mod controller;
mod machine;

pub use controller::*;
pub use machine::*;

use std::time::Duration;

use darkest_hour_core::Coordinate;

use crate::ObservingConditions;

/// The map widget as seen by the controller
pub trait MapView: Send + Sync {
    /// Start an animated move; returns immediately. Implementations may
    /// skip the `moveEnd` notification for programmatic moves.
    fn move_to(&self, center: Coordinate, duration: Duration);

    /// Center the map is showing right now
    fn center(&self) -> Coordinate;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    AutoLocating,
    Flying,
    Settled,
    /// Torn down, every further event and response is dropped
    Terminated,
}

/// Everything the presentation layer needs about the viewport
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub phase: Phase,
    pub settled_center: Option<Coordinate>,
    /// Target of the move in flight
    pub pending_target: Option<Coordinate>,
    pub conditions: Option<ObservingConditions>,
    pub conditions_loading: bool,
    /// Bumped for every issued fetch; a response only lands if its epoch is current
    pub request_epoch: u64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            phase: Phase::Uninitialized,
            settled_center: None,
            pending_target: None,
            conditions: None,
            conditions_loading: false,
            request_epoch: 0,
        }
    }
}

impl ViewportState {
    /// Settled with a conditions refresh in flight
    pub fn is_refreshing(&self) -> bool {
        self.phase == Phase::Settled && self.conditions_loading
    }
}
