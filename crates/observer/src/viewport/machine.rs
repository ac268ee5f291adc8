use std::time::Duration;

use darkest_hour_core::Coordinate;
use slog::{debug, trace, warn, Logger};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{FetchError, MapView, ObservingConditions, Phase, ViewportState};

/// Inputs to the viewport state machine
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    /// View created
    Mount,
    /// Geolocation lookup finished
    Located(Option<Coordinate>),
    /// Map reports it stopped moving
    MoveEnd(Coordinate),
    /// A new target was chosen, e.g. from search
    FlyToRequested(Coordinate),
    /// Animation timeout for the given flight elapsed
    SettleDeadline { flight: u64 },
    /// Refresh debounce window elapsed
    RefreshDue(Coordinate),
    ConditionsFetched {
        epoch: u64,
        center: Coordinate,
        result: Result<ObservingConditions, FetchError>,
    },
    /// View destroyed
    Teardown,
}

/// Work the controller performs on behalf of the machine
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    LookupLocation,
    MoveTo {
        center: Coordinate,
        duration: Duration,
    },
    /// Always armed with the same duration as the matching `MoveTo`
    ArmSettleTimer {
        flight: u64,
        duration: Duration,
    },
    CancelSettleTimer,
    ScheduleRefresh(Coordinate),
    CancelRefresh,
    FetchConditions {
        center: Coordinate,
        epoch: u64,
    },
}

pub struct ViewportMachine {
    state: ViewportState,
    flight: u64,
    fly_duration: Duration,
    logger: Logger,
}

impl ViewportMachine {
    pub fn new(fly_duration: Duration, logger: Logger) -> Self {
        Self {
            state: ViewportState::default(),
            flight: 0,
            fly_duration,
            logger,
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Apply one event. `map` is only read when settling without a
    /// reported center (no geolocation, or the animation timeout).
    pub fn step(&mut self, event: ViewportEvent, map: &dyn MapView) -> Vec<Effect> {
        use ViewportEvent::*;

        match (self.state.phase, event) {
            (Phase::Terminated, ConditionsFetched { epoch, center, .. }) => {
                debug!(self.logger, "discarding response after teardown";
                    "epoch" => epoch, "center" => %center);
                vec![]
            }
            (Phase::Terminated, _) => vec![],
            (_, Teardown) => self.teardown(),

            (Phase::Uninitialized, Mount) => {
                self.state.phase = Phase::AutoLocating;
                vec![Effect::LookupLocation]
            }
            (Phase::AutoLocating, Located(Some(target))) => self.begin_flight(target),
            (Phase::AutoLocating, Located(None)) => {
                debug!(self.logger, "no location available, settling on map default");
                self.settle(map.center())
            }

            (Phase::Flying, MoveEnd(center)) => {
                let mut effects = vec![Effect::CancelSettleTimer];
                effects.extend(self.settle(center));
                effects
            }
            (Phase::Flying, SettleDeadline { flight }) if flight == self.flight => {
                self.settle(map.center())
            }
            (Phase::Settled, MoveEnd(center)) => {
                self.state.settled_center = Some(center);
                vec![Effect::ScheduleRefresh(center)]
            }
            (Phase::AutoLocating | Phase::Flying | Phase::Settled, FlyToRequested(target)) => {
                self.begin_flight(target)
            }

            (Phase::Settled, RefreshDue(center)) => self.issue_fetch(center),
            (_, ConditionsFetched {
                epoch,
                center,
                result,
            }) => {
                self.complete_fetch(epoch, center, result);
                vec![]
            }

            (phase, event) => {
                trace!(self.logger, "ignoring event"; "phase" => ?phase, "event" => ?event);
                vec![]
            }
        }
    }

    fn begin_flight(&mut self, target: Coordinate) -> Vec<Effect> {
        self.flight += 1;
        self.state.phase = Phase::Flying;
        self.state.pending_target = Some(target);
        vec![
            Effect::CancelRefresh,
            Effect::MoveTo {
                center: target,
                duration: self.fly_duration,
            },
            Effect::ArmSettleTimer {
                flight: self.flight,
                duration: self.fly_duration,
            },
        ]
    }

    fn settle(&mut self, center: Coordinate) -> Vec<Effect> {
        self.state.phase = Phase::Settled;
        self.state.settled_center = Some(center);
        self.state.pending_target = None;
        vec![Effect::ScheduleRefresh(center)]
    }

    fn issue_fetch(&mut self, center: Coordinate) -> Vec<Effect> {
        self.state.request_epoch += 1;
        self.state.conditions_loading = true;
        vec![Effect::FetchConditions {
            center,
            epoch: self.state.request_epoch,
        }]
    }

    fn complete_fetch(
        &mut self,
        epoch: u64,
        center: Coordinate,
        result: Result<ObservingConditions, FetchError>,
    ) {
        if epoch != self.state.request_epoch {
            debug!(self.logger, "discarding stale conditions response";
                "epoch" => epoch, "current_epoch" => self.state.request_epoch, "center" => %center);
            return;
        }

        self.state.conditions_loading = false;
        match result {
            Ok(conditions) => self.state.conditions = Some(conditions),
            Err(err) => {
                // Keep showing the previous conditions
                let at = OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_default();
                warn!(self.logger, "conditions refresh failed";
                    "latitude" => center.latitude,
                    "longitude" => center.longitude,
                    "at" => at,
                    "kind" => err.kind(),
                    "error" => %err);
            }
        }
    }

    fn teardown(&mut self) -> Vec<Effect> {
        self.state.phase = Phase::Terminated;
        // Nothing issued so far can match again
        self.state.request_epoch += 1;
        self.state.conditions_loading = false;
        self.state.pending_target = None;
        vec![Effect::CancelRefresh, Effect::CancelSettleTimer]
    }
}
