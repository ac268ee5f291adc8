use std::sync::Arc;
use std::time::Duration;

use darkest_hour_core::{Coordinate, DEFAULT_FLY_DURATION_MS, DEFAULT_REFRESH_DEBOUNCE_MS};
use slog::{debug, info, o, Logger};
use time::OffsetDateTime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;

use crate::{
    derive, Debouncer, Effect, ForecastSource, Geolocator, MapView, ViewportEvent,
    ViewportMachine, ViewportState,
};

#[derive(Debug, Clone, Copy)]
pub struct ViewportSettings {
    /// Quiet window before conditions are refetched
    pub refresh_debounce: Duration,
    /// Animated move duration, also the settle fallback timeout
    pub fly_duration: Duration,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            refresh_debounce: Duration::from_millis(DEFAULT_REFRESH_DEBOUNCE_MS),
            fly_duration: Duration::from_millis(DEFAULT_FLY_DURATION_MS),
        }
    }
}

/// Owns one view's [`ViewportMachine`] and performs its effects
///
/// Runs as a single task. Commands from the presentation side and
/// completions from timers/fetches arrive on separate queues but are
/// applied one at a time, so the state needs no locking.
pub struct ViewportController {
    machine: ViewportMachine,
    map: Arc<dyn MapView>,
    geolocator: Arc<dyn Geolocator>,
    forecasts: Arc<dyn ForecastSource>,
    commands: UnboundedReceiver<ViewportEvent>,
    internal_tx: UnboundedSender<ViewportEvent>,
    internal_rx: UnboundedReceiver<ViewportEvent>,
    refresh: Debouncer<ViewportEvent>,
    settle_timer: Debouncer<ViewportEvent>,
    state_tx: watch::Sender<ViewportState>,
    logger: Logger,
}

impl ViewportController {
    /// Mount a controller for a new view and start it on the current runtime
    pub fn spawn(
        settings: ViewportSettings,
        map: Arc<dyn MapView>,
        geolocator: Arc<dyn Geolocator>,
        forecasts: Arc<dyn ForecastSource>,
        logger: Logger,
    ) -> ViewportHandle {
        let logger = logger.new(o!("component" => "viewport"));
        let (command_tx, commands) = unbounded_channel();
        let (internal_tx, internal_rx) = unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ViewportState::default());

        let controller = ViewportController {
            machine: ViewportMachine::new(settings.fly_duration, logger.clone()),
            map,
            geolocator,
            forecasts,
            commands,
            refresh: Debouncer::new(settings.refresh_debounce, internal_tx.clone()),
            settle_timer: Debouncer::new(settings.fly_duration, internal_tx.clone()),
            internal_tx,
            internal_rx,
            state_tx,
            logger,
        };

        // Queued before the task starts, so it is always the first event
        let _ = command_tx.send(ViewportEvent::Mount);
        tokio::spawn(controller.run());

        ViewportHandle {
            tx: command_tx,
            state: state_rx,
        }
    }

    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                command = self.commands.recv() => {
                    // Every handle dropped is the same as unmounting the view
                    command.unwrap_or(ViewportEvent::Teardown)
                }
                Some(event) = self.internal_rx.recv() => event,
            };

            let is_teardown = matches!(event, ViewportEvent::Teardown);
            let effects = self.machine.step(event, self.map.as_ref());
            for effect in effects {
                self.apply(effect);
            }
            self.publish();

            if is_teardown {
                info!(self.logger, "viewport torn down");
                break;
            }
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::LookupLocation => {
                let geolocator = Arc::clone(&self.geolocator);
                let tx = self.internal_tx.clone();
                tokio::spawn(async move {
                    let found = geolocator.lookup().await;
                    let _ = tx.send(ViewportEvent::Located(found));
                });
            }
            Effect::MoveTo { center, duration } => {
                debug!(self.logger, "moving map"; "center" => %center);
                self.map.move_to(center, duration);
            }
            Effect::ArmSettleTimer { flight, duration } => {
                self.settle_timer
                    .schedule_in(duration, ViewportEvent::SettleDeadline { flight });
            }
            Effect::CancelSettleTimer => {
                self.settle_timer.cancel();
            }
            Effect::ScheduleRefresh(center) => {
                self.refresh.schedule(ViewportEvent::RefreshDue(center));
            }
            Effect::CancelRefresh => {
                self.refresh.cancel();
            }
            Effect::FetchConditions { center, epoch } => {
                debug!(self.logger, "fetching conditions"; "center" => %center, "epoch" => epoch);
                let forecasts = Arc::clone(&self.forecasts);
                let tx = self.internal_tx.clone();
                // Not aborted when superseded; the epoch check drops the result
                tokio::spawn(async move {
                    let result = forecasts
                        .fetch(center)
                        .await
                        .map(|raw| derive(&raw, OffsetDateTime::now_utc()));
                    let _ = tx.send(ViewportEvent::ConditionsFetched {
                        epoch,
                        center,
                        result,
                    });
                });
            }
        }
    }

    fn publish(&self) {
        let next = self.machine.state();
        self.state_tx.send_if_modified(|current| {
            if current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
    }
}

/// Presentation-side access to a running controller
#[derive(Clone)]
pub struct ViewportHandle {
    tx: UnboundedSender<ViewportEvent>,
    state: watch::Receiver<ViewportState>,
}

impl ViewportHandle {
    /// The map finished a user-driven or animated move
    pub fn move_end(&self, center: Coordinate) {
        let _ = self.tx.send(ViewportEvent::MoveEnd(center));
    }

    /// Animate to a new target, e.g. a picked search result
    pub fn fly_to(&self, center: Coordinate) {
        let _ = self.tx.send(ViewportEvent::FlyToRequested(center));
    }

    /// Unmount: cancels timers and drops any response still in flight
    pub fn teardown(&self) {
        let _ = self.tx.send(ViewportEvent::Teardown);
    }

    /// Latest published state
    pub fn state(&self) -> ViewportState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ViewportState> {
        self.state.clone()
    }
}
