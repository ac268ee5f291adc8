use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Collapses bursts of calls into the last one after a quiet window
///
/// At most one timer is outstanding: scheduling aborts the previous timer
/// task rather than letting it fire and be ignored. When a timer elapses
/// its payload is delivered on `tx`, which is normally the owner's own
/// event queue.
pub struct Debouncer<T> {
    delay: Duration,
    tx: UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, tx: UnboundedSender<T>) -> Self {
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Deliver `payload` after the configured delay unless superseded
    pub fn schedule(&mut self, payload: T) {
        self.schedule_in(self.delay, payload);
    }

    /// Same as [`Debouncer::schedule`] with an explicit delay
    pub fn schedule_in(&mut self, delay: Duration, payload: T) {
        self.cancel();
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            // Receiver gone means the owner was torn down
            let _ = tx.send(payload);
        }));
    }

    /// Abort the outstanding timer, returns whether one was pending
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
