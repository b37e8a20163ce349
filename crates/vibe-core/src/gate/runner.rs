//! Tokio driver for a [`SessionWindowGate`].
//!
//! The runner arms one `sleep(tick_period)` at a time and re-arms it only
//! after the tick it guarded has run and the window is still open. There is
//! no free-running interval: stopping is just not re-arming.
//!
//! Teardown is signalled over a oneshot channel. Dropping the [`GateHandle`]
//! drops the sender, which the task observes as a cancellation, so the
//! pending tick never outlives its owner.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time;

use super::session_gate::SessionWindowGate;
use super::window::WindowSnapshot;
use crate::events::Event;

/// One tick per second.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// How a runner task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateExit {
    /// The window ran out and `on_expire` was invoked.
    Expired,
    /// The handle was cancelled or dropped before expiry.
    Cancelled,
}

/// Builder for a running gate.
#[derive(Debug)]
pub struct GateRunner {
    gate: SessionWindowGate,
    tick_period: Duration,
}

impl GateRunner {
    pub fn new(gate: SessionWindowGate) -> Self {
        Self {
            gate,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }

    /// Length of one tick in wall-clock time. Tests and demos shorten it.
    pub fn tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Spawn the tick task on the current tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self) -> GateHandle {
        let Self {
            mut gate,
            tick_period,
        } = self;
        let window_id = gate.id();
        let (snapshot_tx, snapshot_rx) = watch::channel(gate.snapshot());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            tracing::info!(
                %window_id,
                total_secs = gate.total_secs(),
                tick_ms = tick_period.as_millis() as u64,
                "session window opened"
            );
            let _ = event_tx.send(Event::WindowOpened {
                window_id,
                total_secs: gate.total_secs(),
                at: Utc::now(),
            });

            loop {
                // One-shot: armed for this tick only.
                let next_tick = time::sleep(tick_period);
                tokio::select! {
                    biased;
                    _ = &mut cancel_rx => {
                        tracing::info!(
                            %window_id,
                            elapsed_secs = gate.elapsed_secs(),
                            "session window closed before expiry"
                        );
                        let _ = event_tx.send(Event::WindowClosed {
                            window_id,
                            elapsed_secs: gate.elapsed_secs(),
                            at: Utc::now(),
                        });
                        return GateExit::Cancelled;
                    }
                    _ = next_tick => {
                        let event = gate.tick();
                        tracing::debug!(%window_id, elapsed_secs = gate.elapsed_secs(), "tick");
                        let _ = snapshot_tx.send(gate.snapshot());
                        if let Some(event) = event {
                            let _ = event_tx.send(event);
                        }
                        if gate.is_expired() {
                            return GateExit::Expired;
                        }
                    }
                }
            }
        });

        GateHandle {
            snapshots: snapshot_rx,
            events: Some(event_rx),
            cancel: Some(cancel_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running window. Dropping it tears the window down.
#[derive(Debug)]
pub struct GateHandle {
    snapshots: watch::Receiver<WindowSnapshot>,
    events: Option<mpsc::UnboundedReceiver<Event>>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<GateExit>>,
}

impl GateHandle {
    /// Latest state published by the tick task.
    pub fn snapshot(&self) -> WindowSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that is notified after every tick.
    pub fn subscribe(&self) -> watch::Receiver<WindowSnapshot> {
        self.snapshots.clone()
    }

    /// Take the event stream. Returns `None` if it was already taken.
    pub fn events(&mut self) -> Option<mpsc::UnboundedReceiver<Event>> {
        self.events.take()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Wait until the window expires or is cancelled elsewhere.
    pub async fn wait(mut self) -> GateExit {
        self.join().await
    }

    /// Tear the window down and wait for the tick task to stop.
    ///
    /// Once this returns no further tick, state change, or callback happens.
    /// If the window already expired this reports `Expired`.
    pub async fn cancel(mut self) -> GateExit {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        self.join().await
    }

    async fn join(&mut self) -> GateExit {
        let Some(task) = self.task.take() else {
            return GateExit::Cancelled;
        };
        match task.await {
            Ok(exit) => exit,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => GateExit::Cancelled,
        }
    }
}

impl Drop for GateHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn gate(total: u64, fired: &Arc<AtomicUsize>) -> SessionWindowGate {
        let counter = Arc::clone(fired);
        SessionWindowGate::with_threshold(total, 1, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_expiry() {
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = GateRunner::new(gate(3, &fired)).spawn();
        let exit = handle.wait().await;
        assert_eq!(exit, GateExit::Expired);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn emits_lifecycle_events_in_order() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut handle = GateRunner::new(gate(3, &fired)).spawn();
        let mut events = handle.events().unwrap();
        assert!(handle.events().is_none());
        assert_eq!(handle.wait().await, GateExit::Expired);

        let mut kinds = Vec::new();
        while let Some(event) = events.recv().await {
            kinds.push(match event {
                Event::WindowOpened { .. } => "opened",
                Event::WarningEntered { .. } => "warning",
                Event::WindowExpired { .. } => "expired",
                Event::WindowClosed { .. } => "closed",
                Event::ChallengeSelected { .. } | Event::ChallengeCompleted { .. } => "other",
            });
        }
        assert_eq!(kinds, vec!["opened", "warning", "expired"]);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels_pending_tick() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut handle = GateRunner::new(gate(10, &fired)).spawn();
        let mut events = handle.events().unwrap();
        let snapshots = handle.subscribe();

        time::sleep(Duration::from_millis(2_500)).await;
        drop(handle);
        time::sleep(Duration::from_secs(60)).await;

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(snapshots.borrow().elapsed_secs, 2);

        let mut last = None;
        while let Some(event) = events.recv().await {
            last = Some(event);
        }
        assert!(matches!(last, Some(Event::WindowClosed { elapsed_secs: 2, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_tick_period() {
        let fired = Arc::new(AtomicUsize::new(0));
        let handle = GateRunner::new(gate(4, &fired))
            .tick_period(Duration::from_millis(10))
            .spawn();
        let started = time::Instant::now();
        assert_eq!(handle.wait().await, GateExit::Expired);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(40), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(1), "{elapsed:?}");
    }
}
