//! Session window gate.
//!
//! Wraps a [`SessionWindow`] with the caller's expiration callback. The gate
//! is driven by `tick()`, either manually or by [`GateRunner`](super::GateRunner).
//!
//! ## Usage
//!
//! ```ignore
//! let mut gate = SessionWindowGate::new(1800, || redirect_to_time_up())?;
//! // Once per second:
//! if let Some(event) = gate.tick() { ... }
//! ```

use std::fmt;

use chrono::Utc;

use super::window::{
    SessionWindow, Transition, WindowId, WindowSnapshot, DEFAULT_WARNING_THRESHOLD_SECS,
};
use crate::error::GateError;
use crate::events::Event;

type ExpireCallback = Box<dyn FnOnce() + Send + 'static>;

/// Time-window gate: counts ticks against a fixed duration and fires
/// `on_expire` exactly once when the duration is used up.
pub struct SessionWindowGate {
    window: SessionWindow,
    /// Taken on expiry; `None` afterwards guarantees a single invocation.
    on_expire: Option<ExpireCallback>,
}

impl SessionWindowGate {
    /// Create a gate with the default 60 second warning threshold.
    ///
    /// # Errors
    /// Returns `GateError::InvalidConfiguration` if `total_duration_secs` is zero.
    pub fn new<F>(total_duration_secs: u64, on_expire: F) -> Result<Self, GateError>
    where
        F: FnOnce() + Send + 'static,
    {
        Self::with_threshold(total_duration_secs, DEFAULT_WARNING_THRESHOLD_SECS, on_expire)
    }

    /// Create a gate with an explicit warning threshold.
    ///
    /// # Errors
    /// Returns `GateError::InvalidConfiguration` if `total_duration_secs` is zero.
    pub fn with_threshold<F>(
        total_duration_secs: u64,
        warning_threshold_secs: u64,
        on_expire: F,
    ) -> Result<Self, GateError>
    where
        F: FnOnce() + Send + 'static,
    {
        let window = SessionWindow::new(total_duration_secs, warning_threshold_secs)?;
        tracing::debug!(
            window_id = %window.id(),
            total_secs = total_duration_secs,
            warning_threshold_secs,
            "session window created"
        );
        Ok(Self {
            window,
            on_expire: Some(Box::new(on_expire)),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &SessionWindow {
        &self.window
    }

    pub fn progress_ratio(&self) -> f64 {
        self.window.progress_ratio()
    }

    pub fn formatted_time(&self) -> String {
        self.window.formatted_time()
    }

    pub fn formatted_remaining(&self) -> String {
        self.window.formatted_remaining()
    }

    pub fn is_warning(&self) -> bool {
        self.window.is_warning()
    }

    pub fn is_expired(&self) -> bool {
        self.window.is_expired()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.window.elapsed_secs()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.window.remaining_secs()
    }

    pub fn total_secs(&self) -> u64 {
        self.window.total_secs()
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.window.snapshot()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance one second. Returns the event for a warning or expiry transition.
    ///
    /// Ticking an expired gate does nothing.
    pub fn tick(&mut self) -> Option<Event> {
        let transition = self.window.advance()?;
        let window_id = self.window.id();
        match transition {
            Transition::WarningEntered => {
                tracing::info!(
                    %window_id,
                    remaining_secs = self.window.remaining_secs(),
                    "session window entered warning"
                );
                Some(Event::WarningEntered {
                    window_id,
                    remaining_secs: self.window.remaining_secs(),
                    at: Utc::now(),
                })
            }
            Transition::Expired => {
                tracing::info!(%window_id, elapsed_secs = self.window.elapsed_secs(), "session window expired");
                if let Some(on_expire) = self.on_expire.take() {
                    on_expire();
                }
                Some(Event::WindowExpired {
                    window_id,
                    elapsed_secs: self.window.elapsed_secs(),
                    at: Utc::now(),
                })
            }
        }
    }
}

impl fmt::Debug for SessionWindowGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionWindowGate")
            .field("window", &self.window)
            .field("expire_pending", &self.on_expire.is_some())
            .finish()
    }
}
