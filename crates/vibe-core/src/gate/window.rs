//! Session window state.
//!
//! A `SessionWindow` is a bounded elapsed-time counter. It does not own a
//! clock or a timer; whoever drives it calls `advance()` once per tick.
//!
//! ## State Transitions
//!
//! ```text
//! Active -> Warning -> Expired
//! ```
//!
//! A window no longer than the warning threshold starts in `Warning`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GateError;

/// Access window length used by the feed (30 minutes).
pub const DEFAULT_TOTAL_DURATION_SECS: u64 = 30 * 60;

/// Remaining time at or below which the window reports a warning.
pub const DEFAULT_WARNING_THRESHOLD_SECS: u64 = 60;

/// Identifier of a single window instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(Uuid);

impl WindowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    Active,
    Warning,
    Expired,
}

/// What a single `advance()` changed, if anything worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WarningEntered,
    Expired,
}

/// Bounded elapsed-time counter with a one-way warning latch.
#[derive(Debug, Clone)]
pub struct SessionWindow {
    id: WindowId,
    total_secs: u64,
    elapsed_secs: u64,
    warning_threshold_secs: u64,
    warning: bool,
}

impl SessionWindow {
    /// Create a fresh window.
    ///
    /// # Errors
    /// Returns `GateError::InvalidConfiguration` if `total_secs` is zero.
    pub fn new(total_secs: u64, warning_threshold_secs: u64) -> Result<Self, GateError> {
        if total_secs == 0 {
            return Err(GateError::InvalidConfiguration {
                total_duration_secs: total_secs,
                reason: "duration must be positive".into(),
            });
        }
        Ok(Self {
            id: WindowId::new(),
            total_secs,
            elapsed_secs: 0,
            warning_threshold_secs,
            // A window that is already inside the threshold is shown as warning from the start.
            warning: total_secs <= warning_threshold_secs,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.total_secs.saturating_sub(self.elapsed_secs)
    }

    pub fn warning_threshold_secs(&self) -> u64 {
        self.warning_threshold_secs
    }

    pub fn is_warning(&self) -> bool {
        self.warning
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed_secs >= self.total_secs
    }

    pub fn state(&self) -> WindowState {
        if self.is_expired() {
            WindowState::Expired
        } else if self.warning {
            WindowState::Warning
        } else {
            WindowState::Active
        }
    }

    /// 0.0 .. 1.0 share of the window already used.
    pub fn progress_ratio(&self) -> f64 {
        self.elapsed_secs as f64 / self.total_secs as f64
    }

    /// Elapsed time as `M:SS`.
    pub fn formatted_time(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    /// Remaining time as `M:SS`.
    pub fn formatted_remaining(&self) -> String {
        format_clock(self.remaining_secs())
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            window_id: self.id,
            state: self.state(),
            total_secs: self.total_secs,
            elapsed_secs: self.elapsed_secs,
            remaining_secs: self.remaining_secs(),
            progress_ratio: self.progress_ratio(),
            warning: self.warning,
            expired: self.is_expired(),
            elapsed_clock: self.formatted_time(),
            remaining_clock: self.formatted_remaining(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance by one second. A no-op once the window has expired.
    pub fn advance(&mut self) -> Option<Transition> {
        if self.is_expired() {
            return None;
        }
        self.elapsed_secs += 1;
        if self.is_expired() {
            return Some(Transition::Expired);
        }
        if !self.warning && self.remaining_secs() <= self.warning_threshold_secs {
            self.warning = true;
            return Some(Transition::WarningEntered);
        }
        None
    }
}

/// Render-time view of a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub window_id: WindowId,
    pub state: WindowState,
    pub total_secs: u64,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    pub progress_ratio: f64,
    pub warning: bool,
    pub expired: bool,
    pub elapsed_clock: String,
    pub remaining_clock: String,
}

/// Format seconds as `M:SS`: minutes unpadded, seconds zero-padded.
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_duration() {
        let err = SessionWindow::new(0, DEFAULT_WARNING_THRESHOLD_SECS).unwrap_err();
        assert!(matches!(
            err,
            GateError::InvalidConfiguration {
                total_duration_secs: 0,
                ..
            }
        ));
    }

    #[test]
    fn fresh_window_is_active() {
        let window = SessionWindow::new(1800, 60).unwrap();
        assert_eq!(window.state(), WindowState::Active);
        assert_eq!(window.elapsed_secs(), 0);
        assert_eq!(window.remaining_secs(), 1800);
        assert_eq!(window.progress_ratio(), 0.0);
        assert_eq!(window.formatted_time(), "0:00");
        assert_eq!(window.formatted_remaining(), "30:00");
    }

    #[test]
    fn format_clock_examples() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(5), "0:05");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(90), "1:30");
        assert_eq!(format_clock(1800), "30:00");
        assert_eq!(format_clock(3661), "61:01");
    }

    #[test]
    fn advance_reports_warning_then_expiry() {
        let mut window = SessionWindow::new(3, 1).unwrap();
        assert_eq!(window.advance(), None);
        assert_eq!(window.advance(), Some(Transition::WarningEntered));
        assert_eq!(window.state(), WindowState::Warning);
        assert_eq!(window.advance(), Some(Transition::Expired));
        assert_eq!(window.state(), WindowState::Expired);
        assert_eq!(window.advance(), None);
        assert_eq!(window.elapsed_secs(), 3);
    }

    #[test]
    fn remaining_holds_at_zero_after_expiry() {
        let mut window = SessionWindow::new(2, 60).unwrap();
        for _ in 0..5 {
            window.advance();
        }
        assert_eq!(window.remaining_secs(), 0);
        assert_eq!(window.formatted_remaining(), "0:00");
        assert_eq!(window.progress_ratio(), 1.0);
    }

    #[test]
    fn short_window_starts_latched() {
        let window = SessionWindow::new(30, 60).unwrap();
        assert!(window.is_warning());
        assert_eq!(window.state(), WindowState::Warning);
    }

    #[test]
    fn snapshot_mirrors_queries() {
        let mut window = SessionWindow::new(120, 60).unwrap();
        for _ in 0..65 {
            window.advance();
        }
        let snap = window.snapshot();
        assert_eq!(snap.window_id, window.id());
        assert_eq!(snap.elapsed_secs, 65);
        assert_eq!(snap.remaining_secs, 55);
        assert_eq!(snap.elapsed_clock, "1:05");
        assert_eq!(snap.remaining_clock, "0:55");
        assert!(snap.warning);
        assert!(!snap.expired);
    }

    #[test]
    fn window_ids_are_unique() {
        let a = SessionWindow::new(10, 1).unwrap();
        let b = SessionWindow::new(10, 1).unwrap();
        assert_ne!(a.id(), b.id());
    }
}
