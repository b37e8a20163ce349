use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeKind;
use crate::gate::WindowId;

/// Every state change in the system produces an Event.
/// The CLI prints them; the runner forwards gate events to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A gated window was created and its first tick armed.
    WindowOpened {
        window_id: WindowId,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    /// Remaining time crossed the warning threshold. Emitted once per window.
    WarningEntered {
        window_id: WindowId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// The window ran out. Emitted once per window.
    WindowExpired {
        window_id: WindowId,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// The window was torn down before it expired.
    WindowClosed {
        window_id: WindowId,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    ChallengeSelected {
        challenge_id: String,
        kind: ChallengeKind,
        at: DateTime<Utc>,
    },
    ChallengeCompleted {
        challenge_id: String,
        kind: ChallengeKind,
        at: DateTime<Utc>,
    },
}
