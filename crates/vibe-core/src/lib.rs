//! # Vibe Core Library
//!
//! Core logic for Vibe, a daily-challenge journaling app: complete today's
//! challenge, then browse friends' posts for a limited time. The CLI binary
//! is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Gate**: the session window that unlocks the feed and expires it.
//!   The pure state machine is ticked by the caller; [`GateRunner`] drives
//!   it on tokio with one re-armed sleep per tick
//! - **Challenges**: catalog, selection, and completion
//! - **Storage**: TOML configuration and a SQLite-backed session store
//! - **Feed**: post model and the [`FeedSource`] seam
//!
//! ## Key Components
//!
//! - [`SessionWindowGate`]: time-window gate with a one-shot expiry callback
//! - [`GateRunner`] / [`GateHandle`]: scheduled ticking and teardown
//! - [`SessionStore`]: typed per-user state
//! - [`Config`]: application configuration

pub mod access;
pub mod challenge;
pub mod error;
pub mod events;
pub mod feed;
pub mod gate;
pub mod profile;
pub mod storage;

pub use access::open_feed_window;
pub use challenge::{Challenge, ChallengeKind, CurrentChallenge, Difficulty, Submission};
pub use error::{ConfigError, CoreError, GateError, StoreError, ValidationError};
pub use events::Event;
pub use feed::{FeedPost, FeedSource, MockFeedSource};
pub use gate::{GateExit, GateHandle, GateRunner, SessionWindowGate, WindowSnapshot};
pub use profile::{Interest, InterestRating, UserProfile};
pub use storage::{Config, SessionStore};
