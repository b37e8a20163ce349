//! Feed access: a completed challenge buys one fresh session window.

use crate::error::{Result, ValidationError};
use crate::gate::SessionWindowGate;
use crate::storage::{GateConfig, SessionStore};

/// Open a feed window if today's challenge is completed.
///
/// Every call builds a new window; nothing about a previous window carries over.
///
/// # Errors
/// Returns `ValidationError::FeedLocked` when there is no completed
/// challenge, `GateError::InvalidConfiguration` for a zero duration, and any
/// store error from reading the current challenge.
pub fn open_feed_window<F>(
    store: &SessionStore,
    gate: &GateConfig,
    on_expire: F,
) -> Result<SessionWindowGate>
where
    F: FnOnce() + Send + 'static,
{
    let unlocked = store
        .load_challenge()?
        .is_some_and(|current| current.unlocks_feed());
    if !unlocked {
        return Err(ValidationError::FeedLocked.into());
    }
    let window =
        SessionWindowGate::with_threshold(gate.duration_secs, gate.warning_threshold_secs, on_expire)?;
    tracing::info!(window_id = %window.id(), total_secs = gate.duration_secs, "feed unlocked");
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::{CurrentChallenge, Submission};
    use crate::error::{CoreError, GateError};
    use chrono::Utc;

    fn completed_store() -> SessionStore {
        let store = SessionStore::open_memory().unwrap();
        let now = Utc::now();
        let mut current = CurrentChallenge::select("music-1", now).unwrap();
        current
            .complete(Submission::Text { body: "Dreams".into() }, now)
            .unwrap();
        store.save_challenge(&current).unwrap();
        store
    }

    #[test]
    fn locked_without_challenge() {
        let store = SessionStore::open_memory().unwrap();
        let err = open_feed_window(&store, &GateConfig::default(), || {}).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::FeedLocked)));
    }

    #[test]
    fn locked_with_pending_challenge() {
        let store = SessionStore::open_memory().unwrap();
        let current = CurrentChallenge::select("art-1", Utc::now()).unwrap();
        store.save_challenge(&current).unwrap();
        let err = open_feed_window(&store, &GateConfig::default(), || {}).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::FeedLocked)));
    }

    #[test]
    fn completed_challenge_opens_fresh_windows() {
        let store = completed_store();
        let config = GateConfig::default();
        let mut first = open_feed_window(&store, &config, || {}).unwrap();
        first.tick();
        let second = open_feed_window(&store, &config, || {}).unwrap();
        assert_eq!(second.total_secs(), 1800);
        assert_eq!(second.elapsed_secs(), 0);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn zero_duration_config_is_rejected() {
        let store = completed_store();
        let config = GateConfig {
            duration_secs: 0,
            ..GateConfig::default()
        };
        let err = open_feed_window(&store, &config, || {}).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Gate(GateError::InvalidConfiguration { .. })
        ));
    }
}
