//! SQLite-backed session store.
//!
//! Holds the small amount of per-user state the app keeps between runs:
//! - The user profile
//! - The current challenge
//!
//! Values are JSON in a `kv` table. Every typed read is validated, so a
//! hand-edited or stale record surfaces as `StoreError::Corrupt` instead of
//! leaking into the views.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::data_dir;
use crate::challenge::CurrentChallenge;
use crate::error::{Result, StoreError};
use crate::profile::UserProfile;

/// Highest schema version this build reads.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_KEY: &str = "schema_version";
const PROFILE_KEY: &str = "user_profile";
const CHALLENGE_KEY: &str = "current_challenge";

/// Typed key-value store for session state.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open the store at `<data_dir>/vibe.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("vibe.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        match self.kv_get(SCHEMA_KEY)? {
            None => self.kv_set(SCHEMA_KEY, &SCHEMA_VERSION.to_string())?,
            Some(raw) => {
                let found = raw.parse::<u32>().map_err(|e| StoreError::Corrupt {
                    key: SCHEMA_KEY.into(),
                    message: e.to_string(),
                })?;
                if found > SCHEMA_VERSION {
                    return Err(StoreError::SchemaMismatch {
                        found,
                        supported: SCHEMA_VERSION,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    // ── Raw kv ───────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key. Returns whether it existed.
    pub fn kv_delete(&self, key: &str) -> Result<bool> {
        let n = self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.kv_get(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw).map_err(|e| {
            tracing::warn!(key, error = %e, "stored record failed to parse");
            StoreError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Some(value))
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.kv_set(key, &raw)
    }

    // ── Typed records ────────────────────────────────────────────────

    pub fn load_profile(&self) -> Result<Option<UserProfile>> {
        let profile: Option<UserProfile> = self.get_json(PROFILE_KEY)?;
        if let Some(profile) = &profile {
            profile.validate().map_err(|e| corrupt(PROFILE_KEY, e))?;
        }
        Ok(profile)
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        profile.validate()?;
        self.set_json(PROFILE_KEY, profile)
    }

    pub fn load_challenge(&self) -> Result<Option<CurrentChallenge>> {
        let current: Option<CurrentChallenge> = self.get_json(CHALLENGE_KEY)?;
        if let Some(current) = &current {
            current.validate().map_err(|e| corrupt(CHALLENGE_KEY, e))?;
        }
        Ok(current)
    }

    pub fn save_challenge(&self, current: &CurrentChallenge) -> Result<()> {
        current.validate()?;
        self.set_json(CHALLENGE_KEY, current)
    }

    pub fn clear_challenge(&self) -> Result<bool> {
        self.kv_delete(CHALLENGE_KEY)
    }
}

fn corrupt(key: &str, err: impl std::fmt::Display) -> StoreError {
    tracing::warn!(key, error = %err, "stored record failed validation");
    StoreError::Corrupt {
        key: key.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::Submission;
    use crate::error::CoreError;
    use crate::profile::InterestRating;
    use chrono::Utc;

    #[test]
    fn kv_store() {
        let store = SessionStore::open_memory().unwrap();
        assert!(store.kv_get("test").unwrap().is_none());
        store.kv_set("test", "hello").unwrap();
        assert_eq!(store.kv_get("test").unwrap().unwrap(), "hello");
        assert!(store.kv_delete("test").unwrap());
        assert!(!store.kv_delete("test").unwrap());
    }

    #[test]
    fn schema_version_is_recorded() {
        let store = SessionStore::open_memory().unwrap();
        assert_eq!(store.kv_get(SCHEMA_KEY).unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn profile_roundtrip() {
        let store = SessionStore::open_memory().unwrap();
        assert!(store.load_profile().unwrap().is_none());

        let mut profile = UserProfile::new("Sam", "sam").unwrap();
        let interests = ["music", "art:5", "reading"]
            .iter()
            .map(|s| InterestRating::parse(s).unwrap())
            .collect();
        profile.set_interests(interests, 3).unwrap();
        store.save_profile(&profile).unwrap();

        assert_eq!(store.load_profile().unwrap(), Some(profile));
    }

    #[test]
    fn challenge_roundtrip_and_clear() {
        let store = SessionStore::open_memory().unwrap();
        let now = Utc::now();
        let mut current = CurrentChallenge::select("reading-2", now).unwrap();
        store.save_challenge(&current).unwrap();
        assert!(!store.load_challenge().unwrap().unwrap().completed);

        current
            .complete(Submission::Text { body: "Piranesi".into() }, now)
            .unwrap();
        store.save_challenge(&current).unwrap();
        assert!(store.load_challenge().unwrap().unwrap().unlocks_feed());

        assert!(store.clear_challenge().unwrap());
        assert!(store.load_challenge().unwrap().is_none());
    }

    #[test]
    fn malformed_json_is_corrupt() {
        let store = SessionStore::open_memory().unwrap();
        store.kv_set(PROFILE_KEY, "{not json").unwrap();
        let err = store.load_profile().unwrap_err();
        assert!(matches!(err, CoreError::Store(StoreError::Corrupt { ref key, .. }) if key == PROFILE_KEY));
    }

    #[test]
    fn invalid_record_is_corrupt() {
        let store = SessionStore::open_memory().unwrap();
        let now = Utc::now();
        let mut current = CurrentChallenge::select("music-1", now).unwrap();
        current.challenge.id = "retired-1".into();
        store
            .kv_set(CHALLENGE_KEY, &serde_json::to_string(&current).unwrap())
            .unwrap();
        let err = store.load_challenge().unwrap_err();
        assert!(matches!(err, CoreError::Store(StoreError::Corrupt { .. })));
    }

    #[test]
    fn newer_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibe.db");
        {
            let store = SessionStore::open_at(&path).unwrap();
            store.kv_set(SCHEMA_KEY, "99").unwrap();
        }
        let err = SessionStore::open_at(&path).err().unwrap();
        assert!(matches!(
            err,
            CoreError::Store(StoreError::SchemaMismatch { found: 99, .. })
        ));
    }

    #[test]
    fn on_disk_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibe.db");
        let profile = UserProfile::new("Ria", "ria").unwrap();
        SessionStore::open_at(&path).unwrap().save_profile(&profile).unwrap();
        let loaded = SessionStore::open_at(&path).unwrap().load_profile().unwrap();
        assert_eq!(loaded.map(|p| p.username), Some("ria".to_string()));
    }
}
