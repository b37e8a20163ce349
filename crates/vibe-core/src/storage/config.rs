//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Session window length, warning threshold, and tick cadence
//! - Accent and warning colors for the countdown
//! - Mock feed size and seed
//! - Profile requirements
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::gate::{DEFAULT_TOTAL_DURATION_SECS, DEFAULT_WARNING_THRESHOLD_SECS};
use crate::profile::{Interest, DEFAULT_MIN_INTERESTS};

/// Session window configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_warning_threshold_secs")]
    pub warning_threshold_secs: u64,
    /// Wall-clock length of one tick. Only demos and tests change this.
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

/// UI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
    #[serde(default = "default_warning_color")]
    pub warning_color: String,
}

/// Feed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_post_count")]
    pub post_count: usize,
    /// Fixed seed for the mock feed; random when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Profile configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_min_interests")]
    pub min_interests: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Keys that accept `none` or an empty value to clear them.
const NULLABLE_KEYS: &[&str] = &["feed.seed"];

// Default functions
fn default_duration_secs() -> u64 {
    DEFAULT_TOTAL_DURATION_SECS
}
fn default_warning_threshold_secs() -> u64 {
    DEFAULT_WARNING_THRESHOLD_SECS
}
fn default_tick_millis() -> u64 {
    1000
}
fn default_accent_color() -> String {
    "#3b82f6".into()
}
fn default_warning_color() -> String {
    "#ef4444".into()
}
fn default_post_count() -> usize {
    3
}
fn default_min_interests() -> usize {
    DEFAULT_MIN_INTERESTS
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            warning_threshold_secs: default_warning_threshold_secs(),
            tick_millis: default_tick_millis(),
        }
    }
}

impl GateConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
            warning_color: default_warning_color(),
        }
    }
}

impl UiConfig {
    /// Color for the countdown bar given the warning latch.
    pub fn countdown_color(&self, warning: bool) -> &str {
        if warning {
            &self.warning_color
        } else {
            &self.accent_color
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            post_count: default_post_count(),
            seed: None,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            min_interests: default_min_interests(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                if !obj.contains_key(part) {
                    return Err(unknown());
                }
                if NULLABLE_KEYS.contains(&key)
                    && (value.is_empty() || value.eq_ignore_ascii_case("none"))
                {
                    obj.insert(part.to_string(), serde_json::Value::Null);
                    return Ok(());
                }
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    // Every nullable field is numeric.
                    serde_json::Value::Number(_) | serde_json::Value::Null => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing and returning the default if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the field's type.
    ///
    /// Does not write to disk; call [`Config::save`] afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config fails validation. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.gate.duration_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "gate.duration_secs".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.gate.tick_millis == 0 {
            return Err(ConfigError::InvalidValue {
                key: "gate.tick_millis".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.profile.min_interests > Interest::ALL.len() {
            return Err(ConfigError::InvalidValue {
                key: "profile.min_interests".into(),
                message: format!("cannot exceed the {} known interests", Interest::ALL.len()),
            });
        }
        for (key, color) in [
            ("ui.accent_color", &self.ui.accent_color),
            ("ui.warning_color", &self.ui.warning_color),
        ] {
            if !is_hex_color(color) {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("'{color}' is not a #rrggbb color"),
                });
            }
        }
        Ok(())
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
