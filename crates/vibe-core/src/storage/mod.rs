mod config;
pub mod store;

pub use config::{Config, FeedConfig, GateConfig, ProfileConfig, UiConfig};
pub use store::SessionStore;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `VIBE_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/vibe[-dev]/`, with `VIBE_ENV=dev` selecting the development
/// directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("VIBE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("VIBE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("vibe-dev")
            } else {
                base_dir.join("vibe")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
