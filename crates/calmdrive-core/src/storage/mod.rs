mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, DrivingConfig, GuidanceConfig, MediaConfig, UiConfig};
pub use database::{Database, NewSession, SessionRecord, Stats, UserSettings};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/calmdrive[-dev]/` based on CALMDRIVE_ENV.
///
/// Set CALMDRIVE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CALMDRIVE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("calmdrive-dev")
    } else {
        base_dir.join("calmdrive")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
