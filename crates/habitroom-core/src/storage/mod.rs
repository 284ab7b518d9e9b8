mod config;
pub mod database;
mod memory;
pub mod migrations;
mod store;

pub use config::{Config, LogConfig, StatsConfig, StorageConfig, StreakConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use store::Store;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory.
///
/// `HABITROOM_DATA_DIR` wins when set; otherwise `~/.config/habitroom[-dev]/`
/// based on HABITROOM_ENV (set HABITROOM_ENV=dev to use the development
/// directory). The directory is created if missing.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("HABITROOM_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HABITROOM_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("habitroom-dev")
            } else {
                base_dir.join("habitroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
