mod config;
pub mod database;
pub mod migrations;

pub use config::{CatalogConfig, Config, PasswordPolicy, SweepConfig};
pub use database::{Database, UserAccount};

use std::path::PathBuf;

/// Returns `~/.config/habitkeeper[-dev]/` based on HABITKEEPER_ENV.
///
/// Set HABITKEEPER_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITKEEPER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitkeeper-dev")
    } else {
        base_dir.join("habitkeeper")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
