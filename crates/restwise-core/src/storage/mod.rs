mod config;
pub mod timetable;

pub use config::{Config, ExplainerConfig, LoggingConfig};
pub use timetable::Timetable;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the Restwise data directory, creating it if needed.
///
/// `RESTWISE_HOME` overrides the location entirely. Otherwise this is
/// `~/.config/restwise[-dev]/`, with the `-dev` suffix when
/// `RESTWISE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("RESTWISE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("RESTWISE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("restwise-dev")
            } else {
                base_dir.join("restwise")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
