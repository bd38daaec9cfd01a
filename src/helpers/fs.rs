//! File System Utilities
//!
//! Settings and log directory management.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::constants::APP_NAME;
use crate::error::{Error, Result};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("fr", "geotrek", APP_NAME).ok_or_else(|| Error::Invalid {
        message: "Could not determine project directories".to_string(),
    })
}

/// Get or create the application's configuration directory
///
/// Platform-specific locations:
/// - **Linux**: `~/.config/rando-configurator/` or `$XDG_CONFIG_HOME/rando-configurator/`
/// - **macOS**: `~/Library/Application Support/fr.geotrek.rando-configurator/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\geotrek\rando-configurator\config\`
pub fn get_or_create_config_dir() -> Result<PathBuf> {
    let project_dirs = project_dirs()?;
    let config_dir = project_dirs.config_dir();

    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
    }

    Ok(config_dir.to_path_buf())
}

/// Get the data directory, used for rolling log files
///
/// Platform-specific locations:
/// - **Linux**: `~/.local/share/rando-configurator/`
/// - **macOS**: `~/Library/Application Support/fr.geotrek.rando-configurator/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\geotrek\rando-configurator\data\`
pub fn get_or_create_data_dir() -> Result<PathBuf> {
    let project_dirs = project_dirs()?;
    let data_dir = project_dirs.data_dir();

    if !data_dir.exists() {
        fs::create_dir_all(data_dir)?;
    }

    Ok(data_dir.to_path_buf())
}

/// Check if running in development mode
pub fn is_development() -> bool {
    cfg!(debug_assertions)
}
