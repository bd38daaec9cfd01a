//! Configurator Settings
//!
//! Persisted TOML settings: where previews and widget assets live, timing
//! of the debounced paths, HTTP timeout and export switches.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::constants::{
    APP_NAME, DEFAULT_PREVIEW_BASE_HREF, DEFAULT_WIDGET_ASSET_BASE, HTTP_TIMEOUT_SECS,
    OPTIONS_DEBOUNCE_MS, PREVIEW_DEBOUNCE_MS, PREVIEW_RELOAD_DELAY_MS, SYNC_DEBOUNCE_MS,
};
use crate::error::Result;
use crate::export::ExportOptions;
use crate::helpers::get_or_create_config_dir;
use crate::i18n::detect_language;

/// Settle delays of the debounced paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub sync_debounce_ms: u64,
    pub preview_debounce_ms: u64,
    pub preview_reload_delay_ms: u64,
    pub options_debounce_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            sync_debounce_ms: SYNC_DEBOUNCE_MS,
            preview_debounce_ms: PREVIEW_DEBOUNCE_MS,
            preview_reload_delay_ms: PREVIEW_RELOAD_DELAY_MS,
            options_debounce_ms: OPTIONS_DEBOUNCE_MS,
        }
    }
}

impl TimingSettings {
    pub fn sync_debounce(&self) -> Duration {
        Duration::from_millis(self.sync_debounce_ms)
    }

    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    pub fn preview_reload_delay(&self) -> Duration {
        Duration::from_millis(self.preview_reload_delay_ms)
    }

    pub fn options_debounce(&self) -> Duration {
        Duration::from_millis(self.options_debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Also write a daily-rolling log file
    pub file: bool,
}

/// Persisted configurator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfiguratorSettings {
    /// Base href the preview route is resolved against
    pub preview_base_href: String,
    /// Directory URL of the published widget bundle
    pub widget_asset_base: String,
    /// Interface language; detected from the system locale when unset
    pub ui_language: Option<String>,
    /// Directory with `<lang>.json` files overriding embedded translations
    pub translations_dir: Option<PathBuf>,
    pub timing: TimingSettings,
    pub http: HttpSettings,
    pub export: ExportOptions,
    pub logging: LoggingSettings,
}

impl Default for ConfiguratorSettings {
    fn default() -> Self {
        Self {
            preview_base_href: DEFAULT_PREVIEW_BASE_HREF.to_string(),
            widget_asset_base: DEFAULT_WIDGET_ASSET_BASE.to_string(),
            ui_language: None,
            translations_dir: None,
            timing: TimingSettings::default(),
            http: HttpSettings::default(),
            export: ExportOptions::default(),
            logging: LoggingSettings::default(),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let config_dir = get_or_create_config_dir()?;
    Ok(config_dir.join(format!("{APP_NAME}.toml")))
}

impl ConfiguratorSettings {
    /// Load settings from the default location
    pub fn try_load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load settings from a file, creating it empty when missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            std::fs::write(path, "")?;
        }
        info!(path = ?path, "Loading settings file");
        let value = std::fs::read_to_string(path)?;

        if value.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = toml::from_str(&value).map_err(|e| {
            error!(error = %e, path = ?path, "Failed to parse settings file");
            e
        })?;
        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let value = toml::to_string_pretty(self)?;
        std::fs::write(path, value)?;
        info!(path = ?path, "Settings saved");
        Ok(())
    }

    /// Effective interface language
    pub fn ui_language(&self) -> &'static str {
        detect_language(self.ui_language.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");

        let settings = ConfiguratorSettings::load_from(&path).expect("load");
        assert_eq!(settings, ConfiguratorSettings::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "ui_language = \"fr\"\n\n[timing]\nsync_debounce_ms = 50\n\n[export]\nexpand_preset_colors = true\n",
        )
        .expect("write");

        let settings = ConfiguratorSettings::load_from(&path).expect("load");
        assert_eq!(settings.ui_language(), "fr");
        assert_eq!(settings.timing.sync_debounce(), Duration::from_millis(50));
        assert_eq!(settings.timing.preview_debounce_ms, PREVIEW_DEBOUNCE_MS);
        assert!(settings.export.expand_preset_colors);
        assert_eq!(settings.http.timeout(), Duration::from_secs(HTTP_TIMEOUT_SECS));
        assert_eq!(settings.preview_base_href, "./");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        let mut settings = ConfiguratorSettings::default();
        settings.widget_asset_base = "https://cdn.example/widget".into();
        settings.logging.file = true;

        settings.save_to(&path).expect("save");
        assert_eq!(ConfiguratorSettings::load_from(&path).expect("load"), settings);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "timing = 3").expect("write");
        assert!(ConfiguratorSettings::load_from(&path).is_err());
    }
}
