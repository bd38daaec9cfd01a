//! i18n - Internationalization Module
//!
//! Locale trees are JSON documents embedded at build time, optionally
//! overridden by files on disk. Keys are dotted paths (`PREVIEW.TITLE`).

use std::path::Path;
use std::sync::OnceLock;

use locale_config::Locale;
use rust_embed::RustEmbed;
use serde_json::Value;
use tracing::{info, warn};

use crate::constants::FALLBACK_UI_LANGUAGE;
use crate::error::{Error, Result};

/// Embedded locale files
#[derive(RustEmbed)]
#[folder = "assets/i18n"]
struct LocaleAssets;

/// Supported interface languages
pub const UI_LANGUAGES: [&str; 2] = ["en", "fr"];

/// Global translator, set once at startup
static TRANSLATOR: OnceLock<Translator> = OnceLock::new();

/// Translation tree for one interface language
#[derive(Debug, Clone)]
pub struct Translator {
    language: String,
    tree: Value,
}

impl Translator {
    /// Load a language, falling back to English when it is unavailable.
    ///
    /// Never fails: if English is missing too, every key translates to itself.
    pub fn load(language: &str, override_dir: Option<&Path>) -> Self {
        match Self::try_load(language, override_dir) {
            Ok(translator) => translator,
            Err(e) if language != FALLBACK_UI_LANGUAGE => {
                warn!(language, error = %e, "Falling back to English translations");
                Self::load(FALLBACK_UI_LANGUAGE, override_dir)
            }
            Err(e) => {
                warn!(error = %e, "No translations available");
                Self {
                    language: language.to_string(),
                    tree: Value::Null,
                }
            }
        }
    }

    /// Load a language from the override directory, then from embedded assets
    pub fn try_load(language: &str, override_dir: Option<&Path>) -> Result<Self> {
        let file_name = format!("{language}.json");

        if let Some(path) = override_dir
            .map(|dir| dir.join(&file_name))
            .filter(|path| path.is_file())
        {
            info!(path = ?path, "Loading translation override");
            let raw = std::fs::read_to_string(&path)?;
            return Self::from_json(language, &raw);
        }

        let file = LocaleAssets::get(&file_name).ok_or_else(|| Error::Translation {
            language: language.to_string(),
        })?;
        let raw = String::from_utf8_lossy(&file.data);
        Self::from_json(language, &raw)
    }

    pub fn from_json(language: &str, raw: &str) -> Result<Self> {
        let tree: Value = serde_json::from_str(raw)?;
        if !tree.is_object() {
            return Err(Error::Translation {
                language: language.to_string(),
            });
        }
        Ok(Self {
            language: language.to_string(),
            tree,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Translate a dotted key; a missing key translates to itself
    pub fn t(&self, key: &str) -> String {
        key.split('.')
            .try_fold(&self.tree, |node, part| node.get(part))
            .and_then(Value::as_str)
            .map_or_else(|| key.to_string(), str::to_string)
    }
}

/// Pick the interface language: explicit preference, else the system locale
pub fn detect_language(preferred: Option<&str>) -> &'static str {
    let tag = match preferred.map(str::trim).filter(|p| !p.is_empty()) {
        Some(preferred) => preferred.to_string(),
        None => Locale::current().to_string(),
    };
    let primary = tag
        .split([',', '-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if primary == "fr" { "fr" } else { FALLBACK_UI_LANGUAGE }
}

/// Install the global translator; later calls are ignored
pub fn init(translator: Translator) {
    if TRANSLATOR.set(translator).is_err() {
        warn!("Translator already initialized");
    }
}

/// Translate with the global translator
pub fn t(key: &str) -> String {
    match TRANSLATOR.get() {
        Some(translator) => translator.t(key),
        None => key.to_string(),
    }
}
