//! Configurator Constants
//!
//! Centralized defaults for timing, URLs and validation.

/// Required suffix of every API base URL
pub const API_PATH_SUFFIX: &str = "/api/v2/";

/// Sentinel theme name for independently edited colours
pub const CUSTOM_THEME: &str = "custom";

/// Settle delay before a burst of edits is written to the URL
pub const SYNC_DEBOUNCE_MS: u64 = 300;

/// Settle delay before the preview frame is regenerated
pub const PREVIEW_DEBOUNCE_MS: u64 = 300;

/// Gap between clearing the preview target and setting the new one
pub const PREVIEW_RELOAD_DELAY_MS: u64 = 0;

/// Settle delay before option lists are refetched for a new API URL
pub const OPTIONS_DEBOUNCE_MS: u64 = 300;

/// HTTP timeout for option list fetches
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Cache-busting query key appended to preview URLs
pub const PREVIEW_TOKEN_KEY: &str = "_v";

/// Route fragment of the preview frame
pub const PREVIEW_ROUTE: &str = "#/preview";

/// Default page base for preview URLs
pub const DEFAULT_PREVIEW_BASE_HREF: &str = "./";

/// Where the embeddable widget bundle is published
pub const DEFAULT_WIDGET_ASSET_BASE: &str =
    "https://rando-widget.geotrek.fr/latest/dist/geotrek-rando-widget";

/// Custom element name of the embeddable widget
pub const WIDGET_TAG: &str = "grw-app";

/// Language used when translations for the requested one are missing
pub const FALLBACK_UI_LANGUAGE: &str = "en";

/// Application name used for settings and log directories
pub const APP_NAME: &str = "rando-configurator";

/// File stem of the published widget bundle
pub const WIDGET_BUNDLE: &str = "geotrek-rando-widget";
