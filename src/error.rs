//! Error types for the configurator
//!
//! Centralized error handling using snafu for ergonomic error definitions.
//! The codec never produces these: malformed query values fall back to defaults.

use snafu::Snafu;

/// Main error type for the application
#[derive(Debug, Snafu)]
pub enum Error {
    /// Invalid input or configuration
    #[snafu(display("Invalid: {message}"))]
    Invalid { message: String },

    /// API base URL failed the required/pattern check
    #[snafu(display("Invalid API URL '{url}': must end with /api/v2/"))]
    InvalidApiUrl { url: String },

    /// A field edit carried a value of the wrong kind
    #[snafu(display("Field '{field}' expects a {expected} value"))]
    FieldType {
        field: &'static str,
        expected: &'static str,
    },

    /// Unknown configuration field name
    #[snafu(display("Unknown field: {name}"))]
    UnknownField { name: String },

    /// Translation file could not be loaded
    #[snafu(display("Translations unavailable for language '{language}'"))]
    Translation { language: String },

    /// IO error (file operations, etc.)
    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    /// JSON serialization/deserialization error
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    /// TOML deserialization error
    #[snafu(display("TOML parse error: {source}"))]
    TomlDe { source: toml::de::Error },

    /// TOML serialization error
    #[snafu(display("TOML serialize error: {source}"))]
    TomlSe { source: toml::ser::Error },

    /// HTTP transport error from the option provider
    #[snafu(display("HTTP error: {source}"))]
    Http { source: reqwest::Error },
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json { source }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Error::TomlDe { source }
    }
}

impl From<toml::ser::Error> for Error {
    fn from(source: toml::ser::Error) -> Self {
        Error::TomlSe { source }
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Error::Http { source }
    }
}

/// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;
