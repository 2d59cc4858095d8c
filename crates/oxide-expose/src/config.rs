//! Router configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::language::LanguageConfig;
use crate::reverse::StaticConfig;

/// Settings consumed by the router.
///
/// Keys are flat, matching the application configuration:
///
/// ```json
/// {
///     "languages": ["en", "it"],
///     "language_default": "en",
///     "language_force_on_url": true,
///     "static_version_urls": true,
///     "static_version": "1.0.0"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Language prefix settings.
    #[serde(flatten)]
    pub language: LanguageConfig,
    /// Static asset settings.
    #[serde(flatten)]
    pub statics: StaticConfig,
}

impl Config {
    /// Parses configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ExposeError::Config`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the file cannot be read, or a config error
    /// when it cannot be parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
