//! Language prefix resolution.

use serde::Deserialize;

fn default_language() -> String {
    "en".to_string()
}

/// Language settings consumed by the router.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageConfig {
    /// Supported language codes.
    #[serde(default)]
    pub languages: Vec<String>,
    /// Language used when the path carries none.
    #[serde(default = "default_language")]
    pub language_default: String,
    /// Whether the language is carried as the first path segment.
    #[serde(default)]
    pub language_force_on_url: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            languages: Vec::new(),
            language_default: default_language(),
            language_force_on_url: false,
        }
    }
}

/// A path with its language prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath<'a> {
    /// The resolved language, the default one when the path has no prefix.
    pub language: &'a str,
    /// The path to match against the route table.
    pub path: &'a str,
}

/// Strips and emits language path prefixes.
#[derive(Debug, Clone, Default)]
pub struct LanguageResolver {
    config: LanguageConfig,
}

impl LanguageResolver {
    /// Creates a resolver.
    pub fn new(config: LanguageConfig) -> Self {
        Self { config }
    }

    /// Returns the settings.
    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }

    /// Returns true when `code` is a supported language.
    pub fn is_supported(&self, code: &str) -> bool {
        self.config.languages.iter().any(|l| l == code)
    }

    /// Resolves the language of `path` and strips its prefix.
    ///
    /// Only applies when forcing is enabled and the first segment is a
    /// supported code; otherwise the default language is returned together
    /// with the untouched path.
    ///
    /// ```
    /// use oxide_expose::{LanguageConfig, LanguageResolver};
    ///
    /// let resolver = LanguageResolver::new(LanguageConfig {
    ///     languages: vec!["en".into(), "it".into()],
    ///     language_default: "en".into(),
    ///     language_force_on_url: true,
    /// });
    /// let resolved = resolver.resolve("/it/posts");
    /// assert_eq!(resolved.language, "it");
    /// assert_eq!(resolved.path, "/posts");
    /// ```
    pub fn resolve<'a>(&'a self, path: &'a str) -> ResolvedPath<'a> {
        let fallback = ResolvedPath {
            language: &self.config.language_default,
            path,
        };
        if !self.config.language_force_on_url {
            return fallback;
        }

        let Some(rest) = path.strip_prefix('/') else {
            return fallback;
        };
        let (segment, remainder) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        match self.config.languages.iter().find(|l| *l == segment) {
            Some(language) => ResolvedPath {
                language,
                path: remainder,
            },
            None => fallback,
        }
    }

    /// Returns the path segment to emit for `language`, if any.
    ///
    /// Nothing is emitted unless forcing is enabled, the language is
    /// supported, and it differs from the default.
    pub fn prefix_for<'a>(&self, language: Option<&'a str>) -> Option<&'a str> {
        let language = language?;
        if !self.config.language_force_on_url || language == self.config.language_default {
            return None;
        }
        if !self.is_supported(language) {
            tracing::warn!(language, "not emitting unsupported language prefix");
            return None;
        }
        Some(language)
    }
}
