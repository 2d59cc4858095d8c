//! Reverse URL generation.

use serde::Deserialize;
use url::form_urlencoded;

use crate::converter::Value;
use crate::error::{ExposeError, Result};
use crate::request::Request;
use crate::router::Router;

/// Reserved route name for static assets.
pub const STATIC_ROUTE: &str = "static";

/// Static asset URL settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StaticConfig {
    /// Insert a `_<version>` folder into static URLs.
    #[serde(default)]
    pub static_version_urls: bool,
    /// The version used for the folder.
    #[serde(default)]
    pub static_version: String,
}

impl StaticConfig {
    /// Builds the unprefixed path of a static file.
    fn path(&self, file: &str) -> String {
        let file = file.trim_start_matches('/');
        if self.static_version_urls && !self.static_version.is_empty() {
            format!("/static/_{}/{file}", self.static_version)
        } else {
            format!("/static/{file}")
        }
    }
}

/// Builds a URL for a named route.
///
/// Created by [`Router::url`]. Positional arguments fill placeholders in
/// template order; see [`crate::CompiledTemplate::reverse`] for how missing
/// arguments truncate the path.
#[derive(Debug)]
#[must_use]
pub struct UrlBuilder<'r> {
    router: &'r Router,
    name: String,
    args: Vec<Value>,
    query: Vec<(String, String)>,
    language: Option<String>,
}

impl<'r> UrlBuilder<'r> {
    pub(crate) fn new(router: &'r Router, name: impl Into<String>) -> Self {
        Self {
            router,
            name: name.into(),
            args: Vec::new(),
            query: Vec::new(),
            language: None,
        }
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Appends positional arguments.
    pub fn args<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.args.extend(values.into_iter().map(Into::into));
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets the language of the generated URL.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Uses the language resolved for `request`, unless one was set.
    pub fn for_request(mut self, request: &Request) -> Self {
        if self.language.is_none() {
            self.language.clone_from(&request.language);
        }
        self
    }

    /// Builds the URL.
    ///
    /// # Errors
    ///
    /// Returns [`ExposeError::RouteNotFound`] for an unknown route name.
    pub fn build(self) -> Result<String> {
        let path = if self.name == STATIC_ROUTE {
            let file = self.args.first().map(ToString::to_string).unwrap_or_default();
            self.router.static_config().path(&file)
        } else {
            let route = self
                .router
                .route(&self.name)
                .ok_or_else(|| ExposeError::RouteNotFound(self.name.clone()))?;
            route.template().reverse(&self.args)
        };

        let mut url = String::new();
        if let Some(prefix) = self.router.mount_prefix() {
            url.push_str(prefix);
        }
        if let Some(language) = self
            .router
            .languages()
            .prefix_for(self.language.as_deref())
        {
            url.push('/');
            url.push_str(language);
        }
        url.push_str(&path);

        if !self.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            url.push('?');
            url.push_str(&query);
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::language::LanguageConfig;
    use crate::router::Expose;

    async fn noop(_req: Request) -> std::result::Result<&'static str, crate::HttpError> {
        Ok("")
    }

    fn router(statics: StaticConfig) -> Router {
        let config = Config {
            language: LanguageConfig {
                languages: vec!["en".into(), "it".into()],
                language_default: "en".into(),
                language_force_on_url: true,
            },
            statics,
        };
        Router::builder("app")
            .config(config)
            .expose(Expose::new("index", noop).path("/"))
            .unwrap()
            .expose(Expose::new("post", noop).path("/posts/<int:id>"))
            .unwrap()
            .build()
    }

    #[test]
    fn test_static_path() {
        let statics = StaticConfig::default();
        assert_eq!(statics.path("js/foo.js"), "/static/js/foo.js");
        assert_eq!(statics.path("/js/foo.js"), "/static/js/foo.js");

        let versioned = StaticConfig {
            static_version_urls: true,
            static_version: "1.0.0".into(),
        };
        assert_eq!(versioned.path("js/foo.js"), "/static/_1.0.0/js/foo.js");
    }

    #[test]
    fn test_unknown_route() {
        let router = router(StaticConfig::default());
        let err = router.url("missing").build().unwrap_err();
        assert!(matches!(err, ExposeError::RouteNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_query_is_escaped() {
        let router = router(StaticConfig::default());
        let url = router
            .url("post")
            .arg(3)
            .query("q", "a b&c")
            .build()
            .unwrap();
        assert_eq!(url, "/posts/3?q=a+b%26c");
    }

    #[test]
    fn test_for_request_language() {
        let router = router(StaticConfig::default());
        let mut request = Request::get("/");
        request.language = Some("it".into());

        let url = router.url("post").arg(1).for_request(&request).build().unwrap();
        assert_eq!(url, "/it/posts/1");

        let url = router
            .url("post")
            .arg(1)
            .language("en")
            .for_request(&request)
            .build()
            .unwrap();
        assert_eq!(url, "/posts/1");
    }

    #[test]
    fn test_root_with_prefix() {
        let router = router(StaticConfig::default());
        router.bind("mnt").unwrap();
        assert_eq!(router.url("index").build().unwrap(), "/mnt/");
        assert_eq!(router.url("index").language("it").build().unwrap(), "/mnt/it/");
    }
}
