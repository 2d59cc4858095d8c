//! Route table, matching and dispatch.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::config::Config;
use crate::error::{ExposeError, HttpError, Result};
use crate::language::LanguageResolver;
use crate::request::{Method, Request, RouteArgs};
use crate::response::Response;
use crate::reverse::{StaticConfig, UrlBuilder, STATIC_ROUTE};
use crate::template::CompiledTemplate;

/// A boxed async handler function.
pub type Handler = Arc<
    dyn Fn(Request) -> BoxFuture<'static, std::result::Result<Response, HttpError>> + Send + Sync,
>;

/// A route declaration, compiled when handed to [`RouterBuilder::expose`].
pub struct Expose {
    handler_name: String,
    name: Option<String>,
    path: Option<String>,
    methods: Vec<Method>,
    handler: Handler,
}

impl Expose {
    /// Declares a handler.
    ///
    /// Without [`Expose::path`] the handler is exposed at `/<handler_name>`;
    /// without [`Expose::name`] the route is named `<module>.<handler_name>`.
    pub fn new<F, Fut, R>(handler_name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<R, HttpError>> + Send + 'static,
        R: Into<Response>,
    {
        Self {
            handler_name: handler_name.into(),
            name: None,
            path: None,
            methods: Vec::new(),
            handler: Arc::new(move |req| {
                handler(req)
                    .map(|res| res.map(Into::<Response>::into))
                    .boxed()
            }),
        }
    }

    /// Sets the route template.
    #[must_use]
    pub fn path(mut self, template: impl Into<String>) -> Self {
        self.path = Some(template.into());
        self
    }

    /// Overrides the canonical route name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Restricts the accepted methods. Routes accept any method by default.
    #[must_use]
    pub fn methods(mut self, methods: &[Method]) -> Self {
        self.methods = methods.to_vec();
        self
    }
}

/// A compiled route.
pub struct Route {
    name: String,
    template: CompiledTemplate,
    methods: Vec<Method>,
    handler: Handler,
}

impl Route {
    /// Returns the canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the compiled template.
    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }

    /// Returns the accepted methods; empty means any.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns true when the route accepts `method`.
    pub fn accepts(&self, method: Method) -> bool {
        self.methods.is_empty() || self.methods.contains(&method)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("template", &self.template.source())
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// A successful match.
#[derive(Debug)]
pub struct RouteMatch<'r> {
    /// The matched route.
    pub route: &'r Route,
    /// Converted path arguments.
    pub args: RouteArgs,
    /// The resolved language.
    pub language: String,
}

/// Collects routes at startup.
///
/// Registration order is match precedence: register specific routes before
/// permissive ones (for example a `str` route before an `any` route).
#[derive(Debug)]
pub struct RouterBuilder {
    app_module: String,
    module: String,
    config: Config,
    routes: Vec<Route>,
    index: HashMap<String, usize>,
}

impl RouterBuilder {
    /// Creates a builder for the application declared in `app_module`.
    pub fn new(app_module: impl Into<String>) -> Self {
        let app_module = app_module.into();
        Self {
            module: app_module.clone(),
            app_module,
            config: Config::default(),
            routes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the declaring module used to name subsequent routes.
    #[must_use]
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Compiles and registers a route.
    ///
    /// # Errors
    ///
    /// Fails on malformed templates, duplicate names, and the reserved
    /// `static` name. Callers are expected to abort startup.
    pub fn expose(mut self, expose: Expose) -> Result<Self> {
        let name = expose
            .name
            .unwrap_or_else(|| format!("{}.{}", self.module, expose.handler_name));
        if name == STATIC_ROUTE {
            return Err(ExposeError::ReservedName(name));
        }
        if self.index.contains_key(&name) {
            return Err(ExposeError::DuplicateRoute(name));
        }

        let path = expose
            .path
            .unwrap_or_else(|| format!("/{}", expose.handler_name));
        let template = CompiledTemplate::compile(&path)?;
        debug!(route = %name, template = %path, pattern = template.pattern(), "exposed route");

        self.index.insert(name.clone(), self.routes.len());
        self.routes.push(Route {
            name,
            template,
            methods: expose.methods,
            handler: expose.handler,
        });
        Ok(self)
    }

    /// Freezes the route table.
    pub fn build(self) -> Router {
        Router {
            app_module: self.app_module,
            routes: self.routes,
            index: self.index,
            languages: LanguageResolver::new(self.config.language),
            statics: self.config.statics,
            prefix: OnceLock::new(),
        }
    }
}

/// An immutable route table.
///
/// Matching and URL building only read compiled data, so a router can be
/// shared across request tasks behind an `Arc` without locking.
pub struct Router {
    app_module: String,
    routes: Vec<Route>,
    index: HashMap<String, usize>,
    languages: LanguageResolver,
    statics: StaticConfig,
    prefix: OnceLock<String>,
}

impl Router {
    /// Creates a builder.
    pub fn builder(app_module: impl Into<String>) -> RouterBuilder {
        RouterBuilder::new(app_module)
    }

    /// Mounts the application under `prefix` for every generated URL.
    ///
    /// Empty prefixes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ExposeError::AlreadyBound`] when a prefix is already set.
    pub fn bind(&self, prefix: &str) -> Result<()> {
        let trimmed = prefix.trim_matches('/');
        if trimmed.is_empty() {
            return Ok(());
        }
        if self.prefix.set(format!("/{trimmed}")).is_err() {
            let bound = self.mount_prefix().unwrap_or_default();
            return Err(ExposeError::AlreadyBound(bound.to_string()));
        }
        debug!(prefix = trimmed, "bound mount prefix");
        Ok(())
    }

    /// Returns the bound mount prefix, with a leading `/`.
    pub fn mount_prefix(&self) -> Option<&str> {
        self.prefix.get().map(String::as_str)
    }

    /// Returns the language resolver.
    pub fn languages(&self) -> &LanguageResolver {
        &self.languages
    }

    /// Returns the static asset settings.
    pub fn static_config(&self) -> &StaticConfig {
        &self.statics
    }

    /// Iterates over routes in precedence order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Looks up a route by name.
    ///
    /// Falls back to `<app module>.<name>` for names that are not found
    /// verbatim; a leading `.` always refers to the application module.
    pub fn route(&self, name: &str) -> Option<&Route> {
        let position = match name.strip_prefix('.') {
            Some(short) => self.index.get(&format!("{}.{short}", self.app_module)),
            None => self
                .index
                .get(name)
                .or_else(|| self.index.get(&format!("{}.{name}", self.app_module))),
        }?;
        self.routes.get(*position)
    }

    /// Matches a path against the table, ignoring methods.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.find(path, None)
    }

    /// Matches a request against routes accepting its method.
    pub fn match_request(&self, request: &Request) -> Option<RouteMatch<'_>> {
        self.find(&request.path, Some(request.method))
    }

    fn find(&self, path: &str, method: Option<Method>) -> Option<RouteMatch<'_>> {
        let resolved = self.languages.resolve(path);

        let found = self
            .routes
            .iter()
            .filter(|route| method.map_or(true, |m| route.accepts(m)))
            .find_map(|route| {
                route
                    .template
                    .captures(resolved.path)
                    .map(|args| (route, args))
            });

        match found {
            Some((route, args)) => {
                debug!(path, route = %route.name, language = resolved.language, "matched route");
                Some(RouteMatch {
                    route,
                    args,
                    language: resolved.language.to_string(),
                })
            }
            None => {
                debug!(path, "no route matched");
                None
            }
        }
    }

    /// Matches and invokes the handler.
    ///
    /// The handler receives the request with its language, route name and
    /// arguments filled in.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::not_found`] when nothing matches, and any error
    /// the handler returns, unchanged.
    pub async fn dispatch(&self, mut request: Request) -> std::result::Result<Response, HttpError> {
        let Some(matched) = self.match_request(&request) else {
            return Err(HttpError::not_found());
        };

        request.language = Some(matched.language);
        request.route = Some(matched.route.name.clone());
        request.args = matched.args;

        (matched.route.handler)(request).await
    }

    /// Starts building a URL for the route `name`, or for `static`.
    pub fn url(&self, name: impl Into<String>) -> UrlBuilder<'_> {
        UrlBuilder::new(self, name)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("app_module", &self.app_module)
            .field("routes", &self.routes)
            .field("languages", self.languages.config())
            .field("statics", &self.statics)
            .field("prefix", &self.mount_prefix())
            .finish()
    }
}
