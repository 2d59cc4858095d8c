#![allow(dead_code)]

use oxide_expose::{
    abort, Config, Expose, HttpError, LanguageConfig, Request, Router, StaticConfig,
};

pub const MODULE: &str = "test_expose";

async fn test_router(_req: Request) -> Result<&'static str, HttpError> {
    Ok("Test Router")
}

async fn not_found_dude(_req: Request) -> Result<&'static str, HttpError> {
    Err(abort(404, "Not found, dude"))
}

async fn language(req: Request) -> Result<String, HttpError> {
    Ok(req.language.unwrap_or_default())
}

pub fn config(statics: StaticConfig) -> Config {
    Config {
        language: LanguageConfig {
            languages: vec!["en".to_string(), "it".to_string()],
            language_default: "en".to_string(),
            language_force_on_url: true,
        },
        statics,
    }
}

pub fn versioned(version: &str) -> StaticConfig {
    StaticConfig {
        static_version_urls: true,
        static_version: version.to_string(),
    }
}

/// The application exercised by the test suite.
pub fn app_with(statics: StaticConfig) -> Router {
    let routes = [
        Expose::new("test_route", test_router),
        Expose::new("test_404", not_found_dude),
        Expose::new("test_language", language),
        Expose::new("test_route2", test_router).path("/test2/<int:a>/<str:b>"),
        Expose::new("test_route3", test_router).path("/test3/<int:a>/foo(/<str:b>)?(.<str:c>)?"),
        Expose::new("test_route_int", test_router).path("/test_int/<int:a>"),
        Expose::new("test_route_float", test_router).path("/test_float/<float:a>"),
        Expose::new("test_route_date", test_router).path("/test_date/<date:a>"),
        Expose::new("test_route_alpha", test_router).path("/test_alpha/<alpha:a>"),
        Expose::new("test_route_str", test_router).path("/test_str/<str:a>"),
        Expose::new("test_route_any", test_router).path("/test_any/<any:a>"),
        Expose::new("test_route_complex", test_router).path(
            "/test_complex/<int:a>/<float:b>/<date:c>/<alpha:d>/<str:e>/<any:f>",
        ),
    ];

    routes
        .into_iter()
        .try_fold(Router::builder(MODULE).config(config(statics)), |builder, route| {
            builder.expose(route)
        })
        .unwrap_or_else(|e| panic!("Failed to build test app: {e}"))
        .build()
}

pub fn app() -> Router {
    app_with(StaticConfig::default())
}

/// Returns the name of the route matching `path`, if any.
pub fn matched_name(router: &Router, path: &str) -> Option<String> {
    router
        .match_path(path)
        .map(|matched| matched.route.name().to_string())
}
