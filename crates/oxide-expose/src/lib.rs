//! # oxide-expose
//!
//! Typed URL routing with reverse URL generation.
//!
//! This crate provides:
//! - Route templates with typed placeholders and optional groups
//! - Registration-order matching with typed argument conversion
//! - Language prefixes on incoming and generated URLs
//! - Reverse URL building, including static assets and a mount prefix
//!
//! ## Quick Start
//!
//! ```
//! use oxide_expose::{abort, Expose, HttpError, Request, Router};
//!
//! async fn post(req: Request) -> Result<String, HttpError> {
//!     let id = req.args.int("id").ok_or_else(|| abort(400, "bad id"))?;
//!     Ok(format!("Post {id}"))
//! }
//!
//! # fn main() -> oxide_expose::Result<()> {
//! let router = Router::builder("blog")
//!     .expose(Expose::new("post", post).path("/posts/<int:id>(/<str:slug>)?"))?
//!     .build();
//!
//! let matched = router.match_path("/posts/42/hello").unwrap();
//! assert_eq!(matched.route.name(), "blog.post");
//! assert_eq!(matched.args.int("id"), Some(42));
//!
//! assert_eq!(router.url("post").arg(42).build()?, "/posts/42");
//! # Ok(())
//! # }
//! ```
//!
//! ## Templates
//!
//! Placeholders are written `<converter:name>`; `<name>` is a `str`
//! placeholder. The converters are:
//!
//! | id | matches | value |
//! |---|---|---|
//! | `int` | digits | `i64` |
//! | `float` | digits `.` digits | `f64` |
//! | `date` | `YYYY-MM-DD` | `chrono::NaiveDate` |
//! | `alpha` | letters | `String` |
//! | `str` | anything but `/` | `String` |
//! | `any` | anything, slashes included | `String` |
//!
//! A span wrapped in `(...)?` is optional and may nest. `any` must be the
//! last node of a template.
//!
//! ## Precedence
//!
//! Routes are tried in registration order and the first structural match
//! whose arguments all convert wins. A capture that fails to convert (an
//! invalid date, an overflowing integer) makes that route not match; it is
//! never an error.
//!
//! ## Dispatch
//!
//! ```
//! use oxide_expose::{abort, Expose, HttpError, Request, Router};
//!
//! async fn gone(_req: Request) -> Result<&'static str, HttpError> {
//!     Err(abort(410, "Gone"))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> oxide_expose::Result<()> {
//! let router = Router::builder("app").expose(Expose::new("gone", gone))?.build();
//!
//! let err = router.dispatch(Request::get("/gone")).await.unwrap_err();
//! assert_eq!((err.status, err.body.as_str()), (410, "Gone"));
//!
//! let err = router.dispatch(Request::get("/missing")).await.unwrap_err();
//! assert_eq!(err, HttpError::not_found());
//! # Ok(())
//! # }
//! ```

mod config;
mod converter;
mod error;
mod language;
mod request;
mod response;
mod reverse;
mod router;
mod template;

pub use config::Config;
pub use converter::{Converter, Value};
pub use error::{abort, ExposeError, HttpError, Result};
pub use language::{LanguageConfig, LanguageResolver, ResolvedPath};
pub use request::{Method, Request, RouteArgs};
pub use response::Response;
pub use reverse::{StaticConfig, UrlBuilder, STATIC_ROUTE};
pub use router::{Expose, Handler, Route, RouteMatch, Router, RouterBuilder};
pub use template::{CompiledTemplate, ParamSpec, TemplateNode};
