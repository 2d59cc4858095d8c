//! Error types for route registration, reverse lookup and dispatch.

use thiserror::Error;

/// Errors raised while building the route table or reversing a route.
///
/// Registration errors are meant to abort startup: a router is never built
/// from a table containing a broken route.
#[derive(Debug, Error)]
pub enum ExposeError {
    /// A placeholder names a converter outside the fixed set.
    #[error("unknown converter '{converter}' in template '{template}'")]
    UnknownConverter {
        /// The offending template.
        template: String,
        /// The converter id that was not recognized.
        converter: String,
    },

    /// Optional group delimiters do not pair up.
    #[error("unbalanced optional group in template '{template}' at offset {offset}")]
    UnbalancedGroup {
        /// The offending template.
        template: String,
        /// Byte offset of the unmatched delimiter.
        offset: usize,
    },

    /// An `any` placeholder is followed by more nodes.
    #[error("'any' placeholder '{param}' must be the last node of template '{template}'")]
    MisplacedAny {
        /// The offending template.
        template: String,
        /// Name of the `any` placeholder.
        param: String,
    },

    /// A placeholder is unterminated or its name is not an identifier.
    #[error("invalid placeholder '{placeholder}' in template '{template}'")]
    InvalidPlaceholder {
        /// The offending template.
        template: String,
        /// Raw placeholder text.
        placeholder: String,
    },

    /// Two placeholders share a name.
    #[error("duplicate parameter '{param}' in template '{template}'")]
    DuplicateParam {
        /// The offending template.
        template: String,
        /// The repeated name.
        param: String,
    },

    /// An optional group contains nothing.
    #[error("empty optional group in template '{0}'")]
    EmptyGroup(String),

    /// The generated matching pattern was rejected by the regex engine.
    #[error("invalid route pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A route with this name is already registered.
    #[error("route '{0}' is already registered")]
    DuplicateRoute(String),

    /// The name is reserved by the router.
    #[error("route name '{0}' is reserved")]
    ReservedName(String),

    /// No route with this name exists.
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// The mount prefix was already bound.
    #[error("router is already bound under '{0}'")]
    AlreadyBound(String),

    /// Configuration could not be deserialized.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for routing operations.
pub type Result<T> = std::result::Result<T, ExposeError>;

/// An HTTP failure carrying a status code and a body.
///
/// Handlers return it to abort a request; [`crate::Router::dispatch`] returns
/// it untouched, and synthesizes one when no route matches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {body}")]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl HttpError {
    /// Body used when no route matches the request.
    pub const NOT_FOUND_BODY: &'static str = "Resource not found\n";

    /// Creates a new HTTP error.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The failure raised when nothing in the route table matches.
    pub fn not_found() -> Self {
        Self::new(404, Self::NOT_FOUND_BODY)
    }
}

/// Aborts the current request with the given status and body.
///
/// ```
/// use oxide_expose::{abort, HttpError};
///
/// let err: HttpError = abort(404, "Not found, dude");
/// assert_eq!(err.status, 404);
/// ```
pub fn abort(status: u16, body: impl Into<String>) -> HttpError {
    HttpError::new(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_body() {
        let err = HttpError::not_found();
        assert_eq!(err.status, 404);
        assert_eq!(err.body, "Resource not found\n");
    }

    #[test]
    fn test_abort_display() {
        let err = abort(403, "nope");
        assert_eq!(err.to_string(), "HTTP 403: nope");
    }
}
