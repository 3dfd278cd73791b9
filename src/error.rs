//! Error types for routing, request parsing and template rendering.
//!
//! Library errors are plain enums with hand-written `Display` impls. Binary and
//! configuration code wraps them in `anyhow::Error` at the boundary.

use std::fmt;

/// Routing error
///
/// Returned by [`Router::register`](crate::router::Router::register),
/// [`Router::find_route`](crate::router::Router::find_route) and
/// [`Router::dispatch`](crate::router::Router::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// No registered pattern matches the path
    NoMatchingRoute {
        /// The requested path
        path: String,
    },
    /// At least one pattern matches the path, but none is registered for the
    /// requested content type
    ContentTypeMismatch {
        /// The requested path
        path: String,
        /// The requested content type
        content_type: String,
    },
    /// The pattern has unbalanced `{{`/`}}` delimiters or invalid placeholders
    MalformedPattern {
        /// The offending pattern
        pattern: String,
        /// What is wrong with it
        reason: String,
    },
}

impl RouterError {
    /// Both "no route" variants map to a 404 at the HTTP layer.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RouterError::NoMatchingRoute { .. } | RouterError::ContentTypeMismatch { .. }
        )
    }

    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        RouterError::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::NoMatchingRoute { path } => {
                write!(f, "no route matches path '{}'", path)
            }
            RouterError::ContentTypeMismatch { path, content_type } => {
                write!(
                    f,
                    "no route for path '{}' serves content type '{}'",
                    path, content_type
                )
            }
            RouterError::MalformedPattern { pattern, reason } => {
                write!(f, "malformed route pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for RouterError {}

/// Error produced when a request cannot be turned into a
/// [`Request`](crate::server::Request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestParseError {
    /// No bytes were received
    Empty,
    /// The request head ends before the blank line
    Incomplete,
    /// The request head is not valid HTTP/1.x
    Malformed {
        /// What the head parser rejected
        reason: String,
    },
    /// The method token is not a valid HTTP method
    InvalidMethod {
        /// The method token as received
        method: String,
    },
    /// A header value is not valid UTF-8
    InvalidHeaderValue {
        /// The header name
        name: String,
    },
    /// The request path contains an invalid percent-encoding
    InvalidPathEncoding {
        /// The raw path
        path: String,
    },
    /// The body is larger than the configured limit
    BodyTooLarge {
        /// The limit in bytes
        limit: usize,
    },
}

impl RequestParseError {
    /// HTTP status the server answers with for this error
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RequestParseError::BodyTooLarge { .. } => 413,
            _ => 400,
        }
    }
}

impl fmt::Display for RequestParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestParseError::Empty => write!(f, "empty request"),
            RequestParseError::Incomplete => write!(f, "incomplete request head"),
            RequestParseError::Malformed { reason } => {
                write!(f, "malformed request head: {}", reason)
            }
            RequestParseError::InvalidMethod { method } => {
                write!(f, "invalid HTTP method '{}'", method)
            }
            RequestParseError::InvalidHeaderValue { name } => {
                write!(f, "header '{}' is not valid UTF-8", name)
            }
            RequestParseError::InvalidPathEncoding { path } => {
                write!(f, "invalid percent-encoding in path '{}'", path)
            }
            RequestParseError::BodyTooLarge { limit } => {
                write!(f, "request body exceeds {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for RequestParseError {}

/// Template lookup or rendering failure
#[derive(Debug)]
pub enum TemplateError {
    /// The template could not be loaded or rendered
    Render {
        /// Template name
        name: String,
        /// Underlying minijinja error
        source: minijinja::Error,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Render { name, source } => {
                write!(f, "failed to render template '{}': {}", name, source)
            }
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::Render { source, .. } => Some(source),
        }
    }
}
