//! Router core module - hot path for request routing.
//!
//! Routes are kept in registration order inside an `ArcSwap` snapshot. Readers
//! load the current snapshot without locking; `register` publishes a new
//! snapshot with copy-on-write, so a concurrent reader sees either the old or
//! the new list, never a partial one.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::params::ParameterSet;
use super::pattern::RoutePattern;
use crate::dispatcher::{BoundHandler, HandlerFn};
use crate::error::RouterError;
use crate::server::{Request, Response};

/// A registered `(pattern, handler, content type)` triple
///
/// Immutable once registered.
pub struct Route {
    pattern: RoutePattern,
    content_type: String,
    handler: HandlerFn,
}

impl Route {
    /// Build a route, parsing the pattern eagerly
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MalformedPattern`] if the pattern does not parse.
    pub fn new<F>(pattern: &str, handler: F, content_type: &str) -> Result<Self, RouterError>
    where
        F: Fn(&Request, &ParameterSet) -> Response + Send + Sync + 'static,
    {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            content_type: content_type.to_string(),
            handler: Arc::new(handler),
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// The content type this route responds with
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerFn {
        &self.handler
    }

    /// Whether `path` matches this route's pattern in full
    #[inline]
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.pattern.matches(path)
    }

    /// Placeholder values captured from `path`
    #[must_use]
    pub fn extract_parameters(&self, path: &str) -> ParameterSet {
        self.pattern.extract(path)
    }

    /// Invoke the handler directly
    pub fn call(&self, request: &Request, params: &ParameterSet) -> Response {
        (self.handler)(request, params)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Ordered-match router
///
/// The first registered route whose pattern matches the path and whose content
/// type equals the requested one wins. Specificity plays no part.
///
/// # Example
///
/// ```rust
/// use pigeon::router::Router;
/// use pigeon::server::Response;
///
/// let router = Router::new();
/// router
///     .register(
///         "/users/{{id}}",
///         |_req, params| Response::text(200, params.get("id").unwrap_or_default()),
///         "text/plain",
///     )
///     .unwrap();
///
/// let bound = router.dispatch("/users/42", "text/plain").unwrap();
/// assert_eq!(bound.params().get("id"), Some("42"));
/// ```
pub struct Router {
    routes: ArcSwap<Vec<Arc<Route>>>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            routes: ArcSwap::from_pointee(Vec::new()),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.load())
            .finish()
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route to the end of the match order
    ///
    /// Safe to call while other threads are matching: the route list is
    /// replaced as a whole.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::MalformedPattern`] if the pattern does not parse.
    /// The route table is left unchanged in that case.
    pub fn register<F>(&self, pattern: &str, handler: F, content_type: &str) -> Result<(), RouterError>
    where
        F: Fn(&Request, &ParameterSet) -> Response + Send + Sync + 'static,
    {
        let route = match Route::new(pattern, handler, content_type) {
            Ok(route) => Arc::new(route),
            Err(err) => {
                warn!(pattern = %pattern, error = %err, "Rejected route pattern");
                return Err(err);
            }
        };

        self.routes.rcu(|current| {
            let mut next: Vec<Arc<Route>> = Vec::with_capacity(current.len() + 1);
            next.extend(current.iter().map(Arc::clone));
            next.push(Arc::clone(&route));
            next
        });

        debug!(
            pattern = %pattern,
            content_type = %content_type,
            routes_count = self.route_count(),
            "Route registered"
        );
        Ok(())
    }

    /// Find the first route matching both path and content type
    ///
    /// # Errors
    ///
    /// * [`RouterError::NoMatchingRoute`] - no pattern matches the path
    /// * [`RouterError::ContentTypeMismatch`] - a pattern matches, but none with
    ///   the requested content type
    pub fn find_route(&self, path: &str, content_type: &str) -> Result<Arc<Route>, RouterError> {
        debug!(path = %path, content_type = %content_type, "Route match attempt");

        let match_start = Instant::now();
        let routes = self.routes.load();
        let mut path_matched = false;

        for route in routes.iter() {
            if !route.matches(path) {
                continue;
            }
            path_matched = true;
            if route.content_type == content_type {
                let match_duration = match_start.elapsed();
                if match_duration > Duration::from_millis(1) {
                    warn!(
                        path = %path,
                        route_pattern = %route.pattern.as_str(),
                        content_type = %content_type,
                        duration_us = match_duration.as_micros(),
                        "Slow route matching detected"
                    );
                } else {
                    info!(
                        path = %path,
                        route_pattern = %route.pattern.as_str(),
                        content_type = %content_type,
                        duration_us = match_duration.as_micros(),
                        "Route matched"
                    );
                }
                return Ok(Arc::clone(route));
            }
        }

        warn!(
            path = %path,
            content_type = %content_type,
            path_matched,
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );

        if path_matched {
            Err(RouterError::ContentTypeMismatch {
                path: path.to_string(),
                content_type: content_type.to_string(),
            })
        } else {
            Err(RouterError::NoMatchingRoute {
                path: path.to_string(),
            })
        }
    }

    /// Resolve a route and bind its parameters
    ///
    /// Parameters are extracted once, after the route has been found; the
    /// returned [`BoundHandler`] can be invoked with the request.
    ///
    /// # Errors
    ///
    /// Propagates the not-found errors of [`find_route`](Self::find_route).
    pub fn dispatch(&self, path: &str, content_type: &str) -> Result<BoundHandler, RouterError> {
        let route = self.find_route(path, content_type)?;
        let params = route.extract_parameters(path);
        Ok(BoundHandler::new(route, params))
    }

    /// Current route snapshot in match order
    #[must_use]
    pub fn routes(&self) -> Arc<Vec<Arc<Route>>> {
        self.routes.load_full()
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.load().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.load().is_empty()
    }

    /// Log every registered route in match order
    pub fn dump_routes(&self) {
        let routes = self.routes.load();
        info!(routes_count = routes.len(), "Routing table");
        for (position, route) in routes.iter().enumerate() {
            info!(
                position,
                pattern = %route.pattern.as_str(),
                content_type = %route.content_type,
                "Route"
            );
        }
    }
}

/// Parse `pattern` and extract its placeholder values from `path`
///
/// # Errors
///
/// Returns [`RouterError::MalformedPattern`] if the pattern does not parse.
pub fn extract_parameters(pattern: &str, path: &str) -> Result<ParameterSet, RouterError> {
    Ok(RoutePattern::parse(pattern)?.extract(path))
}
