//! Dispatcher core module - handler types and the bound handler returned by
//! [`Router::dispatch`](crate::router::Router::dispatch).

use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::router::{ParameterSet, Route};
use crate::server::{Request, Response};

/// A route handler: receives the request and the captured parameters.
pub type HandlerFn = Arc<dyn Fn(&Request, &ParameterSet) -> Response + Send + Sync>;

/// A resolved route with its parameters already extracted
///
/// Parameters are computed once at dispatch time; calling the handler any
/// number of times reuses them.
#[derive(Clone)]
pub struct BoundHandler {
    route: Arc<Route>,
    params: ParameterSet,
}

impl BoundHandler {
    #[must_use]
    pub fn new(route: Arc<Route>, params: ParameterSet) -> Self {
        Self { route, params }
    }

    /// Invoke the route's handler with `(request, parameters)`
    pub fn call(&self, request: &Request) -> Response {
        let start = Instant::now();
        let response = self.route.call(request, &self.params);
        debug!(
            method = %request.method,
            path = %request.path,
            route_pattern = %self.route.pattern().as_str(),
            status = response.status,
            latency_us = start.elapsed().as_micros(),
            "Handler completed"
        );
        response
    }

    #[must_use]
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    #[must_use]
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }
}

impl fmt::Debug for BoundHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundHandler")
            .field("route", &self.route)
            .field("params", &self.params)
            .finish()
    }
}
