use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::request::Request;
use super::response::Response;
use crate::config::ServerConfig;
use crate::error::RequestParseError;
use crate::router::Router;

/// Connects raw request bytes to the router
///
/// Parses the request, picks the content type to route on, dispatches and
/// maps routing failures to HTTP responses:
/// - parse error: 400 (413 for an oversized body)
/// - no route / content type mismatch: 404
/// - handler panic: 500
#[derive(Clone)]
pub struct AppService {
    router: Arc<Router>,
    config: Arc<ServerConfig>,
}

impl AppService {
    #[must_use]
    pub fn new(router: Arc<Router>, config: ServerConfig) -> Self {
        Self {
            router,
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Route an already parsed request
    pub fn handle_request(&self, request: &Request) -> Response {
        let content_type = request.accepted_content_type(&self.config.default_content_type);

        let bound = match self.router.dispatch(&request.path, content_type) {
            Ok(bound) => bound,
            Err(err) if err.is_not_found() => {
                debug!(path = %request.path, content_type = %content_type, error = %err, "Responding 404");
                return Response::not_found();
            }
            Err(err) => {
                error!(path = %request.path, error = %err, "Dispatch failed");
                return Response::internal_error("Internal Server Error");
            }
        };

        match catch_unwind(AssertUnwindSafe(|| bound.call(request))) {
            Ok(response) => response,
            Err(panic) => {
                error!(
                    path = %request.path,
                    route_pattern = %bound.route().pattern().as_str(),
                    panic = ?panic,
                    "Handler panicked"
                );
                Response::internal_error("Internal Server Error")
            }
        }
    }

    /// Route a parsed request and log the outcome
    pub fn respond(&self, request: &Request) -> Response {
        let start = Instant::now();
        let response = self.handle_request(request);
        info!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            latency_us = start.elapsed().as_micros(),
            "Request handled"
        );
        response
    }

    /// Answer a request that could not be parsed or read
    pub fn reject(&self, err: &RequestParseError) -> Response {
        warn!(error = %err, status = err.status(), "Rejected request");
        Response::text(err.status(), err.to_string())
    }

    /// Parse a complete raw request and route it
    pub fn handle(&self, raw: &[u8]) -> Response {
        match Request::parse(raw) {
            Ok(request) => self.respond(&request),
            Err(err) => self.reject(&err),
        }
    }
}
