//! # pigeon
//!
//! **pigeon** is a small HTTP request router. Routes are `(pattern, handler,
//! content type)` triples matched in registration order; the first route whose
//! pattern matches the whole path and whose content type equals the requested
//! one handles the request.
//!
//! ## Patterns
//!
//! Patterns are literal text with named placeholders written `{{name}}`:
//!
//! ```text
//! /users/{{id}}/posts/{{postId}}
//! /files/{{name}}.txt
//! ```
//!
//! A placeholder matches one or more characters other than `/`. Malformed
//! patterns (unclosed or adjacent placeholders, duplicate names) are rejected
//! when the route is registered.
//!
//! ## Architecture
//!
//! - **[`router`]** - pattern parsing, ordered matching and parameter extraction
//! - **[`dispatcher`]** - handler type and handlers bound to their parameters
//! - **[`server`]** - request parsing, responses and a blocking HTTP/1.1 server
//! - **[`template`]** - an explicit template engine turning templates into responses
//! - **[`config`]** - server configuration from YAML and `PIGEON_*` variables
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`demo`]** - the route table served by the `pigeon` binary
//! - **[`cli`]** - the `pigeon` command line
//!
//! ## Quick Start
//!
//! ```rust
//! use pigeon::{Request, Response, Router};
//!
//! let router = Router::new();
//! router
//!     .register(
//!         "/hello/{{name}}",
//!         |_req, params| Response::text(200, format!("Hello, {}!", params.get("name").unwrap_or("?"))),
//!         "text/plain",
//!     )
//!     .unwrap();
//!
//! let request = Request::parse(b"GET /hello/world HTTP/1.1\r\n\r\n").unwrap();
//! let response = router
//!     .dispatch(&request.path, "text/plain")
//!     .unwrap()
//!     .call(&request);
//! assert_eq!(response.body, b"Hello, world!");
//! ```
//!
//! ## Concurrency
//!
//! [`Router`] is `Send + Sync`. Matching never blocks; registration publishes
//! a new route list that readers pick up on their next lookup.

pub mod cli;
pub mod config;
pub mod demo;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod router;
pub mod server;
pub mod template;

pub use config::ServerConfig;
pub use dispatcher::{BoundHandler, HandlerFn};
pub use error::{RequestParseError, RouterError, TemplateError};
pub use router::{ParameterSet, Route, Router};
pub use server::{Request, Response};
pub use template::TemplateEngine;
