//! # Router Module
//!
//! Path matching and route resolution for pigeon.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Parsing route patterns with `{{name}}` placeholders at registration
//! - Matching incoming paths against registered routes in registration order
//! - Filtering by exact content type
//! - Extracting placeholder values into a [`ParameterSet`]
//!
//! ## Architecture
//!
//! 1. **Compilation**: `register` parses the pattern into literal and
//!    placeholder tokens and compiles an anchored regex in which every
//!    placeholder becomes `[^/]+`. Malformed patterns are rejected here.
//!
//! 2. **Matching**: `find_route` tests the path against every route in order
//!    and returns the first whose pattern matches and whose content type is
//!    equal to the requested one.
//!
//! 3. **Dispatch**: `dispatch` extracts the parameters of the found route and
//!    binds them to its handler.
//!
//! ## Example
//!
//! ```rust
//! use pigeon::router::Router;
//! use pigeon::server::{Request, Response};
//!
//! let router = Router::new();
//! router
//!     .register(
//!         "/users/{{id}}/posts/{{postId}}",
//!         |_req, params| {
//!             Response::text(
//!                 200,
//!                 format!("{}:{}", params.get("id").unwrap_or(""), params.get("postId").unwrap_or("")),
//!             )
//!         },
//!         "text/plain",
//!     )
//!     .unwrap();
//!
//! let request = Request::parse(b"GET /users/42/posts/7 HTTP/1.1\r\n\r\n").unwrap();
//! let response = router.dispatch(&request.path, "text/plain").unwrap().call(&request);
//! assert_eq!(response.body, b"42:7");
//! ```
//!
//! ## Performance
//!
//! Matching is O(n) in the number of routes. Reads never lock; parameter
//! storage stays on the stack for up to 8 placeholders.

mod core;
mod params;
mod pattern;

pub use self::core::{extract_parameters, Route, Router};
pub use params::{ParamVec, ParameterSet, MAX_INLINE_PARAMS};
pub use pattern::{PatternToken, RoutePattern};
