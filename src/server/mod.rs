//! # Server Module
//!
//! HTTP glue around the router.
//!
//! - [`Request`] - parsed request, built by the transport or from raw bytes (`Request::parse`)
//! - [`Response`] - status, headers and body, handed to the transport with `into_transport`
//! - [`AppService`] - dispatch and map routing errors to 400/404/413/500
//! - [`HttpServer`] - `tiny_http` listener drained by a fixed pool of worker threads
//!
//! The transport reads complete request heads and bodies (including chunked
//! bodies and keep-alive connections); workers only see whole requests.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query_params, Request, MAX_HEADERS};
pub use response::{HeaderVec, Response, MAX_INLINE_HEADERS};
pub use service::AppService;
