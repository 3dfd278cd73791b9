//! # Dispatcher Module
//!
//! Handler types for pigeon.
//!
//! ## Overview
//!
//! A handler is any `Fn(&Request, &ParameterSet) -> Response` that is
//! `Send + Sync`. [`Router::dispatch`](crate::router::Router::dispatch) returns
//! a [`BoundHandler`]: the matched route plus the parameters captured from the
//! path, ready to be called with the request.
//!
//! ## Request Flow
//!
//! 1. Router finds the first route matching path and content type
//! 2. Parameters are extracted from the path once
//! 3. The bound handler is called with the request
//! 4. The handler's response is returned to the server
//!
//! Handlers run on the connection thread. There is no middleware chain.

mod core;

pub use self::core::{BoundHandler, HandlerFn};
