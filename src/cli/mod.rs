//! # CLI Module
//!
//! Command-line interface for the `pigeon` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! ```bash
//! pigeon serve --config config.yaml --addr 0.0.0.0:8080 --templates ./templates
//! ```
//!
//! Loads configuration (file, then `PIGEON_*` environment, then flags),
//! registers the demo routes and serves them until the process is stopped.
//!
//! ### `routes`
//!
//! Prints every demo route as `pattern<TAB>content-type`, in match order.
//!
//! ### `match`
//!
//! ```bash
//! pigeon match /users/42/posts/7 --content-type application/json
//! ```
//!
//! Resolves a path and prints the matched pattern and captured parameters.

mod commands;

pub use commands::{demo_router, run, run_cli, Cli, Commands};
