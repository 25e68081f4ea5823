//! # CLI Module
//!
//! Command-line tooling for route cache files written by
//! [`Router::save_routes_to_file`](crate::router::Router::save_routes_to_file).
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! Print every route and backward link stored in a cache:
//!
//! ```bash
//! pagerouter-cache inspect --cache var/routes.cache
//! ```
//!
//! ### `verify`
//!
//! Check the checksum and payload; exits non-zero on a corrupt cache:
//!
//! ```bash
//! pagerouter-cache verify --cache var/routes.cache
//! ```
//!
//! ### `resolve`
//!
//! Show where a request lands in the cached table. Wildcard routes are
//! reported as delegation points since nested routers are not cached:
//!
//! ```bash
//! pagerouter-cache resolve --cache var/routes.cache --method get --uri /blog/post1
//! pagerouter-cache resolve -c var/routes.cache -u /admin -p role=admin
//! ```
//!
//! `--cache` falls back to `PAGEROUTER_ROUTE_CACHE`.

mod commands;


pub use commands::{run, run_cli, Cli, Commands};
