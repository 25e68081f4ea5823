//! # Router Module
//!
//! Path routing for page-serving applications: map a method and URI to the
//! page that renders it, and map a page plus parameters back to a URI.
//!
//! ## Overview
//!
//! - [`tree`]: segment trie of registered routes plus the backward index
//! - [`matcher`]: the parameter predicates both directions rely on
//! - [`cache`]: checksum-protected save/load of a built table
//! - [`Router`]: forward and backward resolution, nested-router delegation
//!
//! ## Forward resolution
//!
//! A request is lower-cased into `method/segment/segment`, URL-decoded, and
//! walked through literal children. The walk stops at the first missing
//! segment. A wildcard route at the stopping node takes priority and hands the
//! rest of the URI to a nested router; otherwise a leaf route matches only when
//! every segment was consumed. Routes carry two parameter maps:
//!
//! - `params_match`: values the request parameters must already hold
//! - `params_set`: values merged into the request parameters on match
//!
//! ## Backward resolution
//!
//! Links are generated from registrations rather than by reversing patterns.
//! Every route is remembered under its handler identity in registration order,
//! and the last registration whose `params_set` overlaps the requested
//! parameters wins. Register default variants first.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::Method;
//! use pagerouter::config::RouterSettings;
//! use pagerouter::handler::{HandlerId, HandlerRegistry, RouteNotFound};
//! use pagerouter::router::{params, Params, Router};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_page("pages.rs", "Post", |p| Box::new(RouteNotFound::new(p)));
//! let mut router = Router::new(RouterSettings::default(), Arc::new(registry));
//! router.add_route("GET", "/en/post", "pages.rs", "Post", Params::new(), params(&[("lang", "en")])).unwrap();
//! router.add_route("GET", "/fr/post", "pages.rs", "Post", Params::new(), params(&[("lang", "fr")])).unwrap();
//!
//! let fr = router
//!     .backward(&Method::GET, "", "/en/post", Params::new(), &params(&[("lang", "fr")]))
//!     .unwrap();
//! assert_eq!(fr, "/fr/post");
//!
//! let link = router
//!     .link_to("", &HandlerId::new("pages.rs", "Post"), &params(&[("lang", "en")]))
//!     .unwrap();
//! assert_eq!(link.as_deref(), Some("/en/post"));
//! ```

pub mod cache;
mod core;
pub mod matcher;
pub mod tree;
#[cfg(test)]
mod tests;

pub use core::{Outcome, Probe, Resolution, Router};
pub use matcher::{matches_any, matches_required, merge_params, params, Params};
pub use tree::{BackwardEntry, RouteEntry, RouteNode, RouteTable};
