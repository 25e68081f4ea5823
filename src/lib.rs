//! # pagerouter
//!
//! **pagerouter** is a segment-trie request router for page-serving
//! applications. It maps a method and URI to the page that renders it, maps a
//! page plus parameters back to a URI, and saves a built route table to a
//! checksum-protected cache so startup can skip registration.
//!
//! ## Architecture
//!
//! - **[`router`]** - route table, forward/backward resolution, route cache
//! - **[`handler`]** - handler identities, the handler registry and the page contract
//! - **[`app`]** - front object serving one request into a [`app::Response`]
//! - **[`config`]** - YAML/TOML/environment configuration
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`hot_reload`]** - swap in a new route table when the cache file changes
//! - **[`cli`]** - `pagerouter-cache` inspection tooling
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App
//!     participant Router as Router (top level)
//!     participant Registry as HandlerRegistry
//!     participant Nested as Router (nested)
//!
//!     App->>Router: forward(GET, base_uri, "/blog/post1", route_params)
//!     Router->>Router: walk get → blog, stop at wildcard
//!     Router->>Registry: build router for routers/blog.rs/BlogRouter
//!     Registry-->>Nested: factory(settings, registry)
//!     Router->>Nested: forward(GET, "/blog", "/blog/post1", params)
//!     Nested->>Nested: walk get → post1, leaf matched
//!     Nested->>Registry: build page for pages/blog.rs/Post
//!     Nested-->>App: Resolution { Matched, params, page }
//!     App->>App: render → Response { 200, body }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use http::{Method, StatusCode};
//! use pagerouter::config::RouterSettings;
//! use pagerouter::handler::{HandlerRegistry, Renderable};
//! use pagerouter::router::{Params, Router};
//!
//! struct Page(&'static str);
//!
//! impl Renderable for Page {
//!     fn render(&self) -> anyhow::Result<String> {
//!         Ok(self.0.to_string())
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_page("pages/multiple_pages.rs", "PageMain", |_| Box::new(Page("main")));
//! registry.register_page("pages/multiple_pages.rs", "Page2", |_| Box::new(Page("two")));
//!
//! let mut router = Router::new(RouterSettings::default(), Arc::new(registry));
//! router.add_route("GET", "/", "pages/multiple_pages.rs", "PageMain", Params::new(), Params::new())?;
//! router.add_route("GET", "/page2", "pages/multiple_pages.rs", "Page2", Params::new(), Params::new())?;
//!
//! let resolution = router.forward(&Method::GET, "", "/page2", Params::new())?;
//! assert_eq!(resolution.status(), StatusCode::OK);
//! assert_eq!(resolution.render()?, "two");
//!
//! let missing = router.forward(&Method::GET, "", "/missing", Params::new())?;
//! assert_eq!(missing.status(), StatusCode::NOT_FOUND);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod hot_reload;
pub mod logging;
pub mod router;

pub use app::{App, Response};
pub use error::RouterError;
pub use handler::{HandlerId, HandlerRegistry, Renderable};
pub use router::{Params, Resolution, Router};
