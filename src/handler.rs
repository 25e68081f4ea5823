//! # Handler Module
//!
//! Handlers are what routes point at. A route names a handler by its
//! [`HandlerId`] (module path + logical name) and the registry turns that
//! identity into something runnable. There are exactly two kinds:
//!
//! - **Leaf** handlers build a [`Renderable`] page from the resolved parameters.
//! - **Router** handlers build a nested [`Router`] that takes over the rest of
//!   the path behind a wildcard route.
//!
//! ## Registration
//!
//! The registry is filled once at startup and then shared read-only through an
//! `Arc`:
//!
//! ```rust
//! use pagerouter::handler::{HandlerId, HandlerRegistry, Renderable};
//! use pagerouter::router::Params;
//!
//! struct Hello(Params);
//!
//! impl Renderable for Hello {
//!     fn render(&self) -> anyhow::Result<String> {
//!         Ok(format!("hello {:?}", self.0.get("name")))
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_page("pages/hello.rs", "Hello", |params| Box::new(Hello(params)));
//! assert!(registry.contains(&HandlerId::new("pages/hello.rs", "Hello")));
//! ```
//!
//! ## Not-found page
//!
//! Unmatched requests render the not-found page. Without an explicit
//! [`HandlerRegistry::set_not_found`] the default page renders
//! `404 - Route not found!`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::RouterSettings;
use crate::error::{Result, RouterError};
use crate::router::{Params, Router};

/// Identity of a handler: the module it lives in plus its logical name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandlerId {
    /// Module / file identifier (e.g. `pages/multiple_pages.rs`)
    pub path: String,
    /// Logical handler name within the module (e.g. `PageMain`)
    pub name: String,
}

impl HandlerId {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.path, self.name)
    }
}

/// What a handler identity can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Renders a page directly
    Leaf,
    /// Delegates the remaining path to a nested router
    Router,
}

/// Contract for everything a forward resolution can produce
pub trait Renderable: Send {
    /// Render the page to output text
    fn render(&self) -> anyhow::Result<String>;
}

/// Builds a page from the parameters accumulated during resolution
pub type LeafFactory = Arc<dyn Fn(Params) -> Box<dyn Renderable> + Send + Sync>;

/// Builds a nested router from the parent's settings and the shared registry
pub type RouterFactory =
    Arc<dyn Fn(&RouterSettings, Arc<HandlerRegistry>) -> Result<Router> + Send + Sync>;

/// Closed set of handler constructors
#[derive(Clone)]
pub enum HandlerFactory {
    Leaf(LeafFactory),
    Router(RouterFactory),
}

impl HandlerFactory {
    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        match self {
            HandlerFactory::Leaf(_) => HandlerKind::Leaf,
            HandlerFactory::Router(_) => HandlerKind::Router,
        }
    }
}

impl fmt::Debug for HandlerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerFactory::Leaf(_) => f.write_str("HandlerFactory::Leaf"),
            HandlerFactory::Router(_) => f.write_str("HandlerFactory::Router"),
        }
    }
}

/// Registration-time check that a handler identity exists and what it can do
///
/// Route tables consult this before accepting a route so that malformed
/// routes fail at startup instead of at request time.
pub trait HandlerResolver {
    /// `None` when the identity is unknown
    fn resolve(&self, handler: &HandlerId) -> Option<HandlerKind>;
}

/// Default not-found page
#[derive(Debug, Clone)]
pub struct RouteNotFound {
    params: Params,
}

impl RouteNotFound {
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Parameters accumulated before resolution gave up
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl Renderable for RouteNotFound {
    fn render(&self) -> anyhow::Result<String> {
        Ok("404 - Route not found!\n".to_string())
    }
}

/// Registry of handler factories keyed by [`HandlerId`]
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerId, HandlerFactory>,
    not_found: Option<LeafFactory>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register any factory under `path`/`name`, replacing an earlier one
    pub fn register(&mut self, path: &str, name: &str, factory: HandlerFactory) {
        let id = HandlerId::new(path, name);
        tracing::debug!(handler = %id, kind = ?factory.kind(), "Handler registered");
        self.handlers.insert(id, factory);
    }

    /// Register a leaf page factory
    pub fn register_page<F>(&mut self, path: &str, name: &str, factory: F)
    where
        F: Fn(Params) -> Box<dyn Renderable> + Send + Sync + 'static,
    {
        self.register(path, name, HandlerFactory::Leaf(Arc::new(factory)));
    }

    /// Register a nested router factory
    pub fn register_router<F>(&mut self, path: &str, name: &str, factory: F)
    where
        F: Fn(&RouterSettings, Arc<HandlerRegistry>) -> Result<Router> + Send + Sync + 'static,
    {
        self.register(path, name, HandlerFactory::Router(Arc::new(factory)));
    }

    /// Set the page rendered for unmatched requests
    pub fn set_not_found<F>(&mut self, factory: F)
    where
        F: Fn(Params) -> Box<dyn Renderable> + Send + Sync + 'static,
    {
        self.not_found = Some(Arc::new(factory));
    }

    #[must_use]
    pub fn contains(&self, handler: &HandlerId) -> bool {
        self.handlers.contains_key(handler)
    }

    #[must_use]
    pub fn get(&self, handler: &HandlerId) -> Option<&HandlerFactory> {
        self.handlers.get(handler)
    }

    /// Number of registered handlers (the not-found page is not counted)
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Build the page for a leaf handler
    pub fn build_page(&self, handler: &HandlerId, params: Params) -> Result<Box<dyn Renderable>> {
        match self.handlers.get(handler) {
            Some(HandlerFactory::Leaf(factory)) => Ok(factory(params)),
            _ => Err(RouterError::UnknownHandler {
                handler: handler.clone(),
            }),
        }
    }

    /// Build the not-found page
    #[must_use]
    pub fn build_not_found(&self, params: Params) -> Box<dyn Renderable> {
        match &self.not_found {
            Some(factory) => factory(params),
            None => Box::new(RouteNotFound::new(params)),
        }
    }
}

impl HandlerResolver for HandlerRegistry {
    fn resolve(&self, handler: &HandlerId) -> Option<HandlerKind> {
        self.handlers.get(handler).map(HandlerFactory::kind)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.len())
            .field("custom_not_found", &self.not_found.is_some())
            .finish()
    }
}
