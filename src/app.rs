//! Application front object
//!
//! [`App`] ties configuration, the handler registry and the top-level
//! [`Router`] together and serves one request at a time into a [`Response`].
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use pagerouter::app::App;
//! use pagerouter::config::AppConfig;
//! use pagerouter::handler::{HandlerRegistry, RouteNotFound};
//! use pagerouter::router::Params;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_page("pages.rs", "Home", |p| Box::new(RouteNotFound::new(p)));
//!
//! let mut app = App::new(AppConfig::default(), registry).unwrap();
//! app.router_mut()
//!     .add_route("GET", "/", "pages.rs", "Home", Params::new(), Params::new())
//!     .unwrap();
//!
//! let response = app.handle(&Method::GET, "/missing").unwrap();
//! assert_eq!(response.status, StatusCode::NOT_FOUND);
//! ```

use std::sync::Arc;
use std::time::Instant;

use http::{Method, StatusCode};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::Result;
use crate::handler::{HandlerId, HandlerRegistry};
use crate::router::{Params, Router};

/// Rendered outcome of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
}

/// Per-process front object
#[derive(Debug)]
pub struct App {
    config: AppConfig,
    router: Router,
}

impl App {
    /// Build the top-level router, loading the configured route cache if present
    pub fn new(config: AppConfig, registry: HandlerRegistry) -> Result<Self> {
        let mut router = Router::new(config.router_settings(), Arc::new(registry));
        if let Some(path) = &config.route_cache {
            if router.load_routes_from_file(path)? {
                info!(
                    path = %path.display(),
                    routes_count = router.table().len(),
                    "Routes loaded from cache"
                );
            }
        }
        Ok(Self { config, router })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Registration access during startup
    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Write the route table to the configured cache file
    ///
    /// Returns `false` when no cache file is configured.
    pub fn save_route_cache(&self) -> Result<bool> {
        match &self.config.route_cache {
            Some(path) => {
                self.router.save_routes_to_file(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Resolve and render one request
    ///
    /// `force_uri`, when configured, replaces `uri`.
    pub fn handle(&self, method: &Method, uri: &str) -> anyhow::Result<Response> {
        let start = Instant::now();
        let uri = self.config.force_uri.as_deref().unwrap_or(uri);

        let resolution = self.router.forward(
            method,
            &self.config.base_uri,
            uri,
            self.config.route_params.clone(),
        )?;
        let status = resolution.status();
        let body = resolution.render()?;

        debug!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            handler = ?resolution.handler().map(ToString::to_string),
            duration_us = start.elapsed().as_micros(),
            "Request handled"
        );
        Ok(Response { status, body })
    }

    /// Link for the page at `uri`, re-targeted at `target` params
    pub fn link(&self, method: &Method, uri: &str, target: &Params) -> Result<String> {
        self.router.backward(
            method,
            &self.config.base_uri,
            uri,
            self.config.route_params.clone(),
            target,
        )
    }

    /// Link to a handler identity under the app's base URI
    pub fn link_to(&self, handler: &HandlerId, target: &Params) -> Result<Option<String>> {
        self.router.link_to(&self.config.base_uri, handler, target)
    }
}
