//! Router core: forward and backward resolution over one route table.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use http::{Method, StatusCode};
use tracing::{debug, info};

use super::cache;
use super::matcher::{matches_required, merge_params, Params};
use super::tree::{decode_segment, Located, RouteEntry, RouteTable, SegmentVec};
use crate::config::RouterSettings;
use crate::error::{Result, RouterError};
use crate::handler::{HandlerFactory, HandlerId, HandlerRegistry, Renderable};

/// How a forward resolution ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A leaf route matched (possibly behind one or more nested routers)
    Matched(HandlerId),
    /// Nothing matched; the page is the not-found page
    NotFound,
}

/// Result of a forward resolution
pub struct Resolution {
    /// Which handler produced the page
    pub outcome: Outcome,
    /// Parameters after every matched route merged its `params_set`
    pub params: Params,
    page: Box<dyn Renderable>,
}

impl Resolution {
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, Outcome::Matched(_))
    }

    #[must_use]
    pub fn handler(&self) -> Option<&HandlerId> {
        match &self.outcome {
            Outcome::Matched(id) => Some(id),
            Outcome::NotFound => None,
        }
    }

    /// `200 OK` for a match, `404 Not Found` otherwise
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.outcome {
            Outcome::Matched(_) => StatusCode::OK,
            Outcome::NotFound => StatusCode::NOT_FOUND,
        }
    }

    #[must_use]
    pub fn page(&self) -> &dyn Renderable {
        self.page.as_ref()
    }

    pub fn render(&self) -> anyhow::Result<String> {
        self.page.render()
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("outcome", &self.outcome)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Where a request lands in this table, without building any handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// A leaf route matched
    Leaf(RouteEntry),
    /// A wildcard route takes over below `base`
    Delegate { entry: RouteEntry, base: String },
    NotFound,
}

/// A normalized request walked through the table
struct Walk<'a> {
    /// Base URI with its trailing slash removed
    base: &'a str,
    segments: SegmentVec,
    located: Located<'a>,
    /// `base` extended with every consumed path segment
    new_base: String,
}

/// Request router over one route table
///
/// The table sits behind an `Arc`: cloning a router is cheap and a built router
/// is shared read-only across threads. Nested routers are built on demand by
/// the registry's router factories each time a wildcard route is traversed.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use http::Method;
/// use pagerouter::config::RouterSettings;
/// use pagerouter::handler::{HandlerRegistry, RouteNotFound};
/// use pagerouter::router::{Params, Router};
///
/// let mut registry = HandlerRegistry::new();
/// registry.register_page("pages.rs", "Home", |p| Box::new(RouteNotFound::new(p)));
///
/// let mut router = Router::new(RouterSettings::default(), Arc::new(registry));
/// router.add_route("GET", "/", "pages.rs", "Home", Params::new(), Params::new()).unwrap();
///
/// let resolution = router.forward(&Method::GET, "", "/", Params::new()).unwrap();
/// assert!(resolution.is_found());
/// ```
#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    registry: Arc<HandlerRegistry>,
    settings: RouterSettings,
}

impl Router {
    /// Create a router with an empty table
    #[must_use]
    pub fn new(settings: RouterSettings, registry: Arc<HandlerRegistry>) -> Self {
        Self::with_table(settings, registry, Arc::new(RouteTable::new()))
    }

    /// Wrap a table that was built (or loaded) ahead of time
    #[must_use]
    pub fn with_table(
        settings: RouterSettings,
        registry: Arc<HandlerRegistry>,
        table: Arc<RouteTable>,
    ) -> Self {
        Self {
            table,
            registry,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Register a route
    ///
    /// `path` must start with `/`; a final `*` segment delegates everything
    /// below it to the router-capable handler. `params_match` gates the route
    /// and `params_set` is merged into the request parameters on match.
    pub fn add_route(
        &mut self,
        method: &str,
        path: &str,
        handler_path: &str,
        handler_name: &str,
        params_match: Params,
        params_set: Params,
    ) -> Result<()> {
        let handler = HandlerId::new(handler_path, handler_name);
        Arc::make_mut(&mut self.table).add_route(
            method,
            path,
            handler,
            params_match,
            params_set,
            self.registry.as_ref(),
        )
    }

    /// Resolve a request to a renderable page
    ///
    /// `base_uri` is the part of `request_uri` already consumed by parent
    /// routers (or the application's mount point). Unmatched requests resolve
    /// to the not-found page rather than an error.
    pub fn forward(
        &self,
        method: &Method,
        base_uri: &str,
        request_uri: &str,
        mut params: Params,
    ) -> Result<Resolution> {
        let walk = self.walk(method, base_uri, request_uri)?;
        let node = walk.located.node;

        if let Some(wildcard) = node
            .wildcard()
            .filter(|w| matches_required(&params, &w.params_match))
        {
            merge_params(&mut params, &wildcard.params_set);
            debug!(
                method = %method,
                request_uri = %request_uri,
                route = %wildcard.pattern,
                handler = %wildcard.handler,
                new_base = %walk.new_base,
                "Delegating to nested router"
            );
            let nested = self.nested(&wildcard.handler)?;
            return nested.forward(method, &walk.new_base, request_uri, params);
        }

        if walk.located.complete {
            if let Some(leaf) = node
                .leaf()
                .filter(|l| matches_required(&params, &l.params_match))
            {
                merge_params(&mut params, &leaf.params_set);
                let page = self.registry.build_page(&leaf.handler, params.clone())?;
                debug!(
                    method = %method,
                    request_uri = %request_uri,
                    route = %leaf.pattern,
                    handler = %leaf.handler,
                    params = ?params,
                    "Route matched"
                );
                return Ok(Resolution {
                    outcome: Outcome::Matched(leaf.handler.clone()),
                    params,
                    page,
                });
            }
        }

        info!(
            method = %method,
            request_uri = %request_uri,
            base_uri = %walk.base,
            consumed = walk.located.consumed,
            segments = walk.segments.len(),
            "No route matched"
        );
        let page = self.registry.build_not_found(params.clone());
        Ok(Resolution {
            outcome: Outcome::NotFound,
            params,
            page,
        })
    }

    /// Locate a request in this table only
    ///
    /// Applies the same priority and parameter gates as [`Router::forward`] but
    /// stops at the first wildcard instead of delegating.
    pub fn probe(
        &self,
        method: &Method,
        base_uri: &str,
        request_uri: &str,
        params: &Params,
    ) -> Result<Probe> {
        let walk = self.walk(method, base_uri, request_uri)?;
        let node = walk.located.node;

        if let Some(wildcard) = node
            .wildcard()
            .filter(|w| matches_required(params, &w.params_match))
        {
            return Ok(Probe::Delegate {
                entry: wildcard.clone(),
                base: walk.new_base,
            });
        }
        if walk.located.complete {
            if let Some(leaf) = node
                .leaf()
                .filter(|l| matches_required(params, &l.params_match))
            {
                return Ok(Probe::Leaf(leaf.clone()));
            }
        }
        Ok(Probe::NotFound)
    }

    /// Build the link for the current position re-targeted at `target` params
    ///
    /// Walks `request_uri` like [`Router::forward`], then at every matched
    /// route picks the last registration of the same handler whose injected
    /// parameters overlap `target`. Returns `base_uri` alone when nothing
    /// matches.
    pub fn backward(
        &self,
        method: &Method,
        base_uri: &str,
        request_uri: &str,
        mut params: Params,
        target: &Params,
    ) -> Result<String> {
        let walk = self.walk(method, base_uri, request_uri)?;
        let node = walk.located.node;

        let mut link = String::new();
        if let Some(wildcard) = node
            .wildcard()
            .filter(|w| matches_required(&params, &w.params_match))
        {
            merge_params(&mut params, &wildcard.params_set);
            // Without an overlapping mount, stay on the mount being traversed.
            let mount = self
                .table
                .best_link(&wildcard.handler, target)
                .map_or(wildcard.pattern.as_str(), |entry| entry.link.as_str());
            link.push_str(mount.strip_suffix("/*").unwrap_or(mount));
            let nested = self.nested(&wildcard.handler)?;
            let nested_link =
                nested.backward(method, &walk.new_base, request_uri, params, target)?;
            link.push_str(
                nested_link
                    .strip_prefix(walk.new_base.as_str())
                    .unwrap_or(&nested_link),
            );
        } else if walk.located.complete {
            if let Some(leaf) = node
                .leaf()
                .filter(|l| matches_required(&params, &l.params_match))
            {
                if let Some(entry) = self.table.best_link(&leaf.handler, target) {
                    link.push_str(&entry.link);
                }
            }
        }

        let path = strip_method(&link);
        debug!(
            method = %method,
            request_uri = %request_uri,
            target = ?target,
            link = %path,
            "Backward resolution"
        );
        Ok(format!("{}{}", walk.base, path))
    }

    /// Link to a handler identity with the given parameters
    ///
    /// Uses the last registration of `handler` whose injected parameters
    /// overlap `target`. When this table has no route to the handler, every
    /// wildcard mount is asked in tree order and the first hit wins.
    pub fn link_to(
        &self,
        base_uri: &str,
        handler: &HandlerId,
        target: &Params,
    ) -> Result<Option<String>> {
        let base = base_uri.strip_suffix('/').unwrap_or(base_uri);

        if self.table.contains_handler(handler) {
            return Ok(self
                .table
                .best_link(handler, target)
                .map(|entry| format!("{}{}", base, strip_method(&entry.link))));
        }

        for mount in self.table.mounts() {
            let mount_path = strip_method(mount.pattern.strip_suffix("/*").unwrap_or(&mount.pattern));
            let nested = self.nested(&mount.handler)?;
            let nested_base = format!("{}{}", base, mount_path);
            if let Some(link) = nested.link_to(&nested_base, handler, target)? {
                return Ok(Some(link));
            }
        }
        Ok(None)
    }

    /// Serialize the route table into checksum-protected bytes
    pub fn save_routes(&self) -> Result<Vec<u8>> {
        cache::encode(&self.table)
    }

    /// Replace the route table with a serialized one
    ///
    /// Empty input leaves the router unchanged. A checksum mismatch or an
    /// undecodable payload fails with [`RouterError::CorruptRouteCache`] and also
    /// leaves the router unchanged.
    pub fn load_routes(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(table) = cache::decode(bytes)? {
            self.table = Arc::new(table);
        }
        Ok(())
    }

    pub fn save_routes_to_file(&self, path: &Path) -> Result<()> {
        cache::write_file(path, &self.table)
    }

    /// Load a cache file; returns whether a table was loaded
    pub fn load_routes_from_file(&mut self, path: &Path) -> Result<bool> {
        match cache::read_file(path)? {
            Some(table) => {
                self.table = Arc::new(table);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Human-readable listing of the forward tree and backward index
    #[must_use]
    pub fn dump_routes(&self) -> String {
        let routes = self.table.routes();
        let mut out = format!("[routes] count={}\n", routes.len());
        for entry in &routes {
            out.push_str(&format_entry(entry));
            out.push('\n');
        }
        for (handler, entries) in self.table.backward_index() {
            let links: Vec<String> = entries
                .iter()
                .map(|e| format!("{} {:?}", display_path(&e.link), e.params_set))
                .collect();
            out.push_str(&format!("[backward] {} <- {}\n", handler, links.join(", ")));
        }
        out
    }

    /// Build the nested router behind a wildcard route
    fn nested(&self, handler: &HandlerId) -> Result<Router> {
        match self.registry.get(handler) {
            Some(HandlerFactory::Router(factory)) => factory(&self.settings, Arc::clone(&self.registry))
                .map_err(|e| RouterError::NestedRouter {
                    handler: handler.clone(),
                    source: Box::new(e),
                }),
            _ => Err(RouterError::UnknownHandler {
                handler: handler.clone(),
            }),
        }
    }

    fn walk<'a>(&'a self, method: &Method, base_uri: &'a str, request_uri: &str) -> Result<Walk<'a>> {
        let base = base_uri.strip_suffix('/').unwrap_or(base_uri);
        if !base.is_empty() && !request_uri.starts_with(base) {
            return Err(RouterError::BaseUriMismatch {
                base_uri: base.to_string(),
                request_uri: request_uri.to_string(),
            });
        }

        let segments = request_segments(method, base, request_uri);
        let located = self.table.locate(&segments);

        // Consumed segments keep their request spelling so nested routers see
        // the same prefix in `request_uri`.
        let mut new_base = base.to_string();
        for segment in request_path(base, request_uri)
            .split('/')
            .take(located.consumed)
            .skip(1)
        {
            new_base.push('/');
            new_base.push_str(segment);
        }

        Ok(Walk {
            base,
            segments,
            located,
            new_base,
        })
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("settings", &self.settings)
            .finish()
    }
}

/// Method-prefixed, URL-decoded segments of a request below `base`
///
/// The query string is dropped and the path is taken as if it carried exactly
/// one trailing slash, so `/page1` and `/page1/` walk the same way.
pub(crate) fn request_segments(method: &Method, base: &str, request_uri: &str) -> SegmentVec {
    let route = format!(
        "{}{}",
        method.as_str().to_lowercase(),
        request_path(base, request_uri)
    );
    route
        .split('/')
        .map(|segment| decode_segment(segment).into_owned())
        .collect()
}

/// Raw path of a request below `base`, query and trailing slashes dropped
fn request_path<'a>(base: &str, request_uri: &'a str) -> &'a str {
    let path = request_uri.split('?').next().unwrap_or_default();
    path.get(base.len()..).unwrap_or_default().trim_end_matches('/')
}

/// Drop everything before the first `/`; a pattern without one is the empty link
fn strip_method(pattern: &str) -> &str {
    pattern.find('/').map_or("", |i| &pattern[i..])
}

/// `get/page1` → `GET /page1`
fn display_path(pattern: &str) -> String {
    let method = pattern.split('/').next().unwrap_or_default().to_uppercase();
    let path = strip_method(pattern);
    format!("{} {}", method, if path.is_empty() { "/" } else { path })
}

fn format_entry(entry: &RouteEntry) -> String {
    let mut line = format!("[route] {} -> {}", display_path(&entry.pattern), entry.handler);
    if !entry.params_match.is_empty() {
        line.push_str(&format!(" match={:?}", entry.params_match));
    }
    if !entry.params_set.is_empty() {
        line.push_str(&format!(" set={:?}", entry.params_set));
    }
    line
}
