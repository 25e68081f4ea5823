//! Segment trie backing the route table
//!
//! Routes are stored in a tree of owned nodes keyed by URL-decoded path
//! segment. The first level below the root is keyed by the lower-cased HTTP
//! method, so `GET /blog/post1` lives at `root → "get" → "blog" → "post1"`.
//!
//! ## Node layout
//!
//! Each [`RouteNode`] carries:
//! - literal children, keyed by segment
//! - an optional **leaf** entry: the route that ends exactly at this node
//! - an optional **wildcard** entry: `…/*`, delegating the rest of the path to
//!   a nested router
//!
//! A wildcard owns its node exclusively. A node with a wildcard has no leaf
//! and no children, and a node with either of those cannot take a wildcard.
//!
//! ## Backward index
//!
//! Alongside the tree, the table keeps every route grouped by handler
//! identity in registration order. Backward resolution picks the last entry of
//! a group whose injected parameters overlap the requested ones.
//!
//! ## Complexity
//!
//! - Insertion: O(k) where k is the number of segments
//! - Lookup: O(k · log c) where c is the number of children per node

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use super::matcher::{matches_any, Params};
use crate::error::{Result, RouterError};
use crate::handler::{HandlerId, HandlerKind, HandlerResolver};

/// Final path segment that delegates the remaining path
pub const WILDCARD: &str = "*";

/// Most routes are shallow; segment lists stay on the stack up to this depth
pub const MAX_INLINE_SEGMENTS: usize = 8;

/// Decoded path segments, method first
pub type SegmentVec = SmallVec<[String; MAX_INLINE_SEGMENTS]>;

/// A single registered route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Stored pattern: lower-cased method + path, trailing `/` stripped (e.g. `get/page1`)
    pub pattern: String,
    /// Handler the route resolves to
    pub handler: HandlerId,
    /// Parameters that must already hold these values for the route to match
    pub params_match: Params,
    /// Parameters injected on match (always includes `params_match`)
    pub params_set: Params,
}

/// One candidate link for backward resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackwardEntry {
    /// Stored pattern of the route, method included
    pub link: String,
    /// The route's merged injected parameters
    pub params_set: Params,
}

/// Node of the segment trie
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, RouteNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    leaf: Option<RouteEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wildcard: Option<RouteEntry>,
}

impl RouteNode {
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&RouteNode> {
        self.children.get(segment)
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&RouteEntry> {
        self.leaf.as_ref()
    }

    #[must_use]
    pub fn wildcard(&self) -> Option<&RouteEntry> {
        self.wildcard.as_ref()
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.leaf.is_none() && self.wildcard.is_none()
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a RouteEntry>) {
        if let Some(leaf) = &self.leaf {
            out.push(leaf);
        }
        if let Some(wildcard) = &self.wildcard {
            out.push(wildcard);
        }
        for child in self.children.values() {
            child.collect(out);
        }
    }
}

/// Where a segment walk stopped
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    /// Deepest node reached by following literal children
    pub node: &'a RouteNode,
    /// How many segments were consumed (method included)
    pub consumed: usize,
    /// Whether every segment was consumed
    pub complete: bool,
}

/// Forward tree plus backward index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    root: RouteNode,
    backward: BTreeMap<HandlerId, Vec<BackwardEntry>>,
}

impl RouteTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        root: RouteNode,
        backward: BTreeMap<HandlerId, Vec<BackwardEntry>>,
    ) -> Self {
        Self { root, backward }
    }

    pub(crate) fn root(&self) -> &RouteNode {
        &self.root
    }

    pub(crate) fn backward_index(&self) -> &BTreeMap<HandlerId, Vec<BackwardEntry>> {
        &self.backward
    }

    /// Register a route
    ///
    /// `params_set` is merged over `params_match` before storage. The table is
    /// left untouched when the route is rejected.
    pub fn add_route(
        &mut self,
        method: &str,
        path: &str,
        handler: HandlerId,
        params_match: Params,
        params_set: Params,
        resolver: &dyn HandlerResolver,
    ) -> Result<()> {
        let method = method.to_lowercase();
        let given = format!("{}{}", method, path);

        if path.is_empty() {
            return Err(RouterError::invalid(given, "route can't be blank"));
        }
        if !path.starts_with('/') {
            return Err(RouterError::invalid(given, "route must start with a slash (/)"));
        }
        if method.trim().is_empty() {
            return Err(RouterError::invalid(given, "method can't be blank"));
        }
        if method.contains('/') {
            return Err(RouterError::invalid(given, "method can't contain a slash (/)"));
        }
        if handler.path.is_empty() {
            return Err(RouterError::invalid(given, "handler path can't be blank"));
        }
        if handler.name.is_empty() {
            return Err(RouterError::invalid(given, "handler name can't be blank"));
        }

        let pattern = given
            .strip_suffix('/')
            .map(str::to_string)
            .unwrap_or_else(|| given.clone());
        let (is_wildcard, segments) = {
            let raw: SmallVec<[&str; MAX_INLINE_SEGMENTS]> = pattern.split('/').collect();
            let last = raw.len() - 1;
            if raw
                .iter()
                .enumerate()
                .any(|(i, seg)| seg.contains('*') && !(i == last && *seg == WILDCARD))
            {
                return Err(RouterError::invalid(
                    given,
                    "wildcard (*) must only be the whole last segment",
                ));
            }
            let is_wildcard = raw[last] == WILDCARD;
            let owner_len = if is_wildcard { last } else { raw.len() };
            let segments: SegmentVec = raw[..owner_len]
                .iter()
                .map(|s| decode_segment(s).into_owned())
                .collect();
            (is_wildcard, segments)
        };

        match (resolver.resolve(&handler), is_wildcard) {
            (None, _) => {
                return Err(RouterError::invalid(
                    given,
                    format!("could not find handler {}", handler),
                ))
            }
            (Some(HandlerKind::Leaf), true) => {
                return Err(RouterError::invalid(
                    given,
                    format!("handler {} is not router-capable", handler),
                ))
            }
            (Some(HandlerKind::Router), false) => {
                return Err(RouterError::invalid(
                    given,
                    format!("handler {} is not leaf-capable", handler),
                ))
            }
            _ => {}
        }

        self.check_conflicts(&segments, is_wildcard, &pattern)?;

        let mut merged = params_set;
        for (key, value) in &params_match {
            merged.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let mut node = &mut self.root;
        for segment in segments {
            node = node.children.entry(segment).or_default();
        }

        let entry = RouteEntry {
            pattern: pattern.clone(),
            handler: handler.clone(),
            params_match,
            params_set: merged.clone(),
        };
        if is_wildcard {
            node.wildcard = Some(entry);
        } else {
            node.leaf = Some(entry);
        }

        debug!(
            route = %pattern,
            handler = %handler,
            wildcard = is_wildcard,
            params_set = ?merged,
            "Route added"
        );

        self.backward.entry(handler).or_default().push(BackwardEntry {
            link: pattern,
            params_set: merged,
        });
        Ok(())
    }

    /// Read-only walk that rejects the route before any node is created
    fn check_conflicts(&self, segments: &[String], is_wildcard: bool, pattern: &str) -> Result<()> {
        let conflict = || RouterError::ConflictingWildcard {
            route: pattern.to_string(),
        };
        let duplicate = || RouterError::DuplicateRoute {
            route: pattern.to_string(),
        };

        let mut node = &self.root;
        for segment in segments {
            if node.wildcard.is_some() {
                return Err(conflict());
            }
            match node.children.get(segment) {
                Some(child) => node = child,
                // The rest of the path would be freshly created nodes.
                None => return Ok(()),
            }
        }

        if is_wildcard {
            if node.wildcard.is_some() {
                return Err(duplicate());
            }
            if !node.is_empty() {
                return Err(conflict());
            }
        } else {
            if node.wildcard.is_some() {
                return Err(conflict());
            }
            if node.leaf.is_some() {
                return Err(duplicate());
            }
        }
        Ok(())
    }

    /// Follow literal children for as long as they exist
    #[must_use]
    pub fn locate(&self, segments: &[String]) -> Located<'_> {
        let mut node = &self.root;
        let mut consumed = 0;
        for segment in segments {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    consumed += 1;
                }
                None => break,
            }
        }
        Located {
            node,
            consumed,
            complete: consumed == segments.len(),
        }
    }

    /// Last backward entry of `handler` whose injected params overlap `target`
    ///
    /// An empty `target` expresses no preference and selects the last entry.
    #[must_use]
    pub fn best_link(&self, handler: &HandlerId, target: &Params) -> Option<&BackwardEntry> {
        let entries = self.backward.get(handler)?;
        if target.is_empty() {
            return entries.last();
        }
        entries
            .iter()
            .rev()
            .find(|entry| matches_any(&entry.params_set, target))
    }

    /// Every registered entry in tree order
    #[must_use]
    pub fn routes(&self) -> Vec<&RouteEntry> {
        let mut out = Vec::new();
        self.root.collect(&mut out);
        out
    }

    /// Wildcard entries in tree order
    #[must_use]
    pub fn mounts(&self) -> Vec<&RouteEntry> {
        self.routes()
            .into_iter()
            .filter(|entry| entry.pattern.ends_with("/*"))
            .collect()
    }

    #[must_use]
    pub fn contains_handler(&self, handler: &HandlerId) -> bool {
        self.backward.contains_key(handler)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.backward.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

/// URL-decode one path segment; `+` decodes to a space
pub(crate) fn decode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains(['%', '+']) {
        return Cow::Borrowed(segment);
    }
    let spaced = segment.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
}
