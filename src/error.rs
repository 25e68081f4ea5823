use std::fmt;
use std::path::PathBuf;

use crate::handler::HandlerId;

/// Errors raised by route registration, resolution and the route cache.
///
/// Every variant describes a programming, configuration or cache-integrity
/// problem. An unmatched request is not an error; it resolves to the
/// not-found page instead.
#[derive(Debug)]
pub enum RouterError {
    /// The route pattern, method or handler identity is malformed
    InvalidRoute {
        /// The route as given to `add_route` (method-prefixed)
        route: String,
        /// What is wrong with it
        reason: String,
    },
    /// A wildcard route shares its node with a literal route
    ///
    /// Wildcard routes own their node exclusively: no leaf, no literal
    /// children.
    ConflictingWildcard {
        /// The stored pattern of the rejected route
        route: String,
    },
    /// The exact same pattern was registered twice
    DuplicateRoute {
        /// The stored pattern of the rejected route
        route: String,
    },
    /// The serialized route table failed its checksum or could not be decoded
    CorruptRouteCache {
        /// Why the cache was rejected
        reason: String,
    },
    /// The request URI does not begin with the base consumed by the parent router
    BaseUriMismatch {
        /// Expected prefix
        base_uri: String,
        /// The full request URI
        request_uri: String,
    },
    /// A route points at a handler identity that the registry cannot build
    UnknownHandler {
        /// The missing identity
        handler: HandlerId,
    },
    /// A nested router factory failed while delegating
    NestedRouter {
        /// The router-capable handler that failed to build
        handler: HandlerId,
        /// The underlying failure
        source: Box<RouterError>,
    },
    /// Reading or writing a route cache file failed
    Io {
        /// The cache file
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
}

impl RouterError {
    pub(crate) fn invalid(route: impl Into<String>, reason: impl Into<String>) -> Self {
        RouterError::InvalidRoute {
            route: route.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        RouterError::CorruptRouteCache {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidRoute { route, reason } => {
                write!(f, "invalid route '{}': {}", route, reason)
            }
            RouterError::ConflictingWildcard { route } => {
                write!(
                    f,
                    "route '{}' conflicts with a wildcard route: \
                    wildcard routes can't have neighbours",
                    route
                )
            }
            RouterError::DuplicateRoute { route } => {
                write!(f, "route '{}' is already registered", route)
            }
            RouterError::CorruptRouteCache { reason } => {
                write!(f, "route cache rejected: {}", reason)
            }
            RouterError::BaseUriMismatch {
                base_uri,
                request_uri,
            } => {
                write!(
                    f,
                    "base URI '{}' not found at the beginning of request URI '{}'",
                    base_uri, request_uri
                )
            }
            RouterError::UnknownHandler { handler } => {
                write!(f, "handler '{}' is not registered", handler)
            }
            RouterError::NestedRouter { handler, source } => {
                write!(f, "nested router '{}' failed: {}", handler, source)
            }
            RouterError::Io { path, source } => {
                write!(f, "route cache I/O on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::NestedRouter { source, .. } => Some(source.as_ref()),
            RouterError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias used throughout the routing core
pub type Result<T, E = RouterError> = std::result::Result<T, E>;
