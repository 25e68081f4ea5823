//! # Hot Reload Module
//!
//! Live reloading of the route cache without restarting the process.
//!
//! ## Overview
//!
//! [`watch_route_cache`] watches a route cache file and, whenever it is
//! written, decodes it and swaps a fresh [`Router`] snapshot into an
//! [`ArcSwap`]. Readers call `load()` per request and keep the snapshot they
//! started with, so a reload never disturbs an in-flight resolution.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use arc_swap::ArcSwap;
//! use pagerouter::hot_reload::watch_route_cache;
//!
//! let live = Arc::new(ArcSwap::from_pointee(router));
//! let watcher = watch_route_cache("var/routes.cache", Arc::clone(&live), |router| {
//!     println!("reloaded {} routes", router.table().len());
//! })?;
//!
//! // Keep the watcher alive for as long as reloads should happen
//! let resolution = live.load().forward(&Method::GET, "", "/page1", Params::new())?;
//! ```
//!
//! ## Error Handling
//!
//! A cache that fails its checksum or cannot be decoded is logged and ignored;
//! the previous router stays active. Cache files are written through a temp
//! file and a rename, so the parent directory is watched rather than the file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info, warn};

use crate::router::{cache, Router};

/// Watch a route cache file and swap in a new [`Router`] when it changes.
///
/// The new router keeps the current router's settings and handler registry;
/// only the route table is replaced. `on_reload` runs after every swap.
pub fn watch_route_cache<P, F>(
    cache_path: P,
    router: Arc<ArcSwap<Router>>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&Router) + Send + 'static,
{
    let path: PathBuf = cache_path.as_ref().to_path_buf();
    let file_name: Option<OsString> = path.file_name().map(|n| n.to_os_string());
    let watch_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let cache_file = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                let touches_cache = event
                    .paths
                    .iter()
                    .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                if !touches_cache {
                    return;
                }
                match cache::read_file(&cache_file) {
                    Ok(Some(table)) => {
                        let current = router.load();
                        let next = Router::with_table(
                            current.settings().clone(),
                            Arc::clone(current.registry()),
                            Arc::new(table),
                        );
                        info!(
                            path = %cache_file.display(),
                            routes_count = next.table().len(),
                            "hot-reload: route table swapped"
                        );
                        router.store(Arc::new(next));
                        on_reload(&router.load());
                    }
                    Ok(None) => {}
                    Err(e) => {
                        error!(
                            path = %cache_file.display(),
                            error = %e,
                            "hot-reload: keeping previous route table"
                        );
                    }
                }
            }
            Err(e) => warn!(error = ?e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;
    info!(path = %path.display(), "hot-reload: watching route cache");
    Ok(watcher)
}
