//! # Configuration Module
//!
//! Configuration for the page router comes from two places:
//!
//! - a config file (`.yaml`/`.yml` or `.toml`) loaded with [`AppConfig::from_file`]
//! - `PAGEROUTER_*` environment variables applied on top with [`AppConfig::apply_env`]
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PAGEROUTER_APP_FOLDER` | `app_folder` |
//! | `PAGEROUTER_BASE_URI` | `base_uri` |
//! | `PAGEROUTER_FORCE_URI` | `force_uri` |
//! | `PAGEROUTER_ROUTE_CACHE` | `route_cache` |
//!
//! ## Example
//!
//! ```yaml
//! app_folder: app
//! base_uri: /site
//! route_cache: var/routes.cache
//! route_params:
//!   lang: en
//! ```
//!
//! Only [`RouterSettings`] are handed to nested routers. The route cache is a
//! property of the top-level router and is never forwarded.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::router::Params;

/// Settings every router in a delegation chain shares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterSettings {
    /// Application folder handlers may load resources from; always ends in `/`
    pub app_folder: String,
}

impl RouterSettings {
    pub fn new(app_folder: &str) -> Self {
        let mut app_folder = app_folder.to_string();
        if !app_folder.ends_with('/') {
            app_folder.push('/');
        }
        Self { app_folder }
    }
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self::new("app/")
    }
}

/// Front-object configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application folder (normalized into [`RouterSettings`])
    pub app_folder: String,
    /// Prefix every served URI starts with (e.g. `/site`)
    pub base_uri: String,
    /// Serve this URI instead of the request's (testing and static builds)
    pub force_uri: Option<String>,
    /// Parameters every resolution starts from
    pub route_params: Params,
    /// Serialized route table to load at startup, if it exists
    pub route_cache: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_folder: "app/".to_string(),
            base_uri: String::new(),
            force_uri: None,
            route_params: Params::new(),
            route_cache: None,
        }
    }
}

impl AppConfig {
    /// Load from a YAML or TOML file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "toml" => toml::from_str(&content)
                .with_context(|| format!("invalid TOML config {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML config {}", path.display()))?,
            other => anyhow::bail!(
                "unsupported config extension '{}' for {}",
                other,
                path.display()
            ),
        };
        Ok(config)
    }

    /// Defaults overridden by the environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `PAGEROUTER_*` environment variables
    pub fn apply_env(&mut self) {
        if let Ok(val) = env::var("PAGEROUTER_APP_FOLDER") {
            self.app_folder = val;
        }
        if let Ok(val) = env::var("PAGEROUTER_BASE_URI") {
            self.base_uri = val;
        }
        if let Ok(val) = env::var("PAGEROUTER_FORCE_URI") {
            self.force_uri = Some(val).filter(|v| !v.is_empty());
        }
        if let Ok(val) = env::var("PAGEROUTER_ROUTE_CACHE") {
            self.route_cache = Some(PathBuf::from(val)).filter(|p| !p.as_os_str().is_empty());
        }
    }

    #[must_use]
    pub fn router_settings(&self) -> RouterSettings {
        RouterSettings::new(&self.app_folder)
    }
}
