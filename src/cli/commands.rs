use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use http::Method;

use crate::config::RouterSettings;
use crate::handler::HandlerRegistry;
use crate::router::{cache, Params, Probe, Router};

/// Command-line interface for route cache files
#[derive(Parser)]
#[command(name = "pagerouter-cache")]
#[command(about = "Inspect and verify pagerouter route caches", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available route cache commands
#[derive(Subcommand)]
pub enum Commands {
    /// List every route and backward link stored in a cache
    Inspect {
        /// Path to the route cache file
        #[arg(short, long, env = "PAGEROUTER_ROUTE_CACHE")]
        cache: PathBuf,
    },
    /// Check the checksum and payload of a cache
    Verify {
        /// Path to the route cache file
        #[arg(short, long, env = "PAGEROUTER_ROUTE_CACHE")]
        cache: PathBuf,
    },
    /// Show where a request lands in a cached table
    ///
    /// Only the cached table is consulted: a wildcard route is reported as a
    /// delegation point without building the nested router.
    Resolve {
        /// Path to the route cache file
        #[arg(short, long, env = "PAGEROUTER_ROUTE_CACHE")]
        cache: PathBuf,

        /// HTTP method of the request
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request URI (query string allowed)
        #[arg(short, long)]
        uri: String,

        /// Base URI the table is mounted under
        #[arg(long, default_value = "")]
        base_uri: String,

        /// Request parameter as key=value (repeatable)
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

/// Parse arguments from the process and run the command against stdout
///
/// # Errors
///
/// Returns an error if the cache cannot be read, fails verification, or the
/// request cannot be resolved.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}

/// Run a parsed command, writing its report to `out`
pub fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Inspect { cache } => {
            let router = load_router(cache)?;
            write!(out, "{}", router.dump_routes())?;
        }
        Commands::Verify { cache } => {
            let bytes = std::fs::read(cache)
                .with_context(|| format!("failed to read {}", cache.display()))?;
            match cache::decode(&bytes)? {
                Some(table) => {
                    let trailer = String::from_utf8_lossy(&bytes[bytes.len() - cache::CHECKSUM_LEN..]);
                    writeln!(
                        out,
                        "ok: {} routes, {} bytes, checksum {}",
                        table.len(),
                        bytes.len(),
                        trailer
                    )?;
                }
                None => writeln!(out, "empty: no routes cached")?,
            }
        }
        Commands::Resolve {
            cache,
            method,
            uri,
            base_uri,
            params,
        } => {
            let router = load_router(cache)?;
            let method = Method::from_bytes(method.to_uppercase().as_bytes())
                .map_err(|_| anyhow!("invalid HTTP method '{}'", method))?;
            let params: Params = params.iter().cloned().collect();
            match router.probe(&method, base_uri, uri, &params)? {
                Probe::Leaf(entry) => writeln!(
                    out,
                    "leaf {} via {} set={:?}",
                    entry.handler, entry.pattern, entry.params_set
                )?,
                Probe::Delegate { entry, base } => writeln!(
                    out,
                    "delegate {} via {} base={}",
                    entry.handler, entry.pattern, base
                )?,
                Probe::NotFound => writeln!(out, "not found")?,
            }
        }
    }
    Ok(())
}

/// A router over a cached table; handlers are never built
fn load_router(path: &Path) -> anyhow::Result<Router> {
    let table = cache::read_file(path)?
        .ok_or_else(|| anyhow!("no route cache at {}", path.display()))?;
    Ok(Router::with_table(
        RouterSettings::default(),
        Arc::new(HandlerRegistry::new()),
        Arc::new(table),
    ))
}
