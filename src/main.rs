//! Simple website demo: three pages and a custom not-found page.
//!
//! ```bash
//! pagerouter / /page1 /page2 /missing
//! pagerouter --config site.yaml --save-cache
//! ```

use std::path::PathBuf;

use clap::Parser;
use http::Method;
use pagerouter::config::AppConfig;
use pagerouter::handler::{HandlerRegistry, Renderable};
use pagerouter::logging::init_logging;
use pagerouter::router::Params;
use pagerouter::App;

#[derive(Parser)]
#[command(name = "pagerouter")]
#[command(about = "Serve the simple website demo for a list of URIs", long_about = None)]
struct Args {
    /// YAML or TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the route table to the configured cache after registration
    #[arg(long, default_value_t = false)]
    save_cache: bool,

    /// Request URIs to serve
    #[arg(default_values_t = ["/".to_string(), "/page1".to_string(), "/page2".to_string(), "/missing".to_string()])]
    uris: Vec<String>,
}

/// Shared page layout
struct SitePage {
    title: &'static str,
    content: &'static str,
}

impl Renderable for SitePage {
    fn render(&self) -> anyhow::Result<String> {
        Ok(format!(
            "<html>\n    <head>\n        <title>{}</title>\n    </head>\n    <body>\n        {}\n    </body>\n</html>\n",
            self.title, self.content
        ))
    }
}

fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register_page("pages/multiple_pages.rs", "PageMain", |_| {
        Box::new(SitePage {
            title: "Main Page",
            content: "<a href='page1'>Page 1</a> <a href='page2'>Page 2</a>",
        })
    });
    registry.register_page("pages/single_page.rs", "Page1", |_| {
        Box::new(SitePage {
            title: "Page 1",
            content: "<a href=''>Main page</a> <a href='page2'>Page2</a>",
        })
    });
    registry.register_page("pages/multiple_pages.rs", "Page2", |_| {
        Box::new(SitePage {
            title: "Page 2",
            content: "<a href=''>Main page</a> <a href='page1'>Page1</a>",
        })
    });
    registry.set_not_found(|_| {
        Box::new(SitePage {
            title: "404 Error - Page not found!",
            content: "We are sorry, but the page you requested was not found.",
        })
    });
    registry
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    config.apply_env();

    let mut app = App::new(config, registry())?;
    if app.router().table().is_empty() {
        let router = app.router_mut();
        router.add_route("get", "/", "pages/multiple_pages.rs", "PageMain", Params::new(), Params::new())?;
        router.add_route("get", "/page1", "pages/single_page.rs", "Page1", Params::new(), Params::new())?;
        router.add_route("get", "/page2", "pages/multiple_pages.rs", "Page2", Params::new(), Params::new())?;
    }
    if args.save_cache && !app.save_route_cache()? {
        anyhow::bail!("--save-cache needs route_cache in the configuration");
    }

    for uri in &args.uris {
        let response = app.handle(&Method::GET, uri)?;
        println!("=== GET {} -> {}", uri, response.status);
        print!("{}", response.body);
    }
    Ok(())
}
