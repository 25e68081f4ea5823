#![allow(dead_code)]

use std::sync::Arc;

use pagerouter::config::RouterSettings;
use pagerouter::handler::{HandlerRegistry, Renderable};
use pagerouter::router::{params, Params, Router};

/// Page that renders its name and the params it was built with
pub struct NamedPage {
    pub name: &'static str,
    pub params: Params,
}

impl Renderable for NamedPage {
    fn render(&self) -> anyhow::Result<String> {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        Ok(format!("{}[{}]", self.name, params.join(",")))
    }
}

pub const PAGES: &str = "pages/multiple_pages.rs";
pub const BLOG: &str = "pages/blog.rs";
pub const BLOG_ROUTER: &str = "routers/blog.rs";

pub fn page(registry: &mut HandlerRegistry, path: &str, name: &'static str) {
    registry.register_page(path, name, move |params| Box::new(NamedPage { name, params }));
}

/// Nested blog router: `/` → BlogIndex, `/post1` → D, `/{lang}/post` variants
pub fn blog_router(
    settings: &RouterSettings,
    registry: Arc<HandlerRegistry>,
) -> pagerouter::error::Result<Router> {
    let mut router = Router::new(settings.clone(), registry);
    router.add_route("get", "/", BLOG, "BlogIndex", Params::new(), Params::new())?;
    router.add_route("get", "/post1", BLOG, "D", Params::new(), Params::new())?;
    router.add_route("get", "/en/post", BLOG, "LocalPost", Params::new(), params(&[("lang", "en")]))?;
    router.add_route("get", "/fr/post", BLOG, "LocalPost", Params::new(), params(&[("lang", "fr")]))?;
    Ok(router)
}

/// Every handler the fixtures use
pub fn registry() -> Arc<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    for name in ["A", "B", "C", "Admin", "Article", "Home"] {
        page(&mut registry, PAGES, name);
    }
    for name in ["BlogIndex", "D", "LocalPost"] {
        page(&mut registry, BLOG, name);
    }
    registry.register_router(BLOG_ROUTER, "BlogRouter", blog_router);
    registry.set_not_found(|params| Box::new(NamedPage { name: "NotFound", params }));
    Arc::new(registry)
}

/// `/` → A, `/page1` → B, `/page2` → C
pub fn simple_site() -> Router {
    let mut router = Router::new(RouterSettings::new("examples/site"), registry());
    router.add_route("get", "/", PAGES, "A", Params::new(), Params::new()).unwrap();
    router.add_route("get", "/page1", PAGES, "B", Params::new(), Params::new()).unwrap();
    router.add_route("get", "/page2", PAGES, "C", Params::new(), Params::new()).unwrap();
    router
}

/// The simple site plus a blog mount, a role-gated page and localized articles
pub fn full_site() -> Router {
    let mut router = simple_site();
    router
        .add_route("get", "/blog/*", BLOG_ROUTER, "BlogRouter", Params::new(), params(&[("section", "blog")]))
        .unwrap();
    router
        .add_route("get", "/admin", PAGES, "Admin", params(&[("role", "admin")]), Params::new())
        .unwrap();
    router
        .add_route("get", "/en/article", PAGES, "Article", Params::new(), params(&[("lang", "en")]))
        .unwrap();
    router
        .add_route("get", "/fr/article", PAGES, "Article", Params::new(), params(&[("lang", "fr")]))
        .unwrap();
    router
}

/// The simple site with the blog router mounted at `mount` (e.g. `/my blog/*`)
pub fn encoded_mount_site(mount: &str) -> Router {
    let mut router = simple_site();
    router
        .add_route("get", mount, BLOG_ROUTER, "BlogRouter", Params::new(), Params::new())
        .unwrap();
    router
}
