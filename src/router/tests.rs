use std::sync::Arc;

use http::{Method, StatusCode};

use super::{params, Outcome, Params, Router};
use crate::config::RouterSettings;
use crate::error::RouterError;
use crate::handler::{HandlerId, HandlerRegistry, Renderable};

struct Named(&'static str, Params);

impl Renderable for Named {
    fn render(&self) -> anyhow::Result<String> {
        Ok(format!("{} {:?}", self.0, self.1))
    }
}

fn blog_router(settings: &RouterSettings, registry: Arc<HandlerRegistry>) -> crate::error::Result<Router> {
    let mut router = Router::new(settings.clone(), registry);
    router.add_route("GET", "/", "pages/blog.rs", "BlogIndex", Params::new(), Params::new())?;
    router.add_route("GET", "/post1", "pages/blog.rs", "Post", Params::new(), params(&[("post", "1")]))?;
    router.add_route("GET", "/hello world", "pages/blog.rs", "Spaced", Params::new(), Params::new())?;
    Ok(router)
}

fn registry() -> Arc<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    for name in ["Home", "Page1", "Admin", "Localized"] {
        registry.register_page("pages/site.rs", name, move |p| Box::new(Named(name, p)));
    }
    for name in ["BlogIndex", "Post", "Spaced"] {
        registry.register_page("pages/blog.rs", name, move |p| Box::new(Named(name, p)));
    }
    registry.register_router("routers/blog.rs", "BlogRouter", blog_router);
    registry.register_router("routers/broken.rs", "BrokenRouter", |_, _| {
        Err(RouterError::invalid("get/x", "broken on purpose"))
    });
    Arc::new(registry)
}

fn site() -> Router {
    let mut router = Router::new(RouterSettings::default(), registry());
    router.add_route("GET", "/", "pages/site.rs", "Home", Params::new(), Params::new()).unwrap();
    router
        .add_route("GET", "/page1", "pages/site.rs", "Page1", Params::new(), params(&[("lang", "en")]))
        .unwrap();
    router
        .add_route(
            "GET",
            "/admin",
            "pages/site.rs",
            "Admin",
            params(&[("role", "admin")]),
            Params::new(),
        )
        .unwrap();
    router
        .add_route("GET", "/blog/*", "routers/blog.rs", "BlogRouter", Params::new(), params(&[("section", "blog")]))
        .unwrap();
    router
        .add_route("GET", "/broken/*", "routers/broken.rs", "BrokenRouter", Params::new(), Params::new())
        .unwrap();
    router
}

fn handler_name(router: &Router, uri: &str, params: Params) -> Option<String> {
    router
        .forward(&Method::GET, "", uri, params)
        .unwrap()
        .handler()
        .map(|h| h.name.clone())
}

#[test]
fn test_forward_leaf_merges_params_set() {
    let router = site();
    let resolution = router.forward(&Method::GET, "", "/page1", params(&[("x", "1")])).unwrap();
    assert_eq!(resolution.outcome, Outcome::Matched(HandlerId::new("pages/site.rs", "Page1")));
    assert_eq!(resolution.params, params(&[("lang", "en"), ("x", "1")]));
    assert_eq!(resolution.status(), StatusCode::OK);
}

#[test]
fn test_forward_trailing_slash_and_query_ignored() {
    let router = site();
    assert_eq!(handler_name(&router, "/page1/", Params::new()).as_deref(), Some("Page1"));
    assert_eq!(handler_name(&router, "/page1?a=b", Params::new()).as_deref(), Some("Page1"));
    assert_eq!(handler_name(&router, "/?q=/page1", Params::new()).as_deref(), Some("Home"));
}

#[test]
fn test_forward_is_method_scoped() {
    let router = site();
    let resolution = router.forward(&Method::POST, "", "/page1", Params::new()).unwrap();
    assert_eq!(resolution.outcome, Outcome::NotFound);
}

#[test]
fn test_forward_partial_path_not_found() {
    let router = site();
    let resolution = router.forward(&Method::GET, "", "/page1/extra", Params::new()).unwrap();
    assert_eq!(resolution.status(), StatusCode::NOT_FOUND);
    assert_eq!(resolution.render().unwrap(), "404 - Route not found!\n");
}

#[test]
fn test_params_match_gates_route() {
    let router = site();
    assert_eq!(
        handler_name(&router, "/admin", params(&[("role", "admin")])).as_deref(),
        Some("Admin")
    );
    assert!(handler_name(&router, "/admin", params(&[("role", "guest")])).is_none());
    assert!(handler_name(&router, "/admin", Params::new()).is_none());
}

#[test]
fn test_forward_delegates_through_wildcard() {
    let router = site();
    let resolution = router.forward(&Method::GET, "", "/blog/post1", Params::new()).unwrap();
    assert_eq!(resolution.handler(), Some(&HandlerId::new("pages/blog.rs", "Post")));
    assert_eq!(resolution.params, params(&[("post", "1"), ("section", "blog")]));

    assert_eq!(handler_name(&router, "/blog", Params::new()).as_deref(), Some("BlogIndex"));
    assert_eq!(handler_name(&router, "/blog/", Params::new()).as_deref(), Some("BlogIndex"));
    assert_eq!(
        handler_name(&router, "/blog/hello%20world", Params::new()).as_deref(),
        Some("Spaced")
    );
    assert!(handler_name(&router, "/blog/post2", Params::new()).is_none());
}

#[test]
fn test_forward_with_base_uri() {
    let router = site();
    let resolution = router.forward(&Method::GET, "/site/", "/site/blog/post1", Params::new()).unwrap();
    assert!(resolution.is_found());

    let err = router
        .forward(&Method::GET, "/site", "/other/page1", Params::new())
        .unwrap_err();
    assert!(matches!(err, RouterError::BaseUriMismatch { .. }));
}

#[test]
fn test_failing_nested_factory_surfaces() {
    let router = site();
    let err = router.forward(&Method::GET, "", "/broken/x", Params::new()).unwrap_err();
    match err {
        RouterError::NestedRouter { handler, .. } => assert_eq!(handler.name, "BrokenRouter"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_backward_same_position() {
    let router = site();
    let link = router
        .backward(&Method::GET, "", "/page1?x=1", Params::new(), &Params::new())
        .unwrap();
    assert_eq!(link, "/page1");

    let root = router.backward(&Method::GET, "/site", "/site/", Params::new(), &Params::new()).unwrap();
    assert_eq!(root, "/site");
}

#[test]
fn test_backward_through_nested_router() {
    let router = site();
    let link = router
        .backward(&Method::GET, "/site", "/site/blog/post1", Params::new(), &Params::new())
        .unwrap();
    assert_eq!(link, "/site/blog/post1");
}

#[test]
fn test_backward_unmatched_is_base() {
    let router = site();
    let link = router
        .backward(&Method::GET, "/site", "/site/nope", Params::new(), &Params::new())
        .unwrap();
    assert_eq!(link, "/site");
}

#[test]
fn test_link_to_local_and_nested() {
    let router = site();
    assert_eq!(
        router
            .link_to("/site/", &HandlerId::new("pages/site.rs", "Page1"), &Params::new())
            .unwrap()
            .as_deref(),
        Some("/site/page1")
    );
    assert_eq!(
        router
            .link_to("", &HandlerId::new("pages/site.rs", "Home"), &Params::new())
            .unwrap()
            .as_deref(),
        Some("")
    );
    assert_eq!(
        router
            .link_to("", &HandlerId::new("pages/blog.rs", "Post"), &Params::new())
            .unwrap()
            .as_deref(),
        Some("/blog/post1")
    );
}

#[test]
fn test_link_to_unreachable_handler() {
    let mut router = Router::new(RouterSettings::default(), registry());
    router.add_route("GET", "/", "pages/site.rs", "Home", Params::new(), Params::new()).unwrap();
    router
        .add_route("GET", "/blog/*", "routers/blog.rs", "BlogRouter", Params::new(), Params::new())
        .unwrap();
    assert!(router
        .link_to("", &HandlerId::new("pages/site.rs", "Localized"), &Params::new())
        .unwrap()
        .is_none());

    // Mounts are built while searching, so a failing factory is reported.
    let err = site()
        .link_to("", &HandlerId::new("pages/site.rs", "Localized"), &Params::new())
        .unwrap_err();
    assert!(matches!(err, RouterError::NestedRouter { .. }));
}

#[test]
fn test_save_load_resolves_identically() {
    let router = site();
    let bytes = router.save_routes().unwrap();

    let mut loaded = Router::new(RouterSettings::default(), registry());
    loaded.load_routes(&bytes).unwrap();
    assert_eq!(loaded.table().as_ref(), router.table().as_ref());
    for uri in ["/", "/page1", "/blog/post1", "/nope"] {
        assert_eq!(
            handler_name(&loaded, uri, Params::new()),
            handler_name(&router, uri, Params::new()),
            "{uri}"
        );
    }
}

#[test]
fn test_load_replaces_routes_and_empty_is_noop() {
    let source = site();
    let bytes = source.save_routes().unwrap();

    let mut router = Router::new(RouterSettings::default(), registry());
    router.add_route("GET", "/only", "pages/site.rs", "Page1", Params::new(), Params::new()).unwrap();
    router.load_routes(b"").unwrap();
    assert_eq!(router.table().len(), 1);

    router.load_routes(&bytes).unwrap();
    assert!(handler_name(&router, "/only", Params::new()).is_none());
    assert_eq!(router.table().len(), source.table().len());
}

#[test]
fn test_corrupt_cache_leaves_router_unchanged() {
    let mut router = site();
    let mut bytes = router.save_routes().unwrap();
    bytes[3] ^= 0x20;

    let before = router.table().len();
    assert!(matches!(
        router.load_routes(&bytes),
        Err(RouterError::CorruptRouteCache { .. })
    ));
    assert_eq!(router.table().len(), before);
}

#[test]
fn test_clones_share_table_until_modified() {
    let router = site();
    let mut copy = router.clone();
    assert!(Arc::ptr_eq(router.table(), copy.table()));

    copy.add_route("GET", "/extra", "pages/site.rs", "Page1", Params::new(), Params::new())
        .unwrap();
    assert!(!Arc::ptr_eq(router.table(), copy.table()));
    assert!(handler_name(&router, "/extra", Params::new()).is_none());
}

#[test]
fn test_dump_routes_lists_everything() {
    let dump = site().dump_routes();
    assert!(dump.starts_with("[routes] count=5\n"));
    assert!(dump.contains("[route] GET / -> pages/site.rs/Home"));
    assert!(dump.contains("[route] GET /admin -> pages/site.rs/Admin match={\"role\": \"admin\"}"));
    assert!(dump.contains("[route] GET /blog/* -> routers/blog.rs/BlogRouter"));
    assert!(dump.contains("[backward] pages/site.rs/Page1 <- GET /page1"));
}
