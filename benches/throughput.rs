use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use pagerouter::config::RouterSettings;
use pagerouter::handler::{HandlerRegistry, RouteNotFound};
use pagerouter::router::{params, Params, Router};
use serde::Deserialize;

fn example_routes() -> &'static str {
    r#"
- { method: get, path: /, handler: Home }
- { method: get, path: /zoo/animals, handler: Animals }
- { method: post, path: /zoo/animals, handler: CreateAnimal }
- { method: get, path: /zoo/animals/lion, handler: Lion }
- { method: get, path: /zoo/animals/lion/toys/ball, handler: LionBall }
- { method: get, path: /zoo/cats/animals/tiger/habitats/north/sections/5, handler: Section }
- { method: post, path: /inventory/main/feeds/hay/items/bale/batches/4, handler: Batch }
- { method: get, path: /complex/a/b/c/d/e/f/g/h/i, handler: Complex }
- { method: head, path: /zoo/health, handler: Health }
- { method: get, path: /en/about, handler: About, lang: en }
- { method: get, path: /fr/a-propos, handler: About, lang: fr }
"#
}

#[derive(Deserialize)]
struct RouteDef {
    method: String,
    path: String,
    handler: String,
    lang: Option<String>,
}

fn build_router() -> Router {
    let defs: Vec<RouteDef> = serde_yaml::from_str(example_routes()).expect("failed to parse routes");

    let mut registry = HandlerRegistry::new();
    for def in &defs {
        registry.register_page("pages.rs", &def.handler, |p| Box::new(RouteNotFound::new(p)));
    }
    registry.register_router("routers.rs", "Docs", |settings, registry| {
        let mut router = Router::new(settings.clone(), registry);
        router.add_route("get", "/guide/intro", "pages.rs", "Home", Params::new(), Params::new())?;
        Ok(router)
    });

    let mut router = Router::new(RouterSettings::default(), Arc::new(registry));
    for def in defs {
        let set = match &def.lang {
            Some(lang) => params(&[("lang", lang.as_str())]),
            None => Params::new(),
        };
        router
            .add_route(&def.method, &def.path, "pages.rs", &def.handler, Params::new(), set)
            .expect("failed to add route");
    }
    router
        .add_route("get", "/docs/*", "routers.rs", "Docs", Params::new(), Params::new())
        .expect("failed to add mount");
    router
}

fn bench_forward_throughput(c: &mut Criterion) {
    let router = build_router();
    c.bench_function("forward", |b| {
        let test_paths = [
            (Method::GET, "/zoo/animals/lion"),
            (Method::GET, "/zoo/animals/lion/toys/ball"),
            (Method::GET, "/zoo/cats/animals/tiger/habitats/north/sections/5"),
            (Method::POST, "/inventory/main/feeds/hay/items/bale/batches/4"),
            (Method::GET, "/complex/a/b/c/d/e/f/g/h/i?x=1"),
            (Method::GET, "/does/not/exist"),
        ];
        b.iter(|| {
            for (method, path) in test_paths.iter() {
                let res = router.forward(method, "", path, Params::new());
                black_box(&res);
            }
        })
    });

    c.bench_function("forward_nested", |b| {
        b.iter(|| {
            let res = router.forward(&Method::GET, "", "/docs/guide/intro", Params::new());
            black_box(&res);
        })
    });
}

fn bench_backward(c: &mut Criterion) {
    let router = build_router();
    let fr = params(&[("lang", "fr")]);
    c.bench_function("backward_language_switch", |b| {
        b.iter(|| {
            let link = router.backward(&Method::GET, "", "/en/about", Params::new(), &fr);
            black_box(&link);
        })
    });
}

fn bench_cache_load(c: &mut Criterion) {
    let router = build_router();
    let bytes = router.save_routes().expect("failed to save routes");
    c.bench_function("load_routes", |b| {
        b.iter(|| {
            let mut fresh = Router::new(RouterSettings::default(), Arc::clone(router.registry()));
            fresh.load_routes(black_box(&bytes)).expect("failed to load routes");
            black_box(&fresh);
        })
    });
}

criterion_group!(benches, bench_forward_throughput, bench_backward, bench_cache_load);
criterion_main!(benches);
