//! End-to-end routing and dispatch behaviour.

use hyper::body::Bytes;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use tokio_util::sync::CancellationToken;
use trellis_core::{
    handler, Context, Error, HandlerRef, Method, Outcome, ParamValue, Request, Response, Router,
    RouterConfig,
};

fn text(body: &'static str) -> Vec<HandlerRef> {
    vec![handler(move |ctx: &mut Context| ctx.text(body))]
}

/// Appends `label` to the `trail` value and continues
fn mark(label: &'static str) -> HandlerRef {
    handler(move |ctx: &mut Context| {
        let mut trail: Vec<String> = ctx.value("trail").unwrap_or_default();
        trail.push(label.to_string());
        ctx.set_value("trail", &trail).unwrap();
        ctx.next();
    })
}

/// Writes the collected trail as the response body
fn report() -> HandlerRef {
    handler(|ctx: &mut Context| {
        let trail: Vec<String> = ctx.value("trail").unwrap_or_default();
        ctx.text(trail.join(","));
    })
}

fn send(router: &Router, method: Method, path: &str) -> Response {
    router.dispatch(
        Request::new(method, path, HashMap::new(), None),
        CancellationToken::new(),
    )
}

fn resolve_id(router: &Router, method: Method, path: &str) -> Option<usize> {
    match router.resolve(method, path) {
        Outcome::Matched(r) => Some(r.route_id),
        _ => None,
    }
}

#[test]
fn static_routes_resolve_without_params() {
    let mut router = Router::new();
    let paths = ["/", "/about", "/blog/archive", "/contact"];
    let handles: Vec<_> = paths
        .iter()
        .map(|p| router.get(p, text("ok")).unwrap())
        .collect();
    router.build().unwrap();

    for (path, handle) in paths.iter().zip(&handles) {
        match router.resolve(Method::Get, path) {
            Outcome::Matched(r) => {
                assert_eq!(r.route_id, handle.id());
                assert!(r.params.is_empty());
            }
            other => panic!("{path}: {other:?}"),
        }
    }
}

#[test]
fn typed_parameter_binds_or_misses() {
    let mut router = Router::new();
    router.get("/user/{id:uint}", text("user")).unwrap();
    router.build().unwrap();

    match router.resolve(Method::Get, "/user/42") {
        Outcome::Matched(r) => assert_eq!(r.params.get("id"), Some(&ParamValue::Uint(42))),
        other => panic!("{other:?}"),
    }
    assert!(matches!(
        router.resolve(Method::Get, "/user/abc"),
        Outcome::NotFound { .. }
    ));
}

#[test]
fn static_wins_over_parameter() {
    for profile_first in [true, false] {
        let mut router = Router::new();
        let (profile, param) = if profile_first {
            let p = router.get("/user/profile", text("profile")).unwrap();
            (p, router.get("/user/{id}", text("param")).unwrap())
        } else {
            let q = router.get("/user/{id}", text("param")).unwrap();
            (router.get("/user/profile", text("profile")).unwrap(), q)
        };
        router.build().unwrap();

        assert_eq!(resolve_id(&router, Method::Get, "/user/profile"), Some(profile.id()));
        assert_eq!(resolve_id(&router, Method::Get, "/user/other"), Some(param.id()));
    }
}

#[test]
fn wildcard_captures_remainder() {
    let mut router = Router::new();
    router.get("/files/{rest:path}", text("file")).unwrap();
    router.build().unwrap();

    match router.resolve(Method::Get, "/files/a/b/c") {
        Outcome::Matched(r) => {
            assert_eq!(r.params.get("rest"), Some(&ParamValue::Path("a/b/c".into())));
        }
        other => panic!("{other:?}"),
    }
    assert!(matches!(
        router.resolve(Method::Get, "/files"),
        Outcome::NotFound { .. }
    ));
}

#[test]
fn wildcard_must_be_last() {
    let mut router = Router::new();
    let err = router.get("/files/{rest:path}/edit", text("x")).unwrap_err();
    assert!(matches!(err, Error::InvalidPathTemplate { .. }));
    assert!(router.is_empty());
}

#[test]
fn duplicate_and_sealed_registration_fail() {
    let mut router = Router::new();
    router.get("/about", text("a")).unwrap();
    let err = router.get("/about/", text("b")).unwrap_err();
    assert!(matches!(err, Error::DuplicateRoute { method: Method::Get, .. }));

    router.build().unwrap();
    let err = router.get("/later", text("c")).unwrap_err();
    assert!(matches!(err, Error::RouterSealed));
    assert!(err.is_registration_error());
}

#[test]
fn remove_by_name_detaches_route() {
    let mut router = Router::new();
    router
        .handle_named(Method::Get, "/about", "about_page", text("about"))
        .unwrap();
    router.remove_by_name("about_page").unwrap();
    router.build().unwrap();

    assert!(matches!(
        router.resolve(Method::Get, "/about"),
        Outcome::NotFound { .. }
    ));
    assert!(router.route_by_name("about_page").is_none());
}

#[test]
fn remove_unknown_name_fails() {
    let mut router = Router::new();
    let err = router.remove_by_name("ghost").unwrap_err();
    assert!(matches!(err, Error::UnknownRoute { name } if name == "ghost"));
}

#[test]
fn not_found_suggests_closest_static_path() {
    let mut router = Router::new();
    for p in ["/home", "/contact", "/contract"] {
        router.get(p, text("ok")).unwrap();
    }
    router.build().unwrap();

    match router.resolve(Method::Get, "/hom") {
        Outcome::NotFound { suggestions } => {
            assert_eq!(suggestions.first().map(String::as_str), Some("/home"));
        }
        other => panic!("{other:?}"),
    }
}

#[test]
fn other_method_gives_method_not_allowed() {
    let mut router = Router::new();
    router.post("/users", text("created")).unwrap();
    router.build().unwrap();

    match router.resolve(Method::Get, "/users") {
        Outcome::MethodNotAllowed { allowed } => assert_eq!(allowed, vec![Method::Post]),
        other => panic!("{other:?}"),
    }
}

#[test]
fn middleware_runs_global_group_route_done() {
    let mut router = Router::new();
    router.use_middleware(mark("router")).unwrap();
    router.done_global(report()).unwrap();
    {
        let mut api = router.group("/api", vec![mark("api")]);
        api.done(mark("api-done"));
        let mut v1 = api.group("/v1", vec![mark("v1")]);
        v1.get("/items", vec![mark("route")]).unwrap();
    }
    // Registered last, still runs first
    router.use_global(mark("global")).unwrap();
    router.build().unwrap();

    let res = send(&router, Method::Get, "/api/v1/items");
    assert_eq!(res.status, 200);
    assert_eq!(res.body, "global,router,api,v1,route,api-done");
}

#[test]
fn use_middleware_only_affects_later_routes() {
    let mut router = Router::new();
    router.get("/early", vec![report()]).unwrap();
    router.use_middleware(mark("auth")).unwrap();
    router.get("/late", vec![report()]).unwrap();
    router.build().unwrap();

    assert_eq!(send(&router, Method::Get, "/early").body, "");
    assert_eq!(send(&router, Method::Get, "/late").body, "auth");
}

#[test]
fn handler_without_next_stops_chain() {
    let mut router = Router::new();
    let silent = handler(|ctx: &mut Context| ctx.text("silent"));
    router.get("/x", vec![silent, text("never")[0].clone()]).unwrap();
    router.build().unwrap();

    assert_eq!(send(&router, Method::Get, "/x").body, "silent");
}

#[test]
fn error_code_handlers_fire() {
    let mut router = Router::new();
    router
        .on_error_code(
            404,
            handler(|ctx: &mut Context| {
                let body = json!({ "missing": ctx.request().path, "try": ctx.suggestions() });
                ctx.write_json(&body).unwrap();
            }),
        )
        .unwrap();
    router
        .on_error_code(
            405,
            handler(|ctx: &mut Context| {
                let allowed: Vec<String> =
                    ctx.allowed_methods().iter().map(ToString::to_string).collect();
                ctx.text(format!("use {}", allowed.join("|")));
            }),
        )
        .unwrap();
    router
        .on_error_code(403, handler(|ctx: &mut Context| ctx.text("forbidden page")))
        .unwrap();
    router.get("/home", text("home")).unwrap();
    router.put("/home", text("home")).unwrap();
    router
        .get(
            "/admin",
            vec![handler(|ctx: &mut Context| ctx.stop_with_status(403))],
        )
        .unwrap();
    router.build().unwrap();

    let res = send(&router, Method::Get, "/homer");
    assert_eq!(res.status, 404);
    let body: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body, json!({ "missing": "/homer", "try": ["/home"] }));

    let res = send(&router, Method::Delete, "/home");
    assert_eq!(res.status, 405);
    assert_eq!(res.body, "use GET|PUT");
    assert_eq!(res.header("Allow"), Some("GET, PUT"));

    let res = send(&router, Method::Get, "/admin");
    assert_eq!(res.status, 403);
    assert_eq!(res.body, "forbidden page");
}

#[test]
fn error_status_without_stop_fires_handlers() {
    let mut router = Router::new();
    router.on_error_code(404, text("custom 404")[0].clone()).unwrap();
    router
        .get("/gone", vec![handler(|ctx: &mut Context| ctx.set_status(404))])
        .unwrap();
    router
        .get(
            "/gone-next",
            vec![handler(|ctx: &mut Context| {
                ctx.set_status(404);
                ctx.next();
            })],
        )
        .unwrap();
    router
        .get(
            "/gone-own",
            vec![handler(|ctx: &mut Context| {
                ctx.set_status(404);
                ctx.text("own body");
            })],
        )
        .unwrap();
    router.build().unwrap();

    for path in ["/gone", "/gone-next"] {
        let res = send(&router, Method::Get, path);
        assert_eq!(res.status, 404, "{path}");
        assert_eq!(res.body, "custom 404", "{path}");
    }
    let res = send(&router, Method::Get, "/gone-own");
    assert_eq!(res.status, 404);
    assert_eq!(res.body, "own body");
}

#[test]
fn error_status_without_handler_gets_default_body() {
    let mut router = Router::new();
    router
        .get("/teapot", vec![handler(|ctx: &mut Context| ctx.set_status(418))])
        .unwrap();
    router.build().unwrap();

    let res = send(&router, Method::Get, "/teapot");
    assert_eq!(res.status, 418);
    let body: Value = serde_json::from_str(&res.body).unwrap();
    assert_eq!(body, json!({ "error": "I'm a teapot" }));
}

#[test]
fn misses_run_global_handlers_first() {
    let mut router = Router::new();
    router.use_global(mark("global")).unwrap();
    router.on_error_code(404, report()).unwrap();
    router.on_error_code(405, report()).unwrap();
    router.get("/home", text("home")).unwrap();
    router.build().unwrap();

    let res = send(&router, Method::Get, "/nowhere");
    assert_eq!(res.status, 404);
    assert_eq!(res.body, "global");

    let res = send(&router, Method::Post, "/home");
    assert_eq!(res.status, 405);
    assert_eq!(res.body, "global");
    assert_eq!(res.header("Allow"), Some("GET"));
}

#[test]
fn global_stop_answers_a_miss() {
    let mut router = Router::new();
    router
        .use_global(handler(|ctx: &mut Context| {
            ctx.text("slow down");
            ctx.stop_with_status(429);
        }))
        .unwrap();
    router.on_error_code(404, text("never")[0].clone()).unwrap();
    router.build().unwrap();

    let res = send(&router, Method::Get, "/nowhere");
    assert_eq!(res.status, 429);
    assert_eq!(res.body, "slow down");
}

#[test]
fn equally_close_suggestions_are_sorted() {
    let mut router = Router::new();
    router.get("/cat", text("cat")).unwrap();
    router.get("/bat", text("bat")).unwrap();
    router.build().unwrap();

    match router.resolve(Method::Get, "/at") {
        Outcome::NotFound { suggestions } => assert_eq!(suggestions, vec!["/bat", "/cat"]),
        other => panic!("{other:?}"),
    }
}

#[test]
fn panic_becomes_500_and_siblings_survive() {
    let mut router = Router::new();
    router
        .get(
            "/boom",
            vec![handler(|ctx: &mut Context| {
                ctx.text("partial");
                panic!("handler exploded");
            })],
        )
        .unwrap();
    router.get("/fine", text("fine")).unwrap();
    router.build().unwrap();
    let router = Arc::new(router);

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                let path = if i % 2 == 0 { "/boom" } else { "/fine" };
                (i, send(&router, Method::Get, path))
            })
        })
        .collect();

    for worker in workers {
        let (i, res) = worker.join().unwrap();
        if i % 2 == 0 {
            assert_eq!(res.status, 500);
            let body: Value = serde_json::from_str(&res.body).unwrap();
            assert_eq!(body["error"], "Internal Server Error");
        } else {
            assert_eq!(res.status, 200);
            assert_eq!(res.body, "fine");
        }
    }
}

#[test]
fn cancellation_prevents_later_handlers() {
    let mut router = Router::new();
    router.get("/slow", vec![mark("first"), report()]).unwrap();
    router.build().unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let res = router.dispatch(
        Request::new(Method::Get, "/slow", HashMap::new(), None),
        token,
    );
    assert_eq!(res.body, "");

    let cancel_midway = handler(|ctx: &mut Context| {
        ctx.cancellation_token().cancel();
        ctx.next();
    });
    let mut router = Router::new();
    router.get("/slow", vec![cancel_midway, report()]).unwrap();
    assert_eq!(send(&router, Method::Get, "/slow").body, "");
}

#[test]
fn url_for_round_trips_with_resolve() {
    let mut router = Router::new();
    let handle = router
        .handle_named(
            Method::Get,
            "/shop/{category:alphabetical}/{id:uint min(1)}/{rest:path}",
            "product",
            text("product"),
        )
        .unwrap();
    router.build().unwrap();

    let url = router
        .url_for("product", &[("category", "books"), ("id", "12"), ("rest", "reviews/3")])
        .unwrap();
    assert_eq!(url, "/shop/books/12/reviews/3");

    match router.resolve(Method::Get, &url) {
        Outcome::Matched(r) => {
            assert_eq!(r.route_id, handle.id());
            assert_eq!(r.name.as_deref(), Some("product"));
            assert_eq!(r.params.get_uint("id"), Some(12));
            assert_eq!(r.params.get_string("rest").as_deref(), Some("reviews/3"));
        }
        other => panic!("{other:?}"),
    }

    let err = router
        .url_for("product", &[("category", "books"), ("id", "0"), ("rest", "x")])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParams { .. }));
}

#[test]
fn url_for_encoded_values_resolve_back() {
    let mut router = Router::new();
    router
        .handle_named(Method::Get, "/docs/{title}/{rest:path}", "doc", text("doc"))
        .unwrap();
    router.build().unwrap();

    let url = router
        .url_for("doc", &[("title", "50% off/now"), ("rest", "a b/c")])
        .unwrap();
    match router.resolve(Method::Get, &url) {
        Outcome::Matched(r) => {
            assert_eq!(r.params.get_string("title").as_deref(), Some("50% off/now"));
            assert_eq!(r.params.get_string("rest").as_deref(), Some("a b/c"));
        }
        other => panic!("{other:?}"),
    }

    let err = router
        .url_for("doc", &[("title", "t"), ("rest", "")])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidParams { .. }));
}

#[test]
fn custom_parameter_type() {
    let mut router = Router::new();
    router
        .register_param_type("hex", |s: &str| s.bytes().all(|b| b.is_ascii_hexdigit()))
        .unwrap();
    router.get("/color/{code:hex}", text("color")).unwrap();
    router.build().unwrap();

    assert!(router.route_exists(Method::Get, "/color/ff00aa"));
    assert!(!router.route_exists(Method::Get, "/color/zz"));
}

#[test]
fn unknown_parameter_type_is_invalid_template() {
    let mut router = Router::new();
    let err = router.get("/color/{code:hex}", text("color")).unwrap_err();
    assert!(matches!(err, Error::InvalidPathTemplate { .. }));
}

#[test]
fn json_body_round_trip() {
    let mut router = Router::new();
    router
        .post(
            "/echo",
            vec![handler(|ctx: &mut Context| match ctx.json::<Value>() {
                Ok(value) => ctx.write_json(&json!({ "got": value })).unwrap(),
                Err(_) => ctx.stop_with_status(400),
            })],
        )
        .unwrap();
    router.build().unwrap();

    let res = router.dispatch(
        Request::new(
            Method::Post,
            "/echo",
            HashMap::new(),
            Some(Bytes::from_static(br#"{"a":1}"#)),
        ),
        CancellationToken::new(),
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.content_type, "application/json");
    assert_eq!(res.body, r#"{"got":{"a":1}}"#);

    let res = router.dispatch(
        Request::new(
            Method::Post,
            "/echo",
            HashMap::new(),
            Some(Bytes::from_static(b"nope")),
        ),
        CancellationToken::new(),
    );
    assert_eq!(res.status, 400);
}

#[test]
fn resolve_works_while_building() {
    let mut router = Router::new();
    router.get("/a", vec![report()]).unwrap();
    router.use_global(mark("g")).unwrap();
    assert!(!router.is_sealed());
    assert_eq!(send(&router, Method::Get, "/a").body, "g");
}

#[test]
fn config_limits_suggestions() {
    let mut router = Router::with_config(RouterConfig::new().suggestion_limit(0));
    router.get("/home", text("home")).unwrap();
    match router.resolve(Method::Get, "/hom") {
        Outcome::NotFound { suggestions } => assert!(suggestions.is_empty()),
        other => panic!("{other:?}"),
    }
}
