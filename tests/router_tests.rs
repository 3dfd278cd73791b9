//! Integration tests for route registration, ordered matching and dispatch
//!
//! # Test Coverage
//!
//! - First-registered route wins, regardless of specificity
//! - Content type selects between routes sharing a pattern
//! - `NoMatchingRoute` versus `ContentTypeMismatch`
//! - Dispatch hands the handler the request and its parameters
//! - Concurrent matching, and registration while other threads match

use pigeon::error::RouterError;
use pigeon::router::{ParameterSet, Router};
use pigeon::server::{Request, Response};
use std::sync::Arc;
use std::thread;

fn named(name: &'static str) -> impl Fn(&Request, &ParameterSet) -> Response + Send + Sync {
    move |_req, _params| Response::text(200, name)
}

fn get(path: &str) -> Request {
    Request::parse(format!("GET {} HTTP/1.1\r\nHost: test\r\n\r\n", path).as_bytes()).unwrap()
}

#[test]
fn test_first_registered_route_wins() {
    let router = Router::new();
    router.register("/users/{{id}}", named("generic"), "text/plain").unwrap();
    router.register("/users/me", named("me"), "text/plain").unwrap();

    let route = router.find_route("/users/me", "text/plain").unwrap();
    assert_eq!(route.pattern().as_str(), "/users/{{id}}");

    let response = router.dispatch("/users/me", "text/plain").unwrap().call(&get("/users/me"));
    assert_eq!(response.body, b"generic");
}

#[test]
fn test_content_type_selects_route() {
    let router = Router::new();
    router.register("/hello/{{name}}", named("plain"), "text/plain").unwrap();
    router.register("/hello/{{name}}", named("html"), "text/html").unwrap();

    let req = get("/hello/bob");
    let plain = router.dispatch("/hello/bob", "text/plain").unwrap().call(&req);
    let html = router.dispatch("/hello/bob", "text/html").unwrap().call(&req);
    assert_eq!(plain.body, b"plain");
    assert_eq!(html.body, b"html");
}

#[test]
fn test_content_type_is_exact() {
    let router = Router::new();
    router.register("/doc", named("doc"), "text/html").unwrap();

    assert!(router.find_route("/doc", "text/html").is_ok());
    for requested in ["TEXT/HTML", "text/html; charset=utf-8", "text/*", ""] {
        assert!(
            matches!(
                router.find_route("/doc", requested),
                Err(RouterError::ContentTypeMismatch { .. })
            ),
            "{requested:?} should not match text/html"
        );
    }
}

#[test]
fn test_no_matching_route_on_empty_router() {
    let router = Router::new();
    let err = router.dispatch("/", "text/html").unwrap_err();
    assert_eq!(
        err,
        RouterError::NoMatchingRoute {
            path: "/".to_string()
        }
    );
    assert!(err.is_not_found());
}

#[test]
fn test_mismatch_reported_even_when_later_routes_miss_path() {
    let router = Router::new();
    router.register("/a/{{x}}", named("a"), "application/json").unwrap();
    router.register("/b/{{x}}", named("b"), "text/html").unwrap();

    let err = router.find_route("/a/1", "text/html").unwrap_err();
    assert!(matches!(err, RouterError::ContentTypeMismatch { .. }));
    let err = router.find_route("/c/1", "text/html").unwrap_err();
    assert!(matches!(err, RouterError::NoMatchingRoute { .. }));
}

#[test]
fn test_handler_receives_request_and_params() {
    let router = Router::new();
    router
        .register(
            "/users/{{id}}/posts/{{postId}}",
            |req: &Request, params: &ParameterSet| {
                Response::text(
                    200,
                    format!(
                        "{} {} {} {}",
                        req.method,
                        params.get("id").unwrap_or("-"),
                        params.get("postId").unwrap_or("-"),
                        req.query("sort").unwrap_or("-"),
                    ),
                )
            },
            "text/plain",
        )
        .unwrap();

    let req = Request::parse(b"DELETE /users/42/posts/7?sort=asc HTTP/1.1\r\n\r\n").unwrap();
    let bound = router.dispatch(&req.path, "text/plain").unwrap();
    assert_eq!(bound.params().len(), 2);
    let response = bound.call(&req);
    assert_eq!(response.body, b"DELETE 42 7 asc");
}

#[test]
fn test_dispatch_values_equal_to_literals() {
    let router = Router::new();
    router
        .register(
            "/{{user}}/profile",
            |_req, params| Response::text(200, params.get("user").unwrap_or_default()),
            "text/plain",
        )
        .unwrap();
    router
        .register(
            "/{{name}}",
            |_req, params| Response::text(200, params.get("name").unwrap_or_default()),
            "text/plain",
        )
        .unwrap();

    let bound = router.dispatch("/profile/profile", "text/plain").unwrap();
    assert_eq!(bound.params().get("user"), Some("profile"));
    assert_eq!(bound.call(&get("/profile/profile")).body, b"profile");

    let bound = router.dispatch("/alice", "text/plain").unwrap();
    assert_eq!(bound.params().get("name"), Some("alice"));
    assert_eq!(bound.call(&get("/alice")).body, b"alice");
}

#[test]
fn test_bound_handler_reusable() {
    let router = Router::new();
    router
        .register(
            "/n/{{n}}",
            |_req, params| Response::text(200, params.get("n").unwrap_or_default()),
            "text/plain",
        )
        .unwrap();
    let bound = router.dispatch("/n/5", "text/plain").unwrap();
    let req = get("/n/5");
    assert_eq!(bound.call(&req).body, b"5");
    assert_eq!(bound.call(&req).body, b"5");
    assert_eq!(bound.params().get("n"), Some("5"));
}

#[test]
fn test_concurrent_matching() {
    let router = Arc::new(Router::new());
    router.register("/users/{{id}}", named("user"), "application/json").unwrap();
    router.register("/items/{{id}}", named("item"), "application/json").unwrap();

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for i in 0..200 {
                    let path = format!("/users/{}-{}", t, i);
                    let bound = router.dispatch(&path, "application/json").unwrap();
                    assert_eq!(bound.params().get("id"), Some(format!("{}-{}", t, i).as_str()));
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn test_register_while_matching() {
    let router = Arc::new(Router::new());
    router.register("/stable/{{id}}", named("stable"), "text/plain").unwrap();

    let reader = {
        let router = Arc::clone(&router);
        thread::spawn(move || {
            for _ in 0..2_000 {
                // A reader always sees a complete table containing the first route
                let route = router.find_route("/stable/1", "text/plain").unwrap();
                assert_eq!(route.pattern().as_str(), "/stable/{{id}}");
            }
        })
    };

    let writer = {
        let router = Arc::clone(&router);
        thread::spawn(move || {
            for i in 0..100 {
                router
                    .register(&format!("/dyn{}/{{{{id}}}}", i), named("dyn"), "text/plain")
                    .unwrap();
            }
        })
    };

    reader.join().unwrap();
    writer.join().unwrap();
    assert_eq!(router.route_count(), 101);
    assert!(router.find_route("/dyn99/x", "text/plain").is_ok());
}

#[test]
fn test_malformed_pattern_fails_fast() {
    let router = Router::new();
    let err = router
        .register("/users/{{id}}/{{id}}", named("dup"), "text/plain")
        .unwrap_err();
    match err {
        RouterError::MalformedPattern { pattern, reason } => {
            assert_eq!(pattern, "/users/{{id}}/{{id}}");
            assert!(reason.contains("id"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(router.is_empty());
}

#[test]
fn test_routes_snapshot_in_order() {
    let router = Router::new();
    router.register("/a", named("a"), "text/plain").unwrap();
    let snapshot = router.routes();
    router.register("/b", named("b"), "text/plain").unwrap();

    assert_eq!(snapshot.len(), 1);
    let patterns: Vec<_> = router
        .routes()
        .iter()
        .map(|r| r.pattern().as_str().to_string())
        .collect();
    assert_eq!(patterns, vec!["/a", "/b"]);
}
