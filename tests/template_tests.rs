use pigeon::error::TemplateError;
use pigeon::router::ParameterSet;
use pigeon::template::TemplateEngine;
use serde_json::json;
use std::error::Error;
use std::fs;
use std::sync::Arc;
use std::thread;

fn engine_with(files: &[(&str, &str)]) -> (tempfile::TempDir, TemplateEngine) {
    let dir = tempfile::tempdir().unwrap();
    for (name, source) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, source).unwrap();
    }
    let engine = TemplateEngine::new(dir.path());
    (dir, engine)
}

#[test]
fn test_render_html_escapes() {
    let (_dir, engine) = engine_with(&[("page.html", "<p>{{ body }}</p>")]);
    let response = engine
        .render("page.html", json!({ "body": "<script>" }), 200)
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type(), Some("text/html"));
    assert_eq!(response.body, b"<p>&lt;script&gt;</p>");
}

#[test]
fn test_render_text_not_escaped() {
    let (_dir, engine) = engine_with(&[("note.txt", "{{ body }}")]);
    let response = engine
        .render("note.txt", json!({ "body": "<b>" }), 200)
        .unwrap();
    assert_eq!(response.content_type(), Some("text/plain"));
    assert_eq!(response.body, b"<b>");
}

#[test]
fn test_render_status_passthrough() {
    let (_dir, engine) = engine_with(&[("gone.html", "gone")]);
    let response = engine.render("gone.html", json!({}), 410).unwrap();
    assert_eq!(response.status, 410);
}

#[test]
fn test_render_nested_template_and_inheritance() {
    let (_dir, engine) = engine_with(&[
        ("base.html", "<title>{% block title %}{% endblock %}</title>"),
        (
            "pages/user.html",
            "{% extends \"base.html\" %}{% block title %}User {{ id }}{% endblock %}",
        ),
    ]);
    let response = engine
        .render("pages/user.html", json!({ "id": 5 }), 200)
        .unwrap();
    assert_eq!(response.body, b"<title>User 5</title>");
}

#[test]
fn test_render_parameter_set_context() {
    let (_dir, engine) = engine_with(&[("hello.html", "Hello, {{ name }}!")]);
    let params: ParameterSet = pigeon::router::extract_parameters("/{{name}}", "/ada").unwrap();
    let response = engine.render("hello.html", &params, 200).unwrap();
    assert_eq!(response.body, b"Hello, ada!");
}

#[test]
fn test_missing_template() {
    let (_dir, engine) = engine_with(&[]);
    let err = engine.render("nope.html", json!({}), 200).unwrap_err();
    let TemplateError::Render { name, .. } = &err;
    assert_eq!(name, "nope.html");
    assert!(err.to_string().contains("nope.html"));
    assert!(err.source().is_some());
}

#[test]
fn test_engine_shared_between_threads() {
    let (_dir, engine) = engine_with(&[("n.txt", "{{ n }}")]);
    let engine = Arc::new(engine);
    let workers: Vec<_> = (0..4)
        .map(|n| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let response = engine.render("n.txt", json!({ "n": n }), 200).unwrap();
                assert_eq!(response.body, n.to_string().into_bytes());
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
}
