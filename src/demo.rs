//! Demo routes served by the `pigeon` binary.
//!
//! `/hello/{{name}}` is registered twice, for `text/plain` and `text/html`, to
//! show routing on the requested content type.

use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::error::RouterError;
use crate::router::{ParameterSet, Router};
use crate::server::{Request, Response};
use crate::template::TemplateEngine;

/// Render a template, turning failures into a 500
fn render_or_500<S: serde::Serialize>(
    templates: &TemplateEngine,
    name: &str,
    context: S,
) -> Response {
    match templates.render(name, context, 200) {
        Ok(response) => response,
        Err(err) => {
            error!(template = %name, error = %err, "Demo page failed to render");
            Response::internal_error("Internal Server Error")
        }
    }
}

/// Register the demo route table on `router`
///
/// # Errors
///
/// Propagates [`RouterError::MalformedPattern`]; the built-in patterns are valid.
pub fn register_demo_routes(
    router: &Router,
    templates: Arc<TemplateEngine>,
) -> Result<(), RouterError> {
    let index_templates = Arc::clone(&templates);
    router.register(
        "/",
        move |req: &Request, _params: &ParameterSet| {
            render_or_500(
                &index_templates,
                "index.html",
                json!({ "title": "pigeon", "method": req.method.as_str() }),
            )
        },
        "text/html",
    )?;

    router.register(
        "/hello/{{name}}",
        |_req: &Request, params: &ParameterSet| {
            Response::text(200, format!("Hello, {}!", params.get("name").unwrap_or("stranger")))
        },
        "text/plain",
    )?;

    let hello_templates = templates;
    router.register(
        "/hello/{{name}}",
        move |_req: &Request, params: &ParameterSet| {
            render_or_500(&hello_templates, "hello.html", params)
        },
        "text/html",
    )?;

    router.register(
        "/users/{{id}}",
        |req: &Request, params: &ParameterSet| {
            Response::json(
                200,
                &json!({
                    "id": params.get("id"),
                    "fields": req.query("fields"),
                }),
            )
        },
        "application/json",
    )?;

    router.register(
        "/users/{{id}}/posts/{{postId}}",
        |_req: &Request, params: &ParameterSet| {
            Response::json(
                200,
                &json!({
                    "user_id": params.get("id"),
                    "post_id": params.get("postId"),
                }),
            )
        },
        "application/json",
    )?;

    Ok(())
}
