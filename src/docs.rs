//! Swagger UI page rendering.

use minijinja::{context, Environment};

use crate::error::DocsError;
use crate::server::ApiRequest;

const SWAGGER_UI_TEMPLATE: &str = include_str!("../templates/swagger_ui.html");

/// Render the Swagger UI page loading the spec from `base_url` + `json_path`.
///
/// The `.html` template name turns on minijinja's HTML auto-escaping.
pub fn render_swagger_ui(base_url: &str, json_path: &str, title: &str) -> Result<String, DocsError> {
    let mut env = Environment::new();
    env.add_template("swagger_ui.html", SWAGGER_UI_TEMPLATE)?;
    let tmpl = env.get_template("swagger_ui.html")?;
    let rendered = tmpl.render(context! {
        title => title,
        spec_url => format!("{base_url}{json_path}"),
    })?;
    Ok(rendered)
}

/// Origin the browser used to reach us: `x-forwarded-proto` (or `http`) plus
/// the `host` header.
#[must_use]
pub fn base_url(req: &ApiRequest) -> String {
    let proto = req
        .get_header("x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = req.get_header("host").unwrap_or("localhost");
    format!("{proto}://{host}")
}
