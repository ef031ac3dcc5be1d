//! HTML rendering
//!
//! Templates are compiled into the binary and rendered with minijinja.
//! Auto-escaping is on for every `.html` template, so dataset text and
//! model answers are always inserted as text.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::{context, Environment};
use redscope_common::errors::{log_error, AppError, Result};
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("posts.html", include_str!("../../templates/posts.html")),
    ("post_details.html", include_str!("../../templates/post_details.html")),
    ("chat.html", include_str!("../../templates/chat.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// Compiled page templates
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source).map_err(template_error)?;
        }
        Ok(Self { env })
    }

    /// Render a page template
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>> {
        let template = self.env.get_template(name).map_err(template_error)?;
        template.render(ctx).map(Html).map_err(template_error)
    }

    /// Turn a page result into a response, rendering failures as HTML
    pub fn page(&self, result: Result<Html<String>>) -> Response {
        match result {
            Ok(html) => html.into_response(),
            Err(err) => self.error_page(&err),
        }
    }

    /// Error page carrying the error's HTTP status
    pub fn error_page(&self, err: &AppError) -> Response {
        log_error(err);
        let status = err.status_code();
        let ctx = context! {
            title => error_title(status),
            status => status.as_u16(),
            message => err.to_string(),
            code => err.code(),
        };

        match self.render("error.html", ctx) {
            Ok(html) => (status, html).into_response(),
            Err(render_err) => {
                tracing::error!(error = %render_err, "Failed to render error page");
                (status, err.to_string()).into_response()
            }
        }
    }
}

fn error_title(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "Not found",
        StatusCode::BAD_REQUEST => "Invalid request",
        StatusCode::TOO_MANY_REQUESTS => "Slow down",
        StatusCode::SERVICE_UNAVAILABLE => "Unavailable",
        _ => "Something went wrong",
    }
}

fn template_error(e: minijinja::Error) -> AppError {
    AppError::Template {
        message: e.to_string(),
    }
}

/// Link to a post's detail page
pub fn detail_href(id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    format!("/post_details?id={}", encoded)
}
