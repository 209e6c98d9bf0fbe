//! HTML page rendering using Jinja2 syntax.
//!
//! Templates are compiled into the binary and registered once at startup.
//! Names ending in `.html` are auto-escaped by minijinja.

use axum::response::Html;
use minijinja::{Environment, Value};

use crate::core::error::AppError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("error.html", include_str!("../../templates/error.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("upload.html", include_str!("../../templates/upload.html")),
    (
        "upload_result.html",
        include_str!("../../templates/upload_result.html"),
    ),
    (
        "admin_login.html",
        include_str!("../../templates/admin_login.html"),
    ),
    (
        "admin_panel.html",
        include_str!("../../templates/admin_panel.html"),
    ),
    (
        "admin_report_detail.html",
        include_str!("../../templates/admin_report_detail.html"),
    ),
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
            tracing::debug!("Loaded template: {}", name);
        }
        Ok(Self { env })
    }

    /// Render a page with the given context.
    ///
    /// # Example
    /// ```ignore
    /// let page = templates.render("upload.html", context! { areas => AREAS })?;
    /// ```
    pub fn render(&self, name: &str, ctx: Value) -> Result<Html<String>, AppError> {
        let template = self
            .env
            .get_template(name)
            .map_err(|_| AppError::Internal(format!("Template '{}' not found", name)))?;

        Ok(Html(template.render(ctx)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_compile() {
        assert!(Templates::new().is_ok());
    }

    #[test]
    fn test_missing_template_is_internal_error() {
        let templates = Templates::new().unwrap();
        let result = templates.render("nope.html", context! {});
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_html_is_escaped() {
        let templates = Templates::new().unwrap();
        let Html(page) = templates
            .render(
                "index.html",
                context! { messages => vec!["<script>alert(1)</script>"] },
            )
            .unwrap();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>alert(1)</script>"));
    }
}
