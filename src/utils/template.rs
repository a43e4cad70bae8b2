//! Template rendering
//!
//! Templates use Jinja syntax. A `json` filter is available for embedding
//! values in scripts.

use crate::error::PackagerError;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Value};
use serde::Serialize;

fn json_filter(value: Value) -> Result<String, Error> {
    serde_json::to_string(&value).map_err(|e| Error::new(ErrorKind::InvalidOperation, e.to_string()))
}

fn environment(auto_escape: bool) -> Environment<'static> {
    let mut env = Environment::new();
    env.add_filter("json", json_filter);
    env.set_auto_escape_callback(move |_name| {
        if auto_escape {
            AutoEscape::Html
        } else {
            AutoEscape::None
        }
    });
    env
}

/// Render `source` with `params`. `name` only shows up in error messages.
pub fn render<S: Serialize>(
    name: &str,
    source: &str,
    auto_escape: bool,
    params: &S,
) -> Result<String, PackagerError> {
    environment(auto_escape)
        .render_named_str(name, source, params)
        .map_err(|source| PackagerError::Template {
            path: name.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_plain() {
        let out = render("a.js", "var v = {{ version }};", false, &json!({"version": "1.2"})).unwrap();
        assert_eq!(out, "var v = 1.2;");
    }

    #[test]
    fn test_render_escaped() {
        let out = render("a.xml", "<a>{{ name }}</a>", true, &json!({"name": "<b>"})).unwrap();
        assert_eq!(out, "<a>&lt;b&gt;</a>");
    }

    #[test]
    fn test_json_filter() {
        let out = render(
            "a.js",
            "let mods = {{ mods|json }};",
            false,
            &json!({"mods": ["prefs", "utils"]}),
        )
        .unwrap();
        assert_eq!(out, r#"let mods = ["prefs","utils"];"#);
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = render("broken.html", "{% if %}", true, &json!({})).unwrap_err();
        assert!(matches!(err, PackagerError::Template { ref path, .. } if path == "broken.html"));
    }
}
