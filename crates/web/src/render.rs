//! Minimal server-side template rendering.
//!
//! All `*.html` files in the template directory are read once at startup
//! into an immutable cache. Rendering substitutes three placeholder forms:
//!
//! - `{{ key }}` — the value under `key`, HTML-escaped.
//! - `{{! key }}` — the value verbatim, for pre-rendered HTML fragments.
//! - `{{ helper key }}` — the named helper applied to the value, escaped.
//!
//! Helpers are pure functions registered once at construction; the registry
//! never changes afterwards. Missing keys render as the empty string so a
//! page can share one template between logged-in and anonymous states.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A pure value-to-text helper usable as `{{ helper key }}`.
type HelperFn = fn(&Value) -> String;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to load templates: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown helper: {0}")]
    UnknownHelper(String),

    #[error("Unterminated placeholder in template {0}")]
    UnterminatedPlaceholder(String),
}

/// Values a template is rendered against.
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    values: serde_json::Map<String, Value>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a serializable value under `key`. Rendered through `{{ key }}`
    /// it is HTML-escaped.
    pub fn set(&mut self, key: &str, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.values.insert(key.to_string(), value);
    }

    /// Store an already-rendered HTML fragment under `key`. The template
    /// must reference it as `{{! key }}` to bypass escaping.
    pub fn set_html(&mut self, key: &str, html: String) {
        self.values.insert(key.to_string(), Value::String(html));
    }

    /// Merge every field of a serializable struct in as a top-level key.
    /// Non-object values are ignored.
    pub fn set_all(&mut self, value: impl Serialize) {
        if let Ok(Value::Object(map)) = serde_json::to_value(value) {
            self.values.extend(map);
        }
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Startup-loaded template cache plus the helper registry.
pub struct TemplateEngine {
    templates: HashMap<String, String>,
    helpers: HashMap<&'static str, HelperFn>,
}

impl TemplateEngine {
    /// Load every `*.html` file under `dir`, keyed by file stem
    /// (`templates/book_card.html` becomes `"book_card"`).
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let mut templates = HashMap::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            templates.insert(name.to_string(), std::fs::read_to_string(&path)?);
        }
        Ok(Self {
            templates,
            helpers: default_helpers(),
        })
    }

    /// Render the named template against `data`.
    pub fn render(&self, name: &str, data: &TemplateData) -> Result<String, RenderError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::UnknownTemplate(name.to_string()))?;
        self.substitute(name, template, data)
    }

    fn substitute(
        &self,
        name: &str,
        template: &str,
        data: &TemplateData,
    ) -> Result<String, RenderError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| RenderError::UnterminatedPlaceholder(name.to_string()))?;
            let inner = after[..end].trim();
            out.push_str(&self.expand(name, inner, data)?);
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    fn expand(&self, name: &str, inner: &str, data: &TemplateData) -> Result<String, RenderError> {
        // `{{! key }}`: verbatim, no escaping.
        if let Some(key) = inner.strip_prefix('!') {
            let value = data.get(key.trim());
            return Ok(value.map(value_text).unwrap_or_default());
        }

        let mut parts = inner.split_whitespace();
        let first = parts.next().unwrap_or_default();
        match parts.next() {
            // `{{ helper key }}`
            Some(key) => {
                let helper = self
                    .helpers
                    .get(first)
                    .ok_or_else(|| RenderError::UnknownHelper(format!("{first} in {name}")))?;
                let text = data.get(key).map(helper).unwrap_or_default();
                Ok(escape_html(&text))
            }
            // `{{ key }}`
            None => {
                let text = data.get(first).map(value_text).unwrap_or_default();
                Ok(escape_html(&text))
            }
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn default_helpers() -> HashMap<&'static str, HelperFn> {
    let mut helpers: HashMap<&'static str, HelperFn> = HashMap::new();
    helpers.insert("humanDate", human_date);
    helpers.insert("formatDate", format_date);
    helpers.insert("inc", inc);
    helpers.insert("dec", dec);
    helpers
}

/// `02 Jan 2026 at 15:04`, for timestamps shown in page bodies.
fn human_date(value: &Value) -> String {
    parse_timestamp(value)
        .map(|ts| ts.format("%d %b %Y at %H:%M").to_string())
        .unwrap_or_default()
}

/// `2026-01-02`, for form inputs and compact listings.
fn format_date(value: &Value) -> String {
    parse_timestamp(value)
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Pagination "next page" arithmetic.
fn inc(value: &Value) -> String {
    value.as_i64().map(|n| (n + 1).to_string()).unwrap_or_default()
}

/// Pagination "previous page" arithmetic.
fn dec(value: &Value) -> String {
    value.as_i64().map(|n| (n - 1).to_string()).unwrap_or_default()
}
