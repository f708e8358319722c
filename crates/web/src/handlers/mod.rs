//! HTTP request handlers.
//!
//! Every handler follows the same shape: decode, validate, authorize,
//! repository call, respond. Pages are rendered as fragments for htmx
//! requests and wrapped in the base layout otherwise.

pub mod auth;
pub mod books;
pub mod home;
pub mod notes;
pub mod reviews;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};
use shelfmark_core::forms::Validator;
use shelfmark_core::types::DbId;

use crate::error::AppResult;
use crate::htmx::is_htmx_request;
use crate::render::{escape_html, RenderError, TemplateData};
use crate::state::AppState;

/// Form body for the `POST .../delete` endpoints.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub id: DbId,
}

/// Render `template` as a bare fragment for htmx requests, or wrapped in
/// the `base` layout with `title` for full-page navigation.
pub(crate) fn render_page(
    state: &AppState,
    headers: &HeaderMap,
    template: &str,
    title: &str,
    mut data: TemplateData,
) -> AppResult<Html<String>> {
    let content = state.templates.render(template, &data)?;
    if is_htmx_request(headers) {
        return Ok(Html(content));
    }
    data.set("title", title);
    data.set_html("content", content);
    Ok(Html(state.templates.render("base", &data)?))
}

/// Like [`render_page`] but with 422 Unprocessable Entity, for form
/// submissions that failed validation.
pub(crate) fn render_invalid(
    state: &AppState,
    headers: &HeaderMap,
    template: &str,
    title: &str,
    data: TemplateData,
) -> AppResult<Response> {
    let page = render_page(state, headers, template, title, data)?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
}

/// Copy a form's accumulated errors into template keys: each field error
/// becomes `{field}_error`, and non-field errors become a pre-rendered
/// `form_errors` list.
pub(crate) fn set_form_errors(data: &mut TemplateData, errors: &Validator) {
    for (key, message) in errors.field_errors() {
        data.set(&format!("{key}_error"), message);
    }
    if !errors.non_field_errors().is_empty() {
        let items: String = errors
            .non_field_errors()
            .iter()
            .map(|m| format!("<li>{}</li>", escape_html(m)))
            .collect();
        data.set_html("form_errors", format!("<ul class=\"form-errors\">{items}</ul>"));
    }
}

/// Render one fragment per item and return the joined HTML, for list pages
/// composed out of per-item templates.
pub(crate) fn render_items<T: Serialize>(
    state: &AppState,
    template: &str,
    items: &[T],
) -> Result<String, RenderError> {
    let mut out = String::new();
    for item in items {
        let mut data = TemplateData::new();
        data.set_all(item);
        out.push_str(&state.templates.render(template, &data)?);
    }
    Ok(out)
}
