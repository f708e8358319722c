//! Per-operation form types and the shared validation error accumulator.
//!
//! Each form holds the decoded field values plus a [`Validator`] that
//! collects field-level and form-level errors. Handlers call `validate()`
//! and then branch on `errors.is_valid()`; the validator is re-rendered
//! into the form template when validation fails.

pub mod validate;

use serde::Deserialize;

use crate::types::DbId;
use validate::{matches, max_number, min_chars, not_blank, permitted_value, EMAIL_RX};

/// Reading statuses a tracked book may be in.
pub const BOOK_STATUSES: [&str; 3] = ["want_to_read", "reading", "finished"];

/// Accumulates validation errors for a single form submission.
///
/// Field errors keep insertion order and the first error recorded for a
/// field wins; later errors for the same key are silently dropped.
/// Non-field errors always append, in order.
#[derive(Debug, Default, Clone)]
pub struct Validator {
    field_errors: Vec<(String, String)>,
    non_field_errors: Vec<String>,
}

impl Validator {
    /// True iff no field or non-field errors have been recorded.
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Record an error for a field unless that field already has one.
    pub fn add_field_error(&mut self, key: &str, message: &str) {
        if !self.field_errors.iter().any(|(k, _)| k == key) {
            self.field_errors.push((key.to_string(), message.to_string()));
        }
    }

    /// Record a form-level error. Always appends.
    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    /// Record a field error when `ok` is false.
    pub fn check_field(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_field_error(key, message);
        }
    }

    /// The error recorded for `key`, if any.
    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, m)| m.as_str())
    }

    pub fn field_errors(&self) -> &[(String, String)] {
        &self.field_errors
    }

    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }
}

/// Login credentials.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(skip)]
    pub errors: Validator,
}

impl LoginForm {
    pub fn validate(&mut self) {
        self.errors
            .check_field(not_blank(&self.username), "username", "This field is required");
        self.errors
            .check_field(not_blank(&self.password), "password", "This field is required");
    }
}

/// New-account registration input.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(skip)]
    pub errors: Validator,
}

impl RegisterForm {
    pub fn validate(&mut self) {
        self.errors
            .check_field(not_blank(&self.username), "username", "This field is required");
        self.errors
            .check_field(not_blank(&self.email), "email", "This field is required");
        self.errors.check_field(
            matches(&self.email, &EMAIL_RX),
            "email",
            "The email address is not valid.",
        );
        self.errors
            .check_field(not_blank(&self.password), "password", "This field is required");
        self.errors.check_field(
            min_chars(&self.password, 8),
            "password",
            "Password must be at least 8 characters.",
        );
    }
}

/// Book create/update input. The image URL fields are populated by the
/// upload step, not decoded from the form body.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub id: DbId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub publication_year: i64,
    #[serde(default)]
    pub status: String,
    #[serde(skip)]
    pub image_url: String,
    #[serde(skip)]
    pub current_image_url: String,
    #[serde(skip)]
    pub errors: Validator,
}

impl BookForm {
    pub fn validate(&mut self) {
        self.errors
            .check_field(not_blank(&self.title), "title", "Title is required");
        self.errors
            .check_field(not_blank(&self.author), "author", "Author is required");
        self.errors
            .check_field(not_blank(&self.isbn), "isbn", "ISBN is required");
        self.errors.check_field(
            permitted_value(&self.status.as_str(), &BOOK_STATUSES),
            "status",
            "Invalid reading status",
        );
    }
}

/// Note create/update input. The page number is deliberately
/// unconstrained; negative values pass validation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub id: DbId,
    #[serde(default)]
    pub book_id: DbId,
    #[serde(default)]
    pub note_text: String,
    #[serde(default)]
    pub page_number: i64,
    #[serde(skip)]
    pub errors: Validator,
}

impl NoteForm {
    pub fn validate(&mut self) {
        self.errors
            .check_field(not_blank(&self.note_text), "note_text", "Note text is required");
    }
}

/// Review create/update input. Only the upper rating bound is checked;
/// zero and negative ratings pass (kept as documented behavior).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub id: DbId,
    #[serde(default)]
    pub book_id: DbId,
    #[serde(default)]
    pub rating: i64,
    #[serde(default)]
    pub review_text: String,
    #[serde(skip)]
    pub errors: Validator,
}

impl ReviewForm {
    pub fn validate(&mut self) {
        self.errors.check_field(
            max_number(self.rating, 5),
            "rating",
            "Rating must be a number between 1 and 5",
        );
        self.errors
            .check_field(not_blank(&self.review_text), "review_text", "Review text is required");
    }
}
