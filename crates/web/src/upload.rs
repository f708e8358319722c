//! Multipart decoding for the book form and cover-image storage.
//!
//! An uploaded image is buffered in memory (the whole multipart body is
//! capped at 5 MiB by the router) and only written to disk after the form
//! has validated, so a rejected submission leaves no file behind.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::Multipart;
use shelfmark_core::forms::validate::valid_number;
use shelfmark_core::forms::BookForm;

use crate::error::AppError;

/// MIME types accepted for cover images.
const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// An image file buffered out of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Whether the uploaded content type is an accepted cover-image format.
pub fn is_allowed_image(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// Decode the book create/update multipart body into a [`BookForm`] plus
/// the optional cover image.
///
/// An `image_upload` part with no filename or no bytes (the browser sends
/// one for an untouched file input) decodes as `None`. A non-numeric
/// publication year is recorded as a field error rather than failing the
/// decode.
pub async fn decode_book_form(
    mut multipart: Multipart,
) -> Result<(BookForm, Option<UploadedFile>), AppError> {
    let mut form = BookForm::default();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image_upload" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if !filename.is_empty() && !bytes.is_empty() {
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        match name.as_str() {
            "id" => form.id = text.trim().parse().unwrap_or_default(),
            "title" => form.title = text,
            "author" => form.author = text,
            "isbn" => form.isbn = text,
            "publication_year" => {
                let trimmed = text.trim();
                if valid_number(trimmed) {
                    form.publication_year = trimmed.parse().unwrap_or_default();
                } else if !trimmed.is_empty() {
                    form.errors
                        .add_field_error("publication_year", "This field must be a number");
                }
            }
            "status" => form.status = text,
            "current_image_url" => form.current_image_url = text,
            _ => {}
        }
    }

    Ok((form, file))
}

/// Write an accepted image to the upload directory and return the URL path
/// (`/uploads/{name}`) to store on the book.
///
/// The stored name prefixes the original filename with a nanosecond
/// timestamp, so two uploads of the same file never collide.
pub async fn store_image(upload_dir: &str, file: &UploadedFile) -> Result<String, AppError> {
    // Strip any client-supplied directory components.
    let original = Path::new(&file.filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .as_nanos();
    let stored_name = format!("{nanos}-{original}");

    let path = PathBuf::from(upload_dir).join(&stored_name);
    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload: {e}")))?;

    Ok(format!("/uploads/{stored_name}"))
}

/// Best-effort removal of a previously stored image. Only URLs under
/// `/uploads/` are touched; failure is logged and never fails the request.
pub async fn remove_image(upload_dir: &str, image_url: &str) {
    let Some(stored_name) = image_url.strip_prefix("/uploads/") else {
        return;
    };
    let path = PathBuf::from(upload_dir).join(stored_name);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(image_url, error = %e, "Failed to remove replaced image");
    }
}
