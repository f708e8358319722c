//! Book catalog: paginated listing, search, CRUD with cover upload.

use axum::extract::{Form, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use shelfmark_core::forms::BookForm;
use shelfmark_core::types::DbId;
use shelfmark_db::error::StoreError;
use shelfmark_db::models::book::BookInput;
use shelfmark_db::repositories::BookRepo;

use super::{render_invalid, render_items, render_page, set_form_errors, DeleteForm};
use crate::error::AppResult;
use crate::htmx::HxLocation;
use crate::render::TemplateData;
use crate::session::{AuthUser, MaybeAuthUser};
use crate::state::AppState;
use crate::upload::{decode_book_form, is_allowed_image, remove_image, store_image, UploadedFile};

/// Books shown per catalog page.
const PAGE_SIZE: i64 = 8;
/// Books shown in the recent widget.
const RECENT_LIMIT: i64 = 2;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    search: String,
}

/// `GET /books?page=N` — one catalog page. Out-of-range pages clamp to the
/// last valid page.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> AppResult<Html<String>> {
    let page = BookRepo::list(&state.pool, query.page, PAGE_SIZE).await?;

    let mut data = TemplateData::new();
    data.set_html("books", render_items(&state, "book_card", &page.books)?);
    data.set("page", page.page);
    data.set("total_pages", page.total_pages);
    data.set("total", page.total);

    render_page(&state, &headers, "books", "Books", data)
}

/// `GET /books/search?search=T` — filtered catalog fragment. Matches the
/// term against titles, note text, and review text.
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> AppResult<Html<String>> {
    let books = BookRepo::filter(&state.pool, query.search.trim()).await?;

    let mut data = TemplateData::new();
    data.set_html("books", render_items(&state, "book_card", &books)?);
    render_page(&state, &headers, "book_list", "Search", data)
}

/// `GET /books/count` — plain-text total.
pub async fn count(State(state): State<AppState>) -> AppResult<String> {
    Ok(BookRepo::count(&state.pool).await?.to_string())
}

/// `GET /books/recent` — recent-books fragment.
pub async fn recent(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Html<String>> {
    let books = BookRepo::recent(&state.pool, RECENT_LIMIT).await?;

    let mut data = TemplateData::new();
    data.set_html("books", render_items(&state, "book_card", &books)?);
    render_page(&state, &headers, "recent_books", "Recent Books", data)
}

/// `GET /books/finished-count` — plain-text per-user count; 204 for
/// anonymous visitors so the widget renders nothing.
pub async fn finished_count(
    State(state): State<AppState>,
    user: MaybeAuthUser,
) -> AppResult<Response> {
    match user.0 {
        Some(user) => {
            let count = BookRepo::count_finished(&state.pool, user.user_id).await?;
            Ok(count.to_string().into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// `GET /books/{id}` — detail page.
pub async fn detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let book = BookRepo::retrieve(&state.pool, id).await?;

    let title = book.title.clone();
    let mut data = TemplateData::new();
    data.set_all(&book);
    render_page(&state, &headers, "book_detail", &title, data)
}

/// `GET /books/add` — empty create form.
pub async fn add_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    _user: AuthUser,
) -> AppResult<Html<String>> {
    let mut form = BookForm::default();
    form.status = "want_to_read".into();
    render_page(&state, &headers, "book_form", "Add Book", book_form_data(&form, "/books"))
}

/// `GET /books/{id}/edit` — edit form pre-filled from the stored book.
pub async fn edit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let book = BookRepo::retrieve(&state.pool, id).await?;

    let form = BookForm {
        id: book.id,
        title: book.title,
        author: book.author,
        isbn: book.isbn,
        publication_year: book.publication_year,
        status: book.status.unwrap_or_else(|| "want_to_read".into()),
        current_image_url: book.image_url.unwrap_or_default(),
        ..Default::default()
    };
    let action = format!("/books/{id}");
    render_page(&state, &headers, "book_form", "Edit Book", book_form_data(&form, &action))
}

/// `POST /books` — create a book (multipart, optional cover image).
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let (mut form, file) = decode_book_form(multipart).await?;
    if form.status.is_empty() {
        form.status = "want_to_read".into();
    }
    check_image(&mut form, &file);
    form.validate();

    if !form.errors.is_valid() {
        return render_invalid(
            &state,
            &headers,
            "book_form",
            "Add Book",
            book_form_data(&form, "/books"),
        );
    }

    form.image_url = match &file {
        Some(f) => store_image(&state.config.upload_dir, f).await?,
        None => form.current_image_url.clone(),
    };

    match BookRepo::create(&state.pool, &book_input(&form), user.user_id).await {
        Ok(id) => Ok(HxLocation::to(format!("/books/{id}")).into_response()),
        Err(StoreError::DuplicateIsbn) => {
            form.errors
                .add_field_error("isbn", "This ISBN is already registered.");
            render_invalid(
                &state,
                &headers,
                "book_form",
                "Add Book",
                book_form_data(&form, "/books"),
            )
        }
        Err(other) => Err(other.into()),
    }
}

/// `POST /books/{id}` — update a book (multipart). A freshly accepted cover
/// replaces the old file; the old file's removal is best-effort.
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    _user: AuthUser,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Response> {
    let old = BookRepo::retrieve(&state.pool, id).await?;

    let (mut form, file) = decode_book_form(multipart).await?;
    form.id = id;
    if form.status.is_empty() {
        form.status = "want_to_read".into();
    }
    check_image(&mut form, &file);
    form.validate();

    let action = format!("/books/{id}");
    if !form.errors.is_valid() {
        return render_invalid(
            &state,
            &headers,
            "book_form",
            "Edit Book",
            book_form_data(&form, &action),
        );
    }

    form.image_url = match &file {
        Some(f) => store_image(&state.config.upload_dir, f).await?,
        None => form.current_image_url.clone(),
    };

    match BookRepo::update(&state.pool, id, &book_input(&form)).await {
        Ok(()) => {
            if let Some(old_url) = old.image_url.as_deref() {
                if file.is_some() && old_url != form.image_url {
                    remove_image(&state.config.upload_dir, old_url).await;
                }
            }
            Ok(HxLocation::to(action).into_response())
        }
        Err(StoreError::DuplicateIsbn) => {
            form.errors
                .add_field_error("isbn", "This ISBN is already registered.");
            render_invalid(
                &state,
                &headers,
                "book_form",
                "Edit Book",
                book_form_data(&form, &action),
            )
        }
        Err(other) => Err(other.into()),
    }
}

/// `POST /books/delete` — delete one of the caller's books and its stored
/// cover image.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<DeleteForm>,
) -> AppResult<Response> {
    let book = BookRepo::retrieve(&state.pool, form.id).await?;
    BookRepo::delete(&state.pool, form.id, user.user_id).await?;

    if let Some(image_url) = book.image_url.as_deref() {
        remove_image(&state.config.upload_dir, image_url).await;
    }

    Ok(HxLocation::to("/books").into_response())
}

/// Reject a posted cover whose MIME type is not on the allow list. Nothing
/// is written to disk for a rejected file.
fn check_image(form: &mut BookForm, file: &Option<UploadedFile>) {
    if let Some(file) = file {
        if !is_allowed_image(&file.content_type) {
            form.errors
                .add_non_field_error("Cover image must be a JPEG or PNG file");
        }
    }
}

fn book_form_data(form: &BookForm, action: &str) -> TemplateData {
    let mut data = TemplateData::new();
    data.set("action", action);
    data.set("id", form.id);
    data.set("title", &form.title);
    data.set("author", &form.author);
    data.set("isbn", &form.isbn);
    data.set("publication_year", form.publication_year);
    data.set("status", &form.status);
    data.set("current_image_url", &form.current_image_url);
    set_form_errors(&mut data, &form.errors);
    data
}

fn book_input(form: &BookForm) -> BookInput {
    BookInput {
        title: form.title.clone(),
        author: form.author.clone(),
        isbn: form.isbn.clone(),
        publication_year: form.publication_year,
        status: form.status.clone(),
        image_url: form.image_url.clone(),
    }
}
