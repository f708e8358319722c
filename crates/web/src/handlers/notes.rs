//! Per-user book notes. Every read and mutation is scoped to the
//! logged-in user; other users' notes are invisible.

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use shelfmark_core::forms::NoteForm;
use shelfmark_core::types::DbId;
use shelfmark_db::repositories::NoteRepo;

use super::{render_invalid, render_items, render_page, set_form_errors, DeleteForm};
use crate::error::AppResult;
use crate::htmx::{HxTrigger, EVENT_UPDATE_NOTES};
use crate::render::TemplateData;
use crate::session::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// `GET /books/{id}/notes` — the caller's notes for one book. Anonymous
/// visitors get an empty list.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: MaybeAuthUser,
    Path(book_id): Path<DbId>,
) -> AppResult<Html<String>> {
    let notes = match user.0 {
        Some(user) => NoteRepo::list(&state.pool, book_id, user.user_id).await?,
        None => Vec::new(),
    };

    let mut data = TemplateData::new();
    data.set("book_id", book_id);
    data.set_html("notes", render_items(&state, "note_item", &notes)?);
    render_page(&state, &headers, "notes_list", "Notes", data)
}

/// `GET /books/{id}/notes/add` — empty note form.
pub async fn add_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    _user: AuthUser,
    Path(book_id): Path<DbId>,
) -> AppResult<Html<String>> {
    let form = NoteForm {
        book_id,
        ..Default::default()
    };
    let action = format!("/books/{book_id}/notes");
    render_page(&state, &headers, "note_form", "Add Note", note_form_data(&form, &action))
}

/// `POST /books/{id}/notes` — create a note; the page refreshes the notes
/// list off the triggered event.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
    Path(book_id): Path<DbId>,
    Form(mut form): Form<NoteForm>,
) -> AppResult<Response> {
    form.book_id = book_id;
    form.validate();
    if !form.errors.is_valid() {
        let action = format!("/books/{book_id}/notes");
        return render_invalid(
            &state,
            &headers,
            "note_form",
            "Add Note",
            note_form_data(&form, &action),
        );
    }

    NoteRepo::create(&state.pool, user.user_id, book_id, &form.note_text, form.page_number)
        .await?;
    Ok(HxTrigger(EVENT_UPDATE_NOTES).into_response())
}

/// `GET /notes/{id}/edit` — edit form pre-filled from the stored note.
pub async fn edit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let note = NoteRepo::retrieve(&state.pool, id, user.user_id).await?;

    let form = NoteForm {
        id: note.id,
        book_id: note.book_id,
        note_text: note.note_text,
        page_number: note.page_number,
        ..Default::default()
    };
    let action = format!("/notes/{id}");
    render_page(&state, &headers, "note_form", "Edit Note", note_form_data(&form, &action))
}

/// `POST /notes/{id}` — update one of the caller's notes.
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
    Path(id): Path<DbId>,
    Form(mut form): Form<NoteForm>,
) -> AppResult<Response> {
    form.validate();
    if !form.errors.is_valid() {
        let action = format!("/notes/{id}");
        return render_invalid(
            &state,
            &headers,
            "note_form",
            "Edit Note",
            note_form_data(&form, &action),
        );
    }

    NoteRepo::update(&state.pool, id, user.user_id, &form.note_text, form.page_number).await?;
    Ok(HxTrigger(EVENT_UPDATE_NOTES).into_response())
}

/// `POST /notes/delete`
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<DeleteForm>,
) -> AppResult<Response> {
    NoteRepo::delete(&state.pool, form.id, user.user_id).await?;
    Ok(HxTrigger(EVENT_UPDATE_NOTES).into_response())
}

/// `GET /notes/count` — plain-text per-user count; 204 when anonymous.
pub async fn count(State(state): State<AppState>, user: MaybeAuthUser) -> AppResult<Response> {
    match user.0 {
        Some(user) => {
            let count = NoteRepo::count(&state.pool, user.user_id).await?;
            Ok(count.to_string().into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

fn note_form_data(form: &NoteForm, action: &str) -> TemplateData {
    let mut data = TemplateData::new();
    data.set("action", action);
    data.set("id", form.id);
    data.set("book_id", form.book_id);
    data.set("note_text", &form.note_text);
    data.set("page_number", form.page_number);
    set_form_errors(&mut data, &form.errors);
    data
}
