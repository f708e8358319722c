//! Book reviews. The per-book list is public; mutations are scoped to the
//! logged-in author.

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use shelfmark_core::forms::ReviewForm;
use shelfmark_core::types::DbId;
use shelfmark_db::repositories::ReviewRepo;

use super::{render_invalid, render_items, render_page, set_form_errors, DeleteForm};
use crate::error::AppResult;
use crate::htmx::{HxLocation, HxTrigger, EVENT_UPDATE_REVIEWS};
use crate::render::TemplateData;
use crate::session::{AuthUser, MaybeAuthUser};
use crate::state::AppState;

/// Reviews shown in the recent widget.
const RECENT_LIMIT: i64 = 2;

/// `GET /books/{id}/reviews` — all reviews for one book with author names.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(book_id): Path<DbId>,
) -> AppResult<Html<String>> {
    let reviews = ReviewRepo::list(&state.pool, book_id).await?;

    let mut data = TemplateData::new();
    data.set("book_id", book_id);
    data.set_html("reviews", render_items(&state, "review_item", &reviews)?);
    render_page(&state, &headers, "reviews_list", "Reviews", data)
}

/// `GET /books/{id}/reviews/add` — empty review form.
pub async fn add_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    _user: AuthUser,
    Path(book_id): Path<DbId>,
) -> AppResult<Html<String>> {
    let form = ReviewForm {
        book_id,
        ..Default::default()
    };
    let action = format!("/books/{book_id}/reviews");
    render_page(&state, &headers, "review_form", "Add Review", review_form_data(&form, &action))
}

/// `POST /books/{id}/reviews` — create a review; the page refreshes the
/// reviews list off the triggered event.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
    Path(book_id): Path<DbId>,
    Form(mut form): Form<ReviewForm>,
) -> AppResult<Response> {
    form.book_id = book_id;
    form.validate();
    if !form.errors.is_valid() {
        let action = format!("/books/{book_id}/reviews");
        return render_invalid(
            &state,
            &headers,
            "review_form",
            "Add Review",
            review_form_data(&form, &action),
        );
    }

    ReviewRepo::create(&state.pool, user.user_id, book_id, form.rating, &form.review_text)
        .await?;
    Ok(HxTrigger(EVENT_UPDATE_REVIEWS).into_response())
}

/// `GET /reviews/{id}/edit` — edit form pre-filled from the stored review.
pub async fn edit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Html<String>> {
    let review = ReviewRepo::retrieve(&state.pool, id, user.user_id).await?;

    let form = ReviewForm {
        id: review.id,
        book_id: review.book_id,
        rating: review.rating,
        review_text: review.review_text,
        ..Default::default()
    };
    let action = format!("/reviews/{id}");
    render_page(&state, &headers, "review_form", "Edit Review", review_form_data(&form, &action))
}

/// `POST /reviews/{id}` — update one of the caller's reviews, then swap the
/// browser back to the book page.
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
    Path(id): Path<DbId>,
    Form(mut form): Form<ReviewForm>,
) -> AppResult<Response> {
    form.validate();
    if !form.errors.is_valid() {
        let action = format!("/reviews/{id}");
        return render_invalid(
            &state,
            &headers,
            "review_form",
            "Edit Review",
            review_form_data(&form, &action),
        );
    }

    ReviewRepo::update(&state.pool, id, user.user_id, form.rating, &form.review_text).await?;
    Ok(HxLocation::to(format!("/books/{}", form.book_id)).into_response())
}

/// `POST /reviews/delete`
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<DeleteForm>,
) -> AppResult<Response> {
    ReviewRepo::delete(&state.pool, form.id, user.user_id).await?;
    Ok(HxTrigger(EVENT_UPDATE_REVIEWS).into_response())
}

/// `GET /reviews/count` — plain-text per-user count; 204 when anonymous.
pub async fn count(State(state): State<AppState>, user: MaybeAuthUser) -> AppResult<Response> {
    match user.0 {
        Some(user) => {
            let count = ReviewRepo::count(&state.pool, user.user_id).await?;
            Ok(count.to_string().into_response())
        }
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// `GET /reviews/recent` — recent-reviews fragment with book titles.
pub async fn recent(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Html<String>> {
    let reviews = ReviewRepo::recent(&state.pool, RECENT_LIMIT).await?;

    let mut data = TemplateData::new();
    data.set_html("reviews", render_items(&state, "recent_review_item", &reviews)?);
    render_page(&state, &headers, "recent_reviews", "Recent Reviews", data)
}

fn review_form_data(form: &ReviewForm, action: &str) -> TemplateData {
    let mut data = TemplateData::new();
    data.set("action", action);
    data.set("id", form.id);
    data.set("book_id", form.book_id);
    data.set("rating", form.rating);
    data.set("review_text", &form.review_text);
    set_form_errors(&mut data, &form.errors);
    data
}
