//! Route table and middleware stack.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{auth, books, home, notes, reviews};
use crate::state::AppState;

/// Cap on the whole multipart body for book submissions (cover image
/// included).
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Build the application router with the full middleware stack.
pub fn build(state: AppState) -> Router {
    let upload_dir = state.config.upload_dir.clone();
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/", get(home::index))
        // Auth.
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", get(auth::register_page).post(auth::register))
        // Books. Static segments are registered alongside `{id}`; the
        // router prefers the static match.
        .route("/books", get(books::list).post(books::create))
        .route("/books/add", get(books::add_form))
        .route("/books/search", get(books::search))
        .route("/books/count", get(books::count))
        .route("/books/recent", get(books::recent))
        .route("/books/finished-count", get(books::finished_count))
        .route("/books/delete", post(books::delete))
        .route("/books/{id}", get(books::detail).post(books::update))
        .route("/books/{id}/edit", get(books::edit_form))
        // Notes.
        .route("/books/{id}/notes", get(notes::list).post(notes::create))
        .route("/books/{id}/notes/add", get(notes::add_form))
        .route("/notes/{id}", post(notes::update))
        .route("/notes/{id}/edit", get(notes::edit_form))
        .route("/notes/delete", post(notes::delete))
        .route("/notes/count", get(notes::count))
        // Reviews.
        .route("/books/{id}/reviews", get(reviews::list).post(reviews::create))
        .route("/books/{id}/reviews/add", get(reviews::add_form))
        .route("/reviews/{id}", post(reviews::update))
        .route("/reviews/{id}/edit", get(reviews::edit_form))
        .route("/reviews/delete", post(reviews::delete))
        .route("/reviews/count", get(reviews::count))
        .route("/reviews/recent", get(reviews::recent))
        // Uploaded cover images.
        .nest_service("/uploads", ServeDir::new(upload_dir))
        // -- Middleware stack (applied bottom-up) --
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
