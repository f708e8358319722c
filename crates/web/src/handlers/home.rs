//! Home page.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use shelfmark_db::models::user::UserProfile;
use shelfmark_db::repositories::{SessionRepo, UserRepo};

use super::render_page;
use crate::error::AppResult;
use crate::render::TemplateData;
use crate::session::MaybeAuthUser;
use crate::state::AppState;

/// `GET /` — landing page. The recent-books and recent-reviews widgets are
/// loaded as htmx fragments by the template itself.
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: MaybeAuthUser,
) -> AppResult<Html<String>> {
    let mut data = TemplateData::new();

    if let Some(user) = user.0 {
        if let Some(account) = UserRepo::find_by_id(&state.pool, user.user_id).await? {
            data.set_all(UserProfile::from(account));
        }
        if let Some(flash) = SessionRepo::pop_flash(&state.pool, user.session_id).await? {
            data.set("flash", flash);
        }
    }

    render_page(&state, &headers, "index", "Home", data)
}
