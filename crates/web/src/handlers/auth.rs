//! Registration, login, and logout.

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use shelfmark_core::forms::{LoginForm, RegisterForm};
use shelfmark_db::error::StoreError;
use shelfmark_db::repositories::{SessionRepo, UserRepo};

use super::{render_invalid, render_page, set_form_errors};
use crate::error::AppResult;
use crate::render::TemplateData;
use crate::session::{destroy_session, removal_cookie, start_session};
use crate::state::AppState;

/// `GET /login`
pub async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Html<String>> {
    render_page(&state, &headers, "login", "Login", TemplateData::new())
}

/// `POST /login` — authenticate and start a fresh session.
///
/// Unknown username and wrong password produce the same non-field error;
/// the login page never reveals whether an account exists.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(mut form): Form<LoginForm>,
) -> AppResult<Response> {
    form.validate();
    if !form.errors.is_valid() {
        return render_invalid(&state, &headers, "login", "Login", login_data(&form));
    }

    match UserRepo::authenticate(&state.pool, &form.username, &form.password).await {
        Ok(user_id) => {
            let (cookie, session_id) = start_session(&state, user_id).await?;
            SessionRepo::set_flash(&state.pool, session_id, "You've been logged in successfully!")
                .await?;
            Ok((jar.add(cookie), Redirect::to("/")).into_response())
        }
        Err(StoreError::InvalidCredentials) => {
            form.errors
                .add_non_field_error("Username or password is incorrect");
            render_invalid(&state, &headers, "login", "Login", login_data(&form))
        }
        Err(other) => Err(other.into()),
    }
}

/// `POST /logout` — delete the session row and clear the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> AppResult<Response> {
    destroy_session(&state, &jar).await?;
    let jar = jar.remove(removal_cookie());
    Ok((jar, Redirect::to("/")).into_response())
}

/// `GET /register`
pub async fn register_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Html<String>> {
    render_page(&state, &headers, "register", "Register", TemplateData::new())
}

/// `POST /register` — create the account and land on the login page with a
/// one-shot success message.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(mut form): Form<RegisterForm>,
) -> AppResult<Response> {
    form.validate();
    if !form.errors.is_valid() {
        return render_invalid(&state, &headers, "register", "Register", register_data(&form));
    }

    match UserRepo::create(&state.pool, &form.username, &form.email, &form.password).await {
        Ok(_) => {
            let mut data = TemplateData::new();
            data.set("flash", "Your registration was successful. Please log in.");
            Ok(render_page(&state, &headers, "login", "Login", data)?.into_response())
        }
        Err(StoreError::DuplicateUsername) => {
            form.errors.add_field_error("username", "Username is already in use");
            render_invalid(&state, &headers, "register", "Register", register_data(&form))
        }
        Err(StoreError::DuplicateEmail) => {
            form.errors
                .add_field_error("email", "Email address is already in use");
            render_invalid(&state, &headers, "register", "Register", register_data(&form))
        }
        Err(other) => Err(other.into()),
    }
}

fn login_data(form: &LoginForm) -> TemplateData {
    let mut data = TemplateData::new();
    data.set("username", &form.username);
    set_form_errors(&mut data, &form.errors);
    data
}

fn register_data(form: &RegisterForm) -> TemplateData {
    let mut data = TemplateData::new();
    data.set("username", &form.username);
    data.set("email", &form.email);
    set_form_errors(&mut data, &form.errors);
    data
}
