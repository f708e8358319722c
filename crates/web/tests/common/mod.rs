//! Shared helpers for HTTP-level tests: an app instance backed by a test
//! pool, plus request builders for forms and multipart bodies.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use shelfmark_web::config::ServerConfig;
use shelfmark_web::render::TemplateEngine;
use shelfmark_web::router;
use shelfmark_web::state::AppState;

pub const MULTIPART_BOUNDARY: &str = "------------------------shelfmarktest";

/// Build the full application router against a test pool. The returned
/// `TempDir` owns the upload directory and must stay alive for the test.
pub fn test_app(pool: SqlitePool) -> (Router, tempfile::TempDir) {
    let upload_dir = tempfile::tempdir().expect("create upload dir");

    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: String::new(),
        upload_dir: upload_dir.path().to_str().expect("utf-8 path").to_string(),
        template_dir: "templates".into(),
        request_timeout_secs: 30,
        session_ttl_hours: 12,
    };

    let templates = TemplateEngine::load(&config.template_dir).expect("load templates");

    let state = AppState {
        pool,
        config: Arc::new(config),
        templates: Arc::new(templates),
    };
    (router::build(state), upload_dir)
}

/// Percent-encode a form value (enough for test inputs).
fn form_encode(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// `application/x-www-form-urlencoded` body from key/value pairs.
pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={}", form_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A multipart/form-data body with text fields and an optional file part.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"image_upload\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST a form-encoded body, optionally with a session cookie.
pub async fn post_form(
    app: &Router,
    path: &str,
    fields: &[(&str, &str)],
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder
        .body(Body::from(form_body(fields)))
        .expect("build request");
    app.clone().oneshot(request).await.expect("request")
}

/// POST a multipart body, optionally with a session cookie.
pub async fn post_multipart(
    app: &Router,
    path: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
    cookie: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method("POST").uri(path).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder
        .body(Body::from(multipart_body(fields, file)))
        .expect("build request");
    app.clone().oneshot(request).await.expect("request")
}

/// GET a path, optionally as an htmx fragment request and/or with a cookie.
pub async fn get(app: &Router, path: &str, htmx: bool, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if htmx {
        builder = builder.header("HX-Request", "true");
    }
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = builder.body(Body::empty()).expect("build request");
    app.clone().oneshot(request).await.expect("request")
}

/// Collect a response body to a string.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Register an account and log in, returning the session cookie pair
/// (`name=value`) to send on subsequent requests.
pub async fn register_and_login(app: &Router, username: &str) -> String {
    let email = format!("{username}@example.com");
    let response = post_form(
        app,
        "/register",
        &[
            ("username", username),
            ("email", &email),
            ("password", "correct horse battery"),
        ],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_form(
        app,
        "/login",
        &[
            ("username", username),
            ("password", "correct horse battery"),
        ],
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .expect("cookie header")
        .to_string();
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}
