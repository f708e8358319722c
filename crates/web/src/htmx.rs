//! Response helpers for the htmx request/response protocol.
//!
//! htmx marks its requests with `HX-Request: true`; handlers use that to
//! return a fragment instead of a full page. Mutations answer with either
//! an `HX-Trigger` event (the page re-fetches the affected list) or an
//! `HX-Location` client-side redirect that swaps the books pane in place.

use axum::http::{header::HeaderName, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");
pub const HX_LOCATION: HeaderName = HeaderName::from_static("hx-location");

/// Event name fired after note mutations.
pub const EVENT_UPDATE_NOTES: &str = "update-notes";
/// Event name fired after review mutations.
pub const EVENT_UPDATE_REVIEWS: &str = "update-reviews";

/// Whether the request came from htmx and wants a fragment.
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// 204 No Content carrying an `HX-Trigger` event.
pub struct HxTrigger(pub &'static str);

impl IntoResponse for HxTrigger {
    fn into_response(self) -> Response {
        (StatusCode::NO_CONTENT, [(HX_TRIGGER, self.0)]).into_response()
    }
}

/// Client-side redirect that swaps the books pane in place rather than
/// reloading the whole document.
pub struct HxLocation {
    pub path: String,
}

impl HxLocation {
    pub fn to(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl IntoResponse for HxLocation {
    fn into_response(self) -> Response {
        let location = json!({
            "path": self.path,
            "target": "#books-content",
            "swap": "innerHTML",
        });
        (StatusCode::OK, [(HX_LOCATION, location.to_string())]).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn detects_htmx_requests() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx_request(&headers));

        headers.insert(HX_REQUEST, HeaderValue::from_static("true"));
        assert!(is_htmx_request(&headers));

        // htmx sends "false" for history restores; that is not a fragment
        // request.
        headers.insert(HX_REQUEST, HeaderValue::from_static("false"));
        assert!(!is_htmx_request(&headers));
    }

    #[test]
    fn trigger_is_204_with_event() {
        let response = HxTrigger(EVENT_UPDATE_NOTES).into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers().get(HX_TRIGGER).unwrap(),
            "update-notes"
        );
    }

    #[test]
    fn location_carries_swap_instructions() {
        let response = HxLocation::to("/books/7").into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let header = response.headers().get(HX_LOCATION).unwrap().to_str().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(header).unwrap();
        assert_eq!(parsed["path"], "/books/7");
        assert_eq!(parsed["target"], "#books-content");
        assert_eq!(parsed["swap"], "innerHTML");
    }
}
