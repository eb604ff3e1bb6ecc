pub mod app;
pub mod auth;
pub mod link;
pub mod metrics;

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};

/// Redirect after a successful form post.
///
/// HTMX requests get `HX-Redirect` so the client navigates the whole page.
pub fn redirect(headers: &HeaderMap, to: &str) -> Response {
    if !headers.contains_key("hx-request") {
        return Redirect::to(to).into_response();
    }

    let mut response = StatusCode::OK.into_response();
    if let Ok(location) = HeaderValue::from_str(to) {
        response.headers_mut().insert("HX-Redirect", location);
    }
    response
}
