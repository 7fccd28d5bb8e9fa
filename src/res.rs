use axum::{debug_handler, http::{header, StatusCode}, response::{Html, IntoResponse}};

use crate::html;

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

#[debug_handler]
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        include_res!(bytes, "/style.css"),
    )
}

/// Fallback for every unmatched path.
#[debug_handler]
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, not_found_page())
}

pub(crate) fn not_found_page() -> Html<String> {
    Html(html::layout("Page not found", None, include_res!(str, "/pages/404.html")))
}
