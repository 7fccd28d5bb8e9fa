mod comment;
mod detail;
mod edit;
mod form;
pub mod lifecycle;
mod new;

use axum::{Router, routing::{get, post}};

use crate::{AppState, BlogError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create/", get(new::new_post_page).post(new::new_post))
        .route("/posts/{post_id}/", get(detail::post_detail))
        .route("/posts/{post_id}/edit/", get(edit::edit_post_page).post(edit::edit_post))
        .route("/posts/{post_id}/comment/", post(comment::add_comment))
}

/// Post ids in paths are positive integers; anything else names no post.
pub(crate) fn parse_post_id(raw: &str) -> Result<i64, BlogError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(BlogError::NotFound)
}
