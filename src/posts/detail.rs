use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, auth, db, html, include_res};

use super::parse_post_id;

#[debug_handler]
pub(crate) async fn post_detail(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post_id = parse_post_id(&post_id)?;
    let viewer = auth::current_user(&session, &db_pool).await?;
    let post = db::post_card(&db_pool, post_id).await?;
    let comments = db::comments_for(&db_pool, post_id).await?;

    let edit_link = match &viewer {
        Some(user) if user.username == post.author => {
            format!(r#"<a class="edit-link" href="/posts/{post_id}/edit/">Edit post</a>"#)
        }
        _ => String::new(),
    };
    let comment_form = match &viewer {
        Some(_) => html::fill(include_res!(str, "/pages/comment_form.html"), &[("id", &post_id.to_string())]),
        None => format!(r#"<p><a href="/auth/login/?next=/posts/{post_id}/">Log in</a> to leave a comment.</p>"#),
    };
    let comments = if comments.is_empty() {
        r#"<p class="empty">No comments yet.</p>"#.to_owned()
    } else {
        comments.iter().map(html::comment).collect::<Vec<_>>().join("\n")
    };

    let body = html::fill(
        include_res!(str, "/pages/post_detail.html"),
        &[
            ("post", &html::post_card(&post)),
            ("edit_link", &edit_link),
            ("comments", &comments),
            ("comment_form", &comment_form),
        ],
    );
    let title: String = post.text.chars().take(30).collect();

    Ok(Html(html::layout(&title, viewer.as_ref(), &body)).into_response())
}
