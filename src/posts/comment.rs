use axum::{
    Form, debug_handler,
    extract::{Path, State, rejection::FormRejection},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::debug;

use crate::{AppResult, BlogError, auth};

use super::{lifecycle, parse_post_id};

#[derive(Deserialize)]
pub(crate) struct CommentForm {
    #[serde(default)]
    text: String,
}

/// Adds a comment and always returns to the post, whether or not the text was valid.
#[debug_handler]
pub(crate) async fn add_comment(
    State(db_pool): State<SqlitePool>,
    session: Session,
    uri: Uri,
    Path(post_id): Path<String>,

    form: Result<Form<CommentForm>, FormRejection>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(auth::login_redirect(&uri));
    };
    let post_id = parse_post_id(&post_id)?;
    let text = form.map(|Form(CommentForm { text })| text).unwrap_or_default();

    match lifecycle::add_comment(&db_pool, &user, post_id, &text).await {
        Ok(_) => {}
        Err(err @ BlogError::Validation { .. }) => debug!(post_id, "comment rejected: {err}"),
        Err(err) => return Err(err.into()),
    }

    Ok(Redirect::to(&format!("/posts/{post_id}/")).into_response())
}
