use axum::{
    Form, debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, BlogError, html, include_res};

use super::{create_user, current_user, start_session};

#[derive(Deserialize)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

fn signup_form(username: &str, error: Option<&str>) -> Html<String> {
    let error = error
        .map(|message| format!(r#"<p class="errorlist">{}</p>"#, html::escape(message)))
        .unwrap_or_default();
    let form = html::fill(
        include_res!(str, "/pages/signup.html"),
        &[("username", &html::escape(username)), ("error", &error)],
    );
    Html(html::layout("Sign up", None, &form))
}

#[debug_handler]
pub async fn signup_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if current_user(&session, &db_pool).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(signup_form("", None).into_response())
}

#[debug_handler]
pub async fn signup(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(SignupForm { username, password, password_confirm }): Form<SignupForm>,
) -> AppResult<Response> {
    let username = username.trim();
    if password != password_confirm {
        return Ok(signup_form(username, Some("The two password fields didn't match.")).into_response());
    }

    match create_user(&db_pool, username, &password).await {
        Ok(user) => {
            start_session(&session, &user).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(BlogError::Validation { message, .. }) => {
            Ok(signup_form(username, Some(&message)).into_response())
        }
        Err(err) => Err(err.into()),
    }
}
