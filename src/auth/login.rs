use axum::{
    Form, debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{AppResult, html, include_res};

use super::{authenticate, current_user, safe_next, start_session};

#[derive(Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

fn login_form(next: &str, username: &str, error: Option<&str>) -> Html<String> {
    let error = error
        .map(|message| format!(r#"<p class="errorlist">{}</p>"#, html::escape(message)))
        .unwrap_or_default();
    let form = html::fill(
        include_res!(str, "/pages/login.html"),
        &[
            ("next", &html::escape(next)),
            ("username", &html::escape(username)),
            ("error", &error),
        ],
    );
    Html(html::layout("Log in", None, &form))
}

#[debug_handler]
pub async fn login_page(
    Query(LoginQuery { next }): Query<LoginQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if current_user(&session, &db_pool).await?.is_some() {
        return Ok(Redirect::to(safe_next(next.as_deref())).into_response());
    }

    Ok(login_form(next.as_deref().unwrap_or_default(), "", None).into_response())
}

#[debug_handler]
pub async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(LoginForm { username, password, next }): Form<LoginForm>,
) -> AppResult<Response> {
    let username = username.trim();
    let Some(user) = authenticate(&db_pool, username, &password).await? else {
        info!(username, "failed login");
        return Ok(
            login_form(
                next.as_deref().unwrap_or_default(),
                username,
                Some("Please enter a correct username and password."),
            ).into_response()
        );
    };

    start_session(&session, &user).await?;
    Ok(Redirect::to(safe_next(next.as_deref())).into_response())
}
