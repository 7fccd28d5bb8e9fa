use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::Uri,
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppResult, PageQuery, auth, db,
    feed::{self, Feed},
    follow, html,
};

/// Posts by every author the viewer follows.
#[debug_handler]
pub(crate) async fn follow_index(
    State(db_pool): State<SqlitePool>,
    session: Session,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(auth::login_redirect(&uri));
    };

    let feed = feed::compose(&db_pool, Feed::Following(&user), query.page.as_deref()).await?;
    let content = html::feed("<h1>Authors you follow</h1>", &feed.page.items, &feed.page.window);

    Ok(Html(html::layout("Following", Some(&user), &content)).into_response())
}

#[debug_handler]
pub(crate) async fn profile_follow(
    State(db_pool): State<SqlitePool>,
    session: Session,
    uri: Uri,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(auth::login_redirect(&uri));
    };
    let author = db::user_by_username(&db_pool, &username).await?;

    follow::follow(&db_pool, &user, &author).await?;
    Ok(Redirect::to(&html::profile_path(&author.username)).into_response())
}

#[debug_handler]
pub(crate) async fn profile_unfollow(
    State(db_pool): State<SqlitePool>,
    session: Session,
    uri: Uri,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &db_pool).await? else {
        return Ok(auth::login_redirect(&uri));
    };
    let author = db::user_by_username(&db_pool, &username).await?;

    follow::unfollow(&db_pool, &user, &author).await?;
    Ok(Redirect::to(&html::profile_path(&author.username)).into_response())
}
