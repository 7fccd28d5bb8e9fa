use axum::{
    Router, debug_handler,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppResult, AppState, PageQuery, auth,
    feed::{self, Feed, FeedOwner},
    html, include_res,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/{slug}/", get(group_posts))
}

#[debug_handler]
pub async fn group_posts(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let viewer = auth::current_user(&session, &db_pool).await?;
    let feed = feed::compose(&db_pool, Feed::Group(&slug), query.page.as_deref()).await?;

    let FeedOwner::Group(group) = &feed.owner else {
        return Err(anyhow::anyhow!("group feed resolved to {:?}", feed.owner).into());
    };
    let heading = html::fill(
        include_res!(str, "/pages/group_header.html"),
        &[("title", &html::escape(&group.title)), ("description", &html::escape(&group.description))],
    );
    let content = html::feed(&heading, &feed.page.items, &feed.page.window);

    Ok(Html(html::layout(&group.title, viewer.as_ref(), &content)).into_response())
}
