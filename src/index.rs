use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use tower_sessions::Session;

use crate::{AppResult, AppState, BlogError, PageQuery, auth, feed::{self, Feed}, html, pager};

/// Cache key of one rendered index page for one viewer.
pub fn cache_key(viewer_id: Option<i64>, page: Option<&str>) -> String {
    let viewer = viewer_id.map_or_else(|| "anon".to_owned(), |id| id.to_string());
    format!("index_page:{viewer}:{}", pager::page_key(page))
}

/// The global feed. Rendered pages are reused until the cache entry expires.
#[debug_handler(state = AppState)]
pub async fn index(
    State(app_state): State<AppState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let viewer = auth::current_user(&session, &app_state.db_pool).await?;
    let key = cache_key(viewer.as_ref().map(|user| user.id), query.page.as_deref());

    let (db_pool, page, viewer) = (&app_state.db_pool, query.page.as_deref(), viewer.as_ref());
    let body = app_state.page_cache
        .get_or_render(&key, || async move {
            let feed = feed::compose(db_pool, Feed::Global, page).await?;
            let content = html::feed("<h1>Latest posts</h1>", &feed.page.items, &feed.page.window);
            Ok::<_, BlogError>(html::layout("Latest posts", viewer, &content))
        })
        .await?;

    Ok(Html(body).into_response())
}
