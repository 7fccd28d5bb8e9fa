use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    AppResult, PageQuery, auth,
    db::User,
    feed::{self, Feed, FeedOwner},
    follow, html, include_res,
};

fn follow_button(author: &User, following: bool) -> String {
    let (action, label, class) = if following {
        ("unfollow", "Unfollow", "button secondary")
    } else {
        ("follow", "Follow", "button")
    };
    format!(
        r#"<a class="{class}" href="{}{action}/">{label}</a>"#,
        html::escape(&html::profile_path(&author.username))
    )
}

/// An author's posts, with follow controls for other logged-in users.
#[debug_handler]
pub(crate) async fn profile(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let viewer = auth::current_user(&session, &db_pool).await?;
    let feed = feed::compose(&db_pool, Feed::Author(&username), query.page.as_deref()).await?;

    let FeedOwner::Author(author) = &feed.owner else {
        return Err(anyhow::anyhow!("author feed resolved to {:?}", feed.owner).into());
    };
    let (followers, following) = follow::counts(&db_pool, author).await?;
    let button = match &viewer {
        Some(viewer) if viewer.id != author.id => {
            follow_button(author, follow::is_following(&db_pool, viewer, author).await?)
        }
        _ => String::new(),
    };

    let heading = html::fill(
        include_res!(str, "/pages/profile_header.html"),
        &[
            ("username", &html::escape(&author.username)),
            ("post_count", &feed.total.to_string()),
            ("followers", &followers.to_string()),
            ("following", &following.to_string()),
            ("follow_button", &button),
        ],
    );
    let content = html::feed(&heading, &feed.page.items, &feed.page.window);
    let title = format!("Profile of {}", author.username);

    Ok(Html(html::layout(&title, viewer.as_ref(), &content)).into_response())
}
