//! Static pages written in Markdown.

use std::ops::Deref;

use axum::{
    Router, debug_handler,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{AppResult, AppState, auth, db::User, html, include_res};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/author/", get(author))
        .route("/tech/", get(tech))
}

/// A Markdown document served as a full page.
pub struct Markdown<T> {
    pub title: &'static str,
    pub viewer: Option<User>,
    pub source: T,
}

impl<T> IntoResponse for Markdown<T>
where
    T: Deref<Target = str>,
{
    fn into_response(self) -> Response {
        let content = html::markdown(&self.source);
        Html(html::layout(self.title, self.viewer.as_ref(), &content)).into_response()
    }
}

#[debug_handler]
async fn author(State(db_pool): State<SqlitePool>, session: Session) -> AppResult<Markdown<&'static str>> {
    Ok(Markdown {
        title: "About the author",
        viewer: auth::current_user(&session, &db_pool).await?,
        source: include_res!(str, "/pages/about/author.md"),
    })
}

#[debug_handler]
async fn tech(State(db_pool): State<SqlitePool>, session: Session) -> AppResult<Markdown<&'static str>> {
    Ok(Markdown {
        title: "Technologies",
        viewer: auth::current_user(&session, &db_pool).await?,
        source: include_res!(str, "/pages/about/tech.md"),
    })
}
