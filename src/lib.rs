pub mod about;
pub mod appresult;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod feed;
pub mod follow;
pub mod groups;
pub mod html;
pub mod index;
pub mod media;
pub mod pager;
pub mod posts;
pub mod profiles;
pub mod res;
pub mod session;

use axum::{Router, extract::FromRef, routing::get};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

pub use appresult::{AppError, AppResult, BlogError};
use cache::PageCache;
use media::MediaStore;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub page_cache: PageCache,
    pub media: MediaStore,
}

/// `?page=` of every paged view.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

pub fn session_layer(secure: bool, inactivity: time::Duration) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(inactivity))
}

pub fn router(app_state: AppState, sessions: SessionManagerLayer<MemoryStore>) -> Router {
    let media_files = ServeDir::new(app_state.media.root());

    Router::new()
        .route("/", get(index::index))
        .route("/static/style.css", get(res::stylesheet))

        .merge(auth::router())
        .merge(posts::router())
        .merge(profiles::router())
        .merge(groups::router())
        .nest("/about", about::router())
        .nest_service("/media", media_files)
        .fallback(res::not_found)

        .with_state(app_state)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
}
