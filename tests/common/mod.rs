#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tempfile::TempDir;
use tower::ServiceExt;
use yatube::{
    AppState,
    cache::{ManualClock, PageCache},
    db,
    media::MediaStore,
};

pub const BOUNDARY: &str = "yatube-test-boundary";

pub struct TestApp {
    pub db_pool: SqlitePool,
    pub page_cache: PageCache,
    pub clock: Arc<ManualClock>,
    pub media_dir: TempDir,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub cookie: Option<String>,
    pub body: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::init(&db_pool).await.unwrap();

        let clock = Arc::new(ManualClock::new());
        let page_cache = PageCache::with_clock(Duration::from_secs(20), clock.clone());
        let media_dir = tempfile::tempdir().unwrap();

        let app_state = AppState {
            db_pool: db_pool.clone(),
            page_cache: page_cache.clone(),
            media: MediaStore::new(media_dir.path()),
        };
        let sessions = yatube::session_layer(false, time::Duration::minutes(5));
        let router = yatube::router(app_state, sessions);

        TestApp { db_pool, page_cache, clock, media_dir, router }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response: Response<Body> = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|value| value.to_str().unwrap().to_owned());
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().unwrap().split(';').next().map(str::to_owned));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse { status, location, cookie, body: String::from_utf8(body.to_vec()).unwrap() }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, form: &str) -> TestResponse {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(form.to_owned())).unwrap()).await
    }

    pub async fn post_multipart(&self, uri: &str, cookie: Option<&str>, body: Vec<u8>) -> TestResponse {
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    /// Signs up `username` and returns the session cookie.
    pub async fn signup(&self, username: &str) -> String {
        let form = format!("username={username}&password=secret-pass-1&password_confirm=secret-pass-1");
        let response = self.post_form("/auth/signup/", None, &form).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        response.cookie.expect("signup sets a session cookie")
    }

    /// A user who never logs in.
    pub async fn author(&self, username: &str) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO users (username,password_hash,created_at) VALUES (?,'',0) RETURNING id",
        )
        .bind(username)
        .fetch_one(&self.db_pool)
        .await
        .unwrap();
        id
    }

    pub async fn user_id(&self, username: &str) -> i64 {
        db::user_by_username(&self.db_pool, username).await.unwrap().id
    }

    pub async fn group(&self, slug: &str, title: &str) -> i64 {
        db::create_group(&self.db_pool, slug, title, "Test description").await.unwrap().id
    }

    /// Inserts a post directly; `created_at` orders the feeds.
    pub async fn post(&self, author_id: i64, text: &str, group_id: Option<i64>, created_at: i64) -> i64 {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO posts (text,created_at,author_id,group_id) VALUES (?,?,?,?) RETURNING id",
        )
        .bind(text)
        .bind(created_at)
        .bind(author_id)
        .bind(group_id)
        .fetch_one(&self.db_pool)
        .await
        .unwrap();
        id
    }

    pub async fn post_count(&self) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.db_pool)
            .await
            .unwrap();
        count
    }
}

/// Number of post cards on a rendered page.
pub fn cards(body: &str) -> usize {
    body.matches(r#"<article class="post">"#).count()
}

/// Ids of the post cards on a rendered page, top to bottom.
pub fn post_ids(body: &str) -> Vec<i64> {
    body.split(r#"<a class="post-link" href="/posts/"#)
        .skip(1)
        .filter_map(|rest| rest.split('/').next()?.parse().ok())
        .collect()
}

pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        MultipartBody { bytes: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}

/// A 2x1 GIF.
pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];
