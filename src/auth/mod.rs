use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Router,
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{AppResult, AppState, BlogError, db::{self, User}, html, session::USER_ID};

mod login;
mod logout;
mod signup;

pub use login::{login, login_page};
pub use logout::logout;
pub use signup::{signup, signup_page};

pub const LOGIN_PATH: &str = "/auth/login/";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login/", get(login_page).post(login))
        .route("/auth/signup/", get(signup_page).post(signup))
        .route("/auth/logout/", get(logout))
}

/// The logged-in user, if any.
pub async fn current_user(session: &Session, db_pool: &SqlitePool) -> AppResult<Option<User>> {
    let Some(user_id) = session.get::<i64>(USER_ID).await? else {
        return Ok(None);
    };
    Ok(db::user_by_id(db_pool, user_id).await?)
}

/// Sends a visitor to the login page, remembering where they were going.
pub fn login_redirect(uri: &Uri) -> Response {
    let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    Redirect::to(&format!("{LOGIN_PATH}?next={}", html::encode_path(target))).into_response()
}

/// Only same-site absolute paths are followed after login.
pub(crate) fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next)
            if next.starts_with('/')
                && !next.starts_with("//")
                && !next.starts_with("/\\")
                && next.bytes().all(|b| b.is_ascii_graphic()) => next,
        _ => "/",
    }
}

fn validate_username(username: &str) -> Result<(), BlogError> {
    let len = username.chars().count();
    if len == 0 || len > 150 {
        return Err(BlogError::validation("username", "Enter a username of 1 to 150 characters."));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')) {
        return Err(BlogError::validation(
            "username",
            "Usernames may contain only letters, digits and @/./+/-/_ characters.",
        ));
    }
    Ok(())
}

async fn hash_password(password: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| anyhow::anyhow!("failed to hash password: {err}"))
    })
    .await?
}

async fn verify_password(password: String, hash: String) -> anyhow::Result<bool> {
    Ok(tokio::task::spawn_blocking(move || {
        PasswordHash::new(&hash)
            .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
            .unwrap_or(false)
    })
    .await?)
}

/// Registers a new user after checking the username and password rules.
pub async fn create_user(db_pool: &SqlitePool, username: &str, password: &str) -> Result<User, BlogError> {
    validate_username(username)?;
    if password.chars().count() < 8 {
        return Err(BlogError::validation("password", "The password must be at least 8 characters long."));
    }

    let password_hash = hash_password(password.to_owned()).await?;
    let inserted = sqlx::query_as::<_, User>(
        "INSERT INTO users (username,password_hash,created_at) VALUES (?,?,?) \
         ON CONFLICT (username) DO NOTHING RETURNING id,username",
    )
    .bind(username)
    .bind(password_hash)
    .bind(db::now())
    .fetch_optional(db_pool)
    .await?;

    let user = inserted.ok_or_else(|| BlogError::validation("username", "A user with that username already exists."))?;
    info!(username = %user.username, "user signed up");
    Ok(user)
}

/// Checks credentials; `None` means they don't match any user.
pub async fn authenticate(db_pool: &SqlitePool, username: &str, password: &str) -> Result<Option<User>, BlogError> {
    let Some((id, password_hash)): Option<(i64, String)> =
        sqlx::query_as("SELECT id,password_hash FROM users WHERE username=?")
            .bind(username)
            .fetch_optional(db_pool)
            .await?
    else {
        return Ok(None);
    };

    if !verify_password(password.to_owned(), password_hash).await? {
        return Ok(None);
    }
    Ok(Some(User { id, username: username.to_owned() }))
}

/// Binds `user` to the session under a fresh session id.
pub(crate) async fn start_session(session: &Session, user: &User) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;
    info!(username = %user.username, "logged in");
    Ok(())
}
