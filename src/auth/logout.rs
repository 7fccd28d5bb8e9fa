use axum::{debug_handler, extract::Query, response::Redirect};
use tower_sessions::Session;

use crate::AppResult;

use super::{login::LoginQuery, safe_next};

#[debug_handler]
pub async fn logout(
    Query(LoginQuery { next }): Query<LoginQuery>,
    session: Session
) -> AppResult<Redirect> {
    session.flush().await?;
    Ok(Redirect::to(safe_next(next.as_deref())))
}
