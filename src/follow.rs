//! Directed "user follows author" edges.

use sqlx::SqlitePool;
use tracing::info;

use crate::db::User;

/// Adds the edge `user -> author`.
///
/// Following yourself is silently ignored, and following someone twice leaves
/// a single edge. Returns whether a new edge was created.
pub async fn follow(db_pool: &SqlitePool, user: &User, author: &User) -> Result<bool, sqlx::Error> {
    if user.id == author.id {
        return Ok(false);
    }

    let created = sqlx::query("INSERT INTO follows (user_id,author_id) VALUES (?,?) ON CONFLICT (user_id,author_id) DO NOTHING")
        .bind(user.id)
        .bind(author.id)
        .execute(db_pool)
        .await?
        .rows_affected() > 0;

    if created {
        info!(user = %user.username, author = %author.username, "followed");
    }
    Ok(created)
}

/// Removes the edge `user -> author` if it exists. Returns whether one was removed.
pub async fn unfollow(db_pool: &SqlitePool, user: &User, author: &User) -> Result<bool, sqlx::Error> {
    let removed = sqlx::query("DELETE FROM follows WHERE user_id=? AND author_id=?")
        .bind(user.id)
        .bind(author.id)
        .execute(db_pool)
        .await?
        .rows_affected() > 0;

    if removed {
        info!(user = %user.username, author = %author.username, "unfollowed");
    }
    Ok(removed)
}

pub async fn is_following(db_pool: &SqlitePool, user: &User, author: &User) -> Result<bool, sqlx::Error> {
    Ok(
        sqlx::query("SELECT 1 FROM follows WHERE user_id=? AND author_id=?")
            .bind(user.id)
            .bind(author.id)
            .fetch_optional(db_pool)
            .await?
            .is_some()
    )
}

/// Number of followers of `user`, and of authors `user` follows.
pub async fn counts(db_pool: &SqlitePool, user: &User) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM follows WHERE author_id=?), (SELECT COUNT(*) FROM follows WHERE user_id=?)",
    )
    .bind(user.id)
    .bind(user.id)
    .fetch_one(db_pool)
    .await
}
