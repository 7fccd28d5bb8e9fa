use std::fmt;

use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::{appresult::BlogError, include_res};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub created_at: i64,
    pub author_id: i64,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created_at: i64,
}

/// A post joined with what a listing needs to show it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub created_at: i64,
    pub image: Option<String>,
    pub author: String,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

/// A comment joined with its author's username.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CommentCard {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created_at: i64,
}

fn preview(text: &str) -> String {
    text.chars().take(15).collect()
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&preview(&self.text))
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&preview(&self.text))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.title)
    }
}

pub fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Creates missing tables and indexes.
pub async fn init(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_res!(str, "/schema.sql"))
        .execute(db_pool)
        .await?;
    Ok(())
}

pub async fn user_by_username(db_pool: &SqlitePool, username: &str) -> Result<User, BlogError> {
    sqlx::query_as("SELECT id,username FROM users WHERE username=?")
        .bind(username)
        .fetch_optional(db_pool)
        .await?
        .ok_or(BlogError::NotFound)
}

pub async fn user_by_id(db_pool: &SqlitePool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT id,username FROM users WHERE id=?")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await
}

pub async fn group_by_slug(db_pool: &SqlitePool, slug: &str) -> Result<Group, BlogError> {
    sqlx::query_as("SELECT id,title,slug,description FROM post_groups WHERE slug=?")
        .bind(slug)
        .fetch_optional(db_pool)
        .await?
        .ok_or(BlogError::NotFound)
}

pub async fn all_groups(db_pool: &SqlitePool) -> Result<Vec<Group>, sqlx::Error> {
    sqlx::query_as("SELECT id,title,slug,description FROM post_groups ORDER BY title,id")
        .fetch_all(db_pool)
        .await
}

pub async fn create_group(
    db_pool: &SqlitePool,
    slug: &str,
    title: &str,
    description: &str,
) -> Result<Group, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO post_groups (title,slug,description) VALUES (?,?,?) \
         RETURNING id,title,slug,description",
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(db_pool)
    .await
}

pub async fn post_by_id(db_pool: &SqlitePool, post_id: i64) -> Result<Post, BlogError> {
    sqlx::query_as("SELECT id,text,created_at,author_id,group_id,image FROM posts WHERE id=?")
        .bind(post_id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(BlogError::NotFound)
}

pub async fn post_card(db_pool: &SqlitePool, post_id: i64) -> Result<PostCard, BlogError> {
    sqlx::query_as(
        "SELECT p.id,p.text,p.created_at,p.image,u.username AS author,g.slug AS group_slug,g.title AS group_title \
         FROM posts p JOIN users u ON u.id=p.author_id LEFT JOIN post_groups g ON g.id=p.group_id \
         WHERE p.id=?",
    )
    .bind(post_id)
    .fetch_optional(db_pool)
    .await?
    .ok_or(BlogError::NotFound)
}

pub async fn comments_for(db_pool: &SqlitePool, post_id: i64) -> Result<Vec<CommentCard>, sqlx::Error> {
    sqlx::query_as(
        "SELECT c.id,u.username AS author,c.text,c.created_at \
         FROM comments c JOIN users u ON u.id=c.author_id \
         WHERE c.post_id=? ORDER BY c.created_at,c.id",
    )
    .bind(post_id)
    .fetch_all(db_pool)
    .await
}
