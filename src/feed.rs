//! Builds the newest-first post listings behind every timeline view.

use sqlx::SqlitePool;

use crate::{
    appresult::BlogError,
    db::{self, Group, PostCard, User},
    pager::{Page, Paginator, POSTS_PER_PAGE},
};

#[derive(Debug, Clone, Copy)]
pub enum Feed<'a> {
    /// Every post.
    Global,
    /// Posts in the group with this slug.
    Group(&'a str),
    /// Posts written by the user with this username.
    Author(&'a str),
    /// Posts by every author this user follows.
    Following(&'a User),
}

/// Whose timeline a page belongs to, for the page header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOwner {
    Everyone,
    Group(Group),
    Author(User),
    Follower(User),
}

#[derive(Debug, Clone)]
pub struct FeedPage {
    pub owner: FeedOwner,
    /// Posts in the whole feed, not just this page.
    pub total: usize,
    pub page: Page<PostCard>,
}

const POST_CARD_SELECT: &str = "SELECT p.id,p.text,p.created_at,p.image,u.username AS author,g.slug AS group_slug,g.title AS group_title \
     FROM posts p JOIN users u ON u.id=p.author_id LEFT JOIN post_groups g ON g.id=p.group_id";

/// Ties on `created_at` are broken by id so the order is total.
const NEWEST_FIRST: &str = "ORDER BY p.created_at DESC, p.id DESC";

fn filter_for(owner: &FeedOwner) -> (&'static str, Option<i64>) {
    match owner {
        FeedOwner::Everyone => ("", None),
        FeedOwner::Group(group) => ("WHERE p.group_id=?", Some(group.id)),
        FeedOwner::Author(author) => ("WHERE p.author_id=?", Some(author.id)),
        FeedOwner::Follower(user) => (
            "WHERE p.author_id IN (SELECT author_id FROM follows WHERE user_id=?)",
            Some(user.id),
        ),
    }
}

/// Resolves `feed` and returns the requested page of it.
///
/// Unknown group slugs and usernames are [`BlogError::NotFound`]; a user who
/// follows nobody gets an empty page.
pub async fn compose(
    db_pool: &SqlitePool,
    feed: Feed<'_>,
    requested_page: Option<&str>,
) -> Result<FeedPage, BlogError> {
    let owner = match feed {
        Feed::Global => FeedOwner::Everyone,
        Feed::Group(slug) => FeedOwner::Group(db::group_by_slug(db_pool, slug).await?),
        Feed::Author(username) => FeedOwner::Author(db::user_by_username(db_pool, username).await?),
        Feed::Following(user) => FeedOwner::Follower(user.clone()),
    };
    let (filter, id) = filter_for(&owner);

    let count_sql = format!("SELECT COUNT(*) FROM posts p {filter}");
    let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
    if let Some(id) = id {
        count_query = count_query.bind(id);
    }
    let (count,) = count_query.fetch_one(db_pool).await?;

    let total = count.max(0) as usize;
    let window = Paginator::new(total, POSTS_PER_PAGE).get_page(requested_page);

    let page_sql = format!("{POST_CARD_SELECT} {filter} {NEWEST_FIRST} LIMIT ? OFFSET ?");
    let mut page_query = sqlx::query_as::<_, PostCard>(&page_sql);
    if let Some(id) = id {
        page_query = page_query.bind(id);
    }
    let items = page_query
        .bind(window.len as i64)
        .bind(window.offset as i64)
        .fetch_all(db_pool)
        .await?;

    Ok(FeedPage { owner, total, page: Page { items, window } })
}
