//! Creating and editing posts, and commenting on them.

use axum::body::Bytes;
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    BlogError,
    db::{self, Comment, Post, User},
    media::{self, MediaStore},
};

/// An image file as it arrived with a form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Submitted post fields, before validation.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub text: String,
    /// Group slug; `None` leaves the post without a group.
    pub group: Option<String>,
    pub image: Option<Upload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCapability {
    Authorized,
    Forbidden,
}

/// Only a post's author may change it.
pub fn authorize_edit(requester: &User, post: &Post) -> EditCapability {
    if requester.id == post.author_id {
        EditCapability::Authorized
    } else {
        EditCapability::Forbidden
    }
}

fn required_text(text: &str) -> Result<&str, BlogError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BlogError::validation("text", "This field is required."));
    }
    Ok(text)
}

struct ValidDraft<'a> {
    text: &'a str,
    group_id: Option<i64>,
    image: Option<(String, &'a Bytes)>,
}

async fn validate<'a>(db_pool: &SqlitePool, draft: &'a PostDraft) -> Result<ValidDraft<'a>, BlogError> {
    let text = required_text(&draft.text)?;

    let group_id = match draft.group.as_deref().map(str::trim).filter(|slug| !slug.is_empty()) {
        None => None,
        Some(slug) => match db::group_by_slug(db_pool, slug).await {
            Ok(group) => Some(group.id),
            Err(BlogError::NotFound) => {
                return Err(BlogError::validation("group", "Select a valid choice."));
            }
            Err(err) => return Err(err),
        },
    };

    let image = match &draft.image {
        None => None,
        Some(upload) => {
            let invalid = || {
                BlogError::validation("image", "Upload a valid image. The file you uploaded was either not an image or a corrupted image.")
            };
            let name = media::sanitize_file_name(&upload.file_name)
                .filter(|name| media::is_image_name(name))
                .ok_or_else(invalid)?;
            if !media::decodes_as_image(upload.bytes.clone()).await {
                return Err(invalid());
            }
            Some((name, &upload.bytes))
        }
    };

    Ok(ValidDraft { text, group_id, image })
}

async fn store_image(media: &MediaStore, image: Option<(String, &Bytes)>) -> Result<Option<String>, BlogError> {
    match image {
        None => Ok(None),
        Some((name, bytes)) => Ok(Some(
            media.save_post_image(&name, bytes).await.map_err(anyhow::Error::from)?,
        )),
    }
}

/// A failed write must not leave the freshly stored upload behind.
async fn discard_on_error<T>(
    media: &MediaStore,
    uploaded: Option<&str>,
    written: Result<T, sqlx::Error>,
) -> Result<T, BlogError> {
    if written.is_err() {
        if let Some(reference) = uploaded {
            media.remove(reference).await;
        }
    }
    Ok(written?)
}

pub async fn create_post(
    db_pool: &SqlitePool,
    media: &MediaStore,
    author: &User,
    draft: PostDraft,
) -> Result<Post, BlogError> {
    let valid = validate(db_pool, &draft).await?;
    let image = store_image(media, valid.image).await?;

    let inserted = sqlx::query_as::<_, Post>(
        "INSERT INTO posts (text,created_at,author_id,group_id,image) VALUES (?,?,?,?,?) \
         RETURNING id,text,created_at,author_id,group_id,image",
    )
    .bind(valid.text)
    .bind(db::now())
    .bind(author.id)
    .bind(valid.group_id)
    .bind(&image)
    .fetch_one(db_pool)
    .await;
    let post = discard_on_error(media, image.as_deref(), inserted).await?;

    info!(post_id = post.id, author = %author.username, "post created");
    Ok(post)
}

/// Rewrites text, group and (when a new one is uploaded) image of a post.
///
/// The author and creation time never change. Without a new upload the
/// current image is kept.
pub async fn edit_post(
    db_pool: &SqlitePool,
    media: &MediaStore,
    requester: &User,
    post_id: i64,
    draft: PostDraft,
) -> Result<Post, BlogError> {
    let post = db::post_by_id(db_pool, post_id).await?;
    if authorize_edit(requester, &post) == EditCapability::Forbidden {
        return Err(BlogError::Forbidden);
    }

    let valid = validate(db_pool, &draft).await?;
    let uploaded = store_image(media, valid.image).await?;
    let image = uploaded.clone().or(post.image);

    let updated = sqlx::query_as::<_, Post>(
        "UPDATE posts SET text=?,group_id=?,image=? WHERE id=? \
         RETURNING id,text,created_at,author_id,group_id,image",
    )
    .bind(valid.text)
    .bind(valid.group_id)
    .bind(&image)
    .bind(post_id)
    .fetch_one(db_pool)
    .await;
    let post = discard_on_error(media, uploaded.as_deref(), updated).await?;

    info!(post_id, author = %requester.username, "post edited");
    Ok(post)
}

pub async fn add_comment(
    db_pool: &SqlitePool,
    requester: &User,
    post_id: i64,
    text: &str,
) -> Result<Comment, BlogError> {
    let post = db::post_by_id(db_pool, post_id).await?;
    let text = required_text(text)?;

    let comment: Comment = sqlx::query_as(
        "INSERT INTO comments (post_id,author_id,text,created_at) VALUES (?,?,?,?) \
         RETURNING id,post_id,author_id,text,created_at",
    )
    .bind(post.id)
    .bind(requester.id)
    .bind(text)
    .bind(db::now())
    .fetch_one(db_pool)
    .await?;

    info!(post_id, comment_id = comment.id, author = %requester.username, "comment added");
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_by(author_id: i64) -> Post {
        Post {
            id: 100500,
            text: "Test post text".into(),
            created_at: 0,
            author_id,
            group_id: None,
            image: None,
        }
    }

    #[test]
    fn only_the_author_may_edit() {
        let author = User { id: 1, username: "TestAuthor".into() };
        let other = User { id: 2, username: "NoName".into() };

        assert_eq!(authorize_edit(&author, &post_by(1)), EditCapability::Authorized);
        assert_eq!(authorize_edit(&other, &post_by(1)), EditCapability::Forbidden);
    }

    const SMALL_GIF: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
        0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
    ];

    #[tokio::test]
    async fn failed_insert_leaves_no_upload_behind() {
        let db_pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db_pool.close().await;
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path());

        let draft = PostDraft {
            text: "Post with a picture".into(),
            group: None,
            image: Some(Upload { file_name: "small.gif".into(), bytes: Bytes::from_static(SMALL_GIF) }),
        };
        let author = User { id: 1, username: "TestAuthor".into() };

        assert!(matches!(create_post(&db_pool, &media, &author, draft).await, Err(BlogError::Database(_))));
        assert!(!dir.path().join("posts/small.gif").exists());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(matches!(required_text("   \n"), Err(BlogError::Validation { field: "text", .. })));
        assert_eq!(required_text("  hello ").unwrap(), "hello");
    }
}
