//! Uploaded post images on local disk.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use axum::body::Bytes;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

const IMAGE_EXTENSIONS: [&str; 6] = ["gif", "jpg", "jpeg", "png", "webp", "bmp"];

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MediaStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes an image under `posts/` and returns its reference relative to the root.
    ///
    /// A name that is already taken gets a unique prefix; existing files are
    /// never overwritten.
    pub async fn save_post_image(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<String> {
        let dir = self.root.join("posts");
        fs::create_dir_all(&dir).await?;

        let mut name = file_name.to_owned();
        loop {
            match fs::OpenOptions::new().write(true).create_new(true).open(dir.join(&name)).await {
                Ok(mut file) => {
                    let path = dir.join(&name);
                    if let Err(err) = write_out(&mut file, bytes).await {
                        drop(file);
                        if let Err(cleanup) = fs::remove_file(&path).await {
                            warn!(path = %path.display(), "cannot remove partial upload: {cleanup}");
                        }
                        return Err(err);
                    }
                    return Ok(format!("posts/{name}"));
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    name = format!("{}_{file_name}", Uuid::now_v7().simple());
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Deletes a stored file by the reference [`MediaStore::save_post_image`] returned.
    pub async fn remove(&self, reference: &str) {
        let path = self.root.join(reference);
        match fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "media removed"),
            Err(err) => warn!(path = %path.display(), "cannot remove media: {err}"),
        }
    }
}

async fn write_out(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

/// Reduces an uploaded file name to a safe base name, or `None` if nothing usable is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    (!cleaned.is_empty()).then(|| cleaned.to_owned())
}

/// Whether `bytes` decode as a complete image in a supported format.
pub async fn decodes_as_image(bytes: Bytes) -> bool {
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).is_ok())
        .await
        .unwrap_or(false)
}

pub fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("small.gif").as_deref(), Some("small.gif"));
        assert_eq!(sanitize_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize_file_name(r"C:\pics\my cat.png").as_deref(), Some("my_cat.png"));
        assert_eq!(sanitize_file_name(".hidden.jpg").as_deref(), Some("hidden.jpg"));
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name("..."), None);
    }

    #[test]
    fn recognizes_images() {
        assert!(is_image_name("small.gif"));
        assert!(is_image_name("PHOTO.JPEG"));
        assert!(!is_image_name("notes.txt"));
        assert!(!is_image_name("gif"));
    }

    const SMALL_GIF: &[u8] = &[
        0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
        0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
    ];

    #[tokio::test]
    async fn only_real_images_decode() {
        assert!(decodes_as_image(Bytes::from_static(SMALL_GIF)).await);
        assert!(!decodes_as_image(Bytes::from_static(b"<html><script>alert(1)</script></html>")).await);
        assert!(!decodes_as_image(Bytes::from_static(&SMALL_GIF[..12])).await);
        assert!(!decodes_as_image(Bytes::new()).await);
    }

    #[tokio::test]
    async fn taken_names_get_a_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaStore::new(dir.path());

        let first = media.save_post_image("small.gif", b"GIF89a").await.unwrap();
        let second = media.save_post_image("small.gif", b"GIF89a").await.unwrap();

        assert_eq!(first, "posts/small.gif");
        assert_ne!(second, first);
        assert!(second.starts_with("posts/") && second.ends_with("_small.gif"));
        assert!(dir.path().join(&second).exists());

        media.remove(&second).await;
        assert!(!dir.path().join(&second).exists());
        assert!(dir.path().join(&first).exists());
    }
}
