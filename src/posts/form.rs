use axum::{extract::{Multipart, multipart::MultipartError}, response::Html};
use sqlx::SqlitePool;

use crate::{AppResult, db::{self, User}, html, include_res};

use super::lifecycle::{PostDraft, Upload};

/// Reads the `text`, `group` and `image` fields of a post form.
///
/// A malformed body is the client's fault; callers answer it with the error's own response.
pub(crate) async fn read_draft(mut multipart: Multipart) -> Result<PostDraft, MultipartError> {
    let mut draft = PostDraft::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "text" => draft.text = field.text().await?,
            "group" => {
                let slug = field.text().await?;
                draft.group = (!slug.trim().is_empty()).then_some(slug);
            }
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    draft.image = Some(Upload { file_name, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(draft)
}

/// What the create/edit form shows.
pub(crate) struct PostFormView<'a> {
    pub is_edit: bool,
    pub action: &'a str,
    pub text: &'a str,
    pub group: Option<&'a str>,
    pub current_image: Option<&'a str>,
    pub error: Option<String>,
}

pub(crate) async fn render(db_pool: &SqlitePool, viewer: &User, view: PostFormView<'_>) -> AppResult<Html<String>> {
    let groups = db::all_groups(db_pool).await?;
    let group_options = groups
        .iter()
        .map(|group| {
            let selected = if view.group == Some(group.slug.as_str()) { " selected" } else { "" };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                html::escape(&group.slug),
                html::escape(&group.title),
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ");

    let current_image = view
        .current_image
        .map(|image| format!(r#"<p class="current-image">Current: <a href="/media/{0}">{0}</a></p>"#, html::escape(image)))
        .unwrap_or_default();
    let error = view
        .error
        .map(|message| format!(r#"<p class="errorlist">{}</p>"#, html::escape(&message)))
        .unwrap_or_default();
    let (title, submit) = if view.is_edit { ("Edit post", "Save") } else { ("New post", "Publish") };

    let form = html::fill(
        include_res!(str, "/pages/post_form.html"),
        &[
            ("heading", title),
            ("error", &error),
            ("action", view.action),
            ("text", &html::escape(view.text)),
            ("group_options", &group_options),
            ("current_image", &current_image),
            ("submit", submit),
        ],
    );
    Ok(Html(html::layout(title, Some(viewer), &form)))
}
