use axum::{
    debug_handler,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{AppResult, AppState, BlogError, auth, db};

use super::{
    form::{self, PostFormView},
    lifecycle::{self, EditCapability},
    parse_post_id,
};

fn detail(post_id: i64) -> Response {
    Redirect::to(&format!("/posts/{post_id}/")).into_response()
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_post_page(
    State(app_state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &app_state.db_pool).await? else {
        return Ok(auth::login_redirect(&uri));
    };
    let post_id = parse_post_id(&post_id)?;
    let stored = db::post_by_id(&app_state.db_pool, post_id).await?;
    if lifecycle::authorize_edit(&user, &stored) == EditCapability::Forbidden {
        return Ok(detail(post_id));
    }
    let post = db::post_card(&app_state.db_pool, post_id).await?;

    let action = format!("/posts/{post_id}/edit/");
    let view = PostFormView {
        is_edit: true,
        action: &action,
        text: &post.text,
        group: post.group_slug.as_deref(),
        current_image: post.image.as_deref(),
        error: None,
    };
    Ok(form::render(&app_state.db_pool, &user, view).await?.into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_post(
    State(app_state): State<AppState>,
    session: Session,
    uri: Uri,
    Path(post_id): Path<String>,

    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &app_state.db_pool).await? else {
        return Ok(auth::login_redirect(&uri));
    };
    let post_id = parse_post_id(&post_id)?;
    let stored = db::post_by_id(&app_state.db_pool, post_id).await?;
    if lifecycle::authorize_edit(&user, &stored) == EditCapability::Forbidden {
        return Ok(detail(post_id));
    }
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let draft = match form::read_draft(multipart).await {
        Ok(draft) => draft,
        Err(err) => return Ok(err.into_response()),
    };
    match lifecycle::edit_post(&app_state.db_pool, &app_state.media, &user, post_id, draft.clone()).await {
        Ok(_) => Ok(detail(post_id)),
        Err(BlogError::Forbidden) => Ok(detail(post_id)),
        Err(BlogError::Validation { message, .. }) => {
            let action = format!("/posts/{post_id}/edit/");
            let view = PostFormView {
                is_edit: true,
                action: &action,
                text: &draft.text,
                group: draft.group.as_deref(),
                current_image: stored.image.as_deref(),
                error: Some(message),
            };
            Ok(form::render(&app_state.db_pool, &user, view).await?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}
