use axum::{
    debug_handler,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::Uri,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{AppResult, AppState, BlogError, auth, html};

use super::{form::{self, PostFormView}, lifecycle};

const ACTION: &str = "/create/";

#[debug_handler(state = AppState)]
pub(crate) async fn new_post_page(
    State(app_state): State<AppState>,
    session: Session,
    uri: Uri,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &app_state.db_pool).await? else {
        return Ok(auth::login_redirect(&uri));
    };

    let view = PostFormView {
        is_edit: false,
        action: ACTION,
        text: "",
        group: None,
        current_image: None,
        error: None,
    };
    Ok(form::render(&app_state.db_pool, &user, view).await?.into_response())
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_post(
    State(app_state): State<AppState>,
    session: Session,
    uri: Uri,

    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let Some(user) = auth::current_user(&session, &app_state.db_pool).await? else {
        return Ok(auth::login_redirect(&uri));
    };
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let draft = match form::read_draft(multipart).await {
        Ok(draft) => draft,
        Err(err) => return Ok(err.into_response()),
    };
    match lifecycle::create_post(&app_state.db_pool, &app_state.media, &user, draft.clone()).await {
        Ok(_) => Ok(Redirect::to(&html::profile_path(&user.username)).into_response()),
        Err(BlogError::Validation { message, .. }) => {
            let view = PostFormView {
                is_edit: false,
                action: ACTION,
                text: &draft.text,
                group: draft.group.as_deref(),
                current_image: None,
                error: Some(message),
            };
            Ok(form::render(&app_state.db_pool, &user, view).await?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}
