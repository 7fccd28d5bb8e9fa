use axum::{http::StatusCode, response::{Html, IntoResponse, Response}};
use tracing::error;

use crate::{html, include_res, res};

/// Failures the blog's operations report to their callers.
#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BlogError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        BlogError::Validation { field, message: message.into() }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(BlogError::NotFound) = self.0.downcast_ref::<BlogError>() {
            return (StatusCode::NOT_FOUND, res::not_found_page()).into_response();
        }

        error!("{:#}\n{}", self.0, self.0.backtrace());
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(html::layout("Server error", None, include_res!(str, "/pages/500.html"))),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
