use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::forms::PostForm;

/// RepoError
///
/// Failures surfaced by a `Repository` implementation.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The storage-level uniqueness constraint on `posts.title` fired.
    #[error("a post titled {0:?} already exists")]
    DuplicateTitle(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// BlogError
///
/// Outcome of a Post Workflow operation that did not produce the requested data.
/// `NotFound` and `Denied` stay distinct here but render identically, so clients
/// cannot tell a missing post from one they are not allowed to touch.
#[derive(Debug, Error)]
pub enum BlogError {
    #[error("post not found")]
    NotFound,
    #[error("access denied by visibility policy")]
    Denied,
    /// Submission rejected; carries the form to display again.
    #[error("invalid post submission")]
    Invalid(PostForm),
    #[error(transparent)]
    Storage(#[from] RepoError),
}

impl BlogError {
    /// True for both variants that render as 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::NotFound | BlogError::Denied)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        match self {
            BlogError::NotFound | BlogError::Denied => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody { error: "Not Found" }),
            )
                .into_response(),
            // A rejected form is a normal re-prompt, not a failure status.
            BlogError::Invalid(form) => (StatusCode::OK, Json(form)).into_response(),
            BlogError::Storage(e) => {
                tracing::error!("storage failure: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "Internal Server Error",
                    }),
                )
                    .into_response()
            }
        }
    }
}
