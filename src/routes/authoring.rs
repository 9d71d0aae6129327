use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authoring Router Module
///
/// Creating and editing posts. Any authenticated user may edit any post.
/// An anonymous request gets 404, never 401/403.
pub fn authoring_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /post/new/
        // Empty form, or create a draft and redirect to it.
        // The static `new` segment wins over `/post/{id}/`.
        .route(
            "/post/new/",
            get(handlers::post_new_form).post(handlers::post_new),
        )
        // GET/POST /post/{id}/edit/
        // Pre-filled form, or save title/text and redirect to the post.
        .route(
            "/post/{id}/edit/",
            get(handlers::post_edit_form).post(handlers::post_edit),
        )
}
