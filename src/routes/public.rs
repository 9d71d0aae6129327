use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints any client may call. Drafts are filtered out of the listing
/// unconditionally; the detail view shows a draft only to an authenticated requester.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Published posts, newest first.
        .route("/", get(handlers::post_list))
        // GET /post/{id}/
        // A single post. Unknown ids, malformed ids and hidden drafts are all 404.
        .route("/post/{id}/", get(handlers::post_detail))
}
