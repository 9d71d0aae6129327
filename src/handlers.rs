use crate::{
    auth::AuthUser,
    error::BlogError,
    forms::PostForm,
    models::{Post, PostList},
    workflow::PostWorkflow,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Where a successful create or edit sends the client.
pub fn post_detail_path(id: i64) -> String {
    format!("/post/{id}/")
}

/// 302 Found pointing at the post's detail view.
fn redirect_to_post(post: &Post) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, post_detail_path(post.id))]).into_response()
}

// --- Handlers ---

/// post_list
///
/// [Public Route] Published posts, newest first. Drafts never appear here,
/// whoever is asking.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Published posts", body = PostList))
)]
pub async fn post_list(
    viewer: Option<AuthUser>,
    State(workflow): State<PostWorkflow>,
) -> Result<Json<PostList>, BlogError> {
    workflow.list(viewer.as_ref()).await.map(Json)
}

/// post_detail
///
/// [Public Route] A single post. Drafts need an authenticated requester;
/// otherwise the response is the same 404 as for an unknown id.
#[utoipa::path(
    get,
    path = "/post/{id}/",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn post_detail(
    viewer: Option<AuthUser>,
    State(workflow): State<PostWorkflow>,
    Path(id): Path<String>,
) -> Result<Json<Post>, BlogError> {
    workflow.view(viewer.as_ref(), &id).await.map(Json)
}

/// post_new_form
///
/// [Authoring Route] An empty post form.
#[utoipa::path(
    get,
    path = "/post/new/",
    responses(
        (status = 200, description = "Empty form", body = PostForm),
        (status = 404, description = "Not Found")
    )
)]
pub async fn post_new_form(
    viewer: Option<AuthUser>,
    State(workflow): State<PostWorkflow>,
) -> Result<Json<PostForm>, BlogError> {
    workflow.new_form(viewer.as_ref()).map(Json)
}

/// post_new
///
/// [Authoring Route] Creates a draft authored by the requester and redirects to it.
/// A rejected submission is answered with 200 and the form plus its errors.
#[utoipa::path(
    post,
    path = "/post/new/",
    request_body(content = String, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Created, redirect to the post"),
        (status = 200, description = "Rejected, form with errors", body = PostForm),
        (status = 404, description = "Not Found")
    )
)]
pub async fn post_new(
    viewer: Option<AuthUser>,
    State(workflow): State<PostWorkflow>,
    body: Bytes,
) -> Result<Response, BlogError> {
    let post = workflow.create(viewer.as_ref(), &body).await?;
    Ok(redirect_to_post(&post))
}

/// post_edit_form
///
/// [Authoring Route] The form pre-filled with the post's current title and text.
#[utoipa::path(
    get,
    path = "/post/{id}/edit/",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Pre-filled form", body = PostForm),
        (status = 404, description = "Not Found")
    )
)]
pub async fn post_edit_form(
    viewer: Option<AuthUser>,
    State(workflow): State<PostWorkflow>,
    Path(id): Path<String>,
) -> Result<Json<PostForm>, BlogError> {
    workflow.edit_form(viewer.as_ref(), &id).await.map(Json)
}

/// post_edit
///
/// [Authoring Route] Replaces title and text, then redirects to the post.
/// Works the same for drafts and published posts.
#[utoipa::path(
    post,
    path = "/post/{id}/edit/",
    params(("id" = String, Path, description = "Post ID")),
    request_body(content = String, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Updated, redirect to the post"),
        (status = 200, description = "Rejected, form with errors", body = PostForm),
        (status = 404, description = "Not Found")
    )
)]
pub async fn post_edit(
    viewer: Option<AuthUser>,
    State(workflow): State<PostWorkflow>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, BlogError> {
    let post = workflow.edit(viewer.as_ref(), &id, &body).await?;
    Ok(redirect_to_post(&post))
}
