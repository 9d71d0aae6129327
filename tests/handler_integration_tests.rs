use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use blog_portal::{
    BlogError, MemoryRepository, PostWorkflow,
    auth::AuthUser,
    forms::{PostForm, REQUIRED, TITLE_EXISTS},
    handlers,
    models::{NewPost, Post},
    repository::{Repository, RepositoryState},
};
use chrono::Utc;
use std::sync::Arc;
use tokio::test;

// --- TEST UTILITIES ---

struct Fixture {
    repo: RepositoryState,
    author: AuthUser,
}

impl Fixture {
    async fn new() -> Self {
        let repo: RepositoryState = Arc::new(MemoryRepository::new());
        let user = repo.create_user("user1", "!").await.unwrap();
        Self {
            repo,
            author: AuthUser {
                id: user.id,
                username: user.username,
            },
        }
    }

    fn workflow(&self) -> State<PostWorkflow> {
        State(PostWorkflow::new(self.repo.clone()))
    }

    fn logged_in(&self) -> Option<AuthUser> {
        Some(self.author.clone())
    }

    async fn post(&self, title: &str, published: bool) -> Post {
        let post = self
            .repo
            .create_post(NewPost {
                author_id: self.author.id,
                title: title.to_string(),
                text: "Hey".to_string(),
            })
            .await
            .unwrap();
        if published {
            self.repo
                .publish_post(post.id, Some(Utc::now()))
                .await
                .unwrap()
                .unwrap()
        } else {
            post
        }
    }
}

async fn form_body(response: axum::response::Response) -> PostForm {
    let (_parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// --- HANDLER TESTS ---

#[test]
async fn test_post_list_hides_drafts() {
    let fx = Fixture::new().await;
    fx.post("Post1", true).await;
    fx.post("Post2", false).await;

    let Json(list) = handlers::post_list(fx.logged_in(), fx.workflow()).await.unwrap();
    assert_eq!(list.count, 1);
    assert_eq!(list.posts[0].title, "Post1");

    let Json(list) = handlers::post_list(None, fx.workflow()).await.unwrap();
    assert_eq!(list.count, 1);
}

#[test]
async fn test_post_detail_published_is_public() {
    let fx = Fixture::new().await;
    let post = fx.post("Post01", true).await;

    let Json(found) = handlers::post_detail(None, fx.workflow(), Path(post.id.to_string()))
        .await
        .unwrap();
    assert_eq!(found, post);
}

#[test]
async fn test_post_detail_draft_denied_when_anonymous() {
    let fx = Fixture::new().await;
    let draft = fx.post("Post02", false).await;

    let result = handlers::post_detail(None, fx.workflow(), Path(draft.id.to_string())).await;
    assert!(matches!(result, Err(BlogError::Denied)));

    let Json(found) = handlers::post_detail(fx.logged_in(), fx.workflow(), Path(draft.id.to_string()))
        .await
        .unwrap();
    assert_eq!(found.id, draft.id);
}

#[test]
async fn test_post_detail_unknown_and_malformed_ids() {
    let fx = Fixture::new().await;

    for id in ["1000000", "!", "99999999999999999999999"] {
        let result = handlers::post_detail(fx.logged_in(), fx.workflow(), Path(id.to_string())).await;
        assert!(matches!(result, Err(BlogError::NotFound)), "id {id:?}");
    }
}

#[test]
async fn test_post_new_redirects_to_created_post() {
    let fx = Fixture::new().await;

    let response = handlers::post_new(
        fx.logged_in(),
        fx.workflow(),
        Bytes::from_static(b"title=new+title&text=new+text"),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();

    let created = fx.repo.list_posts(blog_portal::models::PostScope::All).await.unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].title, "new title");
    assert_eq!(created[0].text, "new text");
    assert_eq!(created[0].author_id, fx.author.id);
    assert!(created[0].published_date.is_none());
    assert_eq!(location, format!("/post/{}/", created[0].id));
}

#[test]
async fn test_post_new_empty_submission_rerenders_form() {
    let fx = Fixture::new().await;

    let result = handlers::post_new(fx.logged_in(), fx.workflow(), Bytes::new()).await;
    let response = result.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let form = form_body(response).await;
    assert_eq!(form.errors.field("title"), [REQUIRED]);
    assert_eq!(form.errors.field("text"), [REQUIRED]);
    assert_eq!(form.errors.len(), 2);
}

#[test]
async fn test_post_new_duplicate_title_rerenders_form() {
    let fx = Fixture::new().await;
    fx.post("Post01", false).await;

    let result = handlers::post_new(
        fx.logged_in(),
        fx.workflow(),
        Bytes::from_static(b"title=Post01&text=Good"),
    )
    .await;
    let response = result.unwrap_err().into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let form = form_body(response).await;
    assert_eq!(form.errors.non_field_errors(), [TITLE_EXISTS]);
    assert_eq!(form.title, "Post01");
    assert_eq!(form.text, "Good");
}

#[test]
async fn test_post_new_form_requires_login() {
    let fx = Fixture::new().await;

    let result = handlers::post_new_form(None, fx.workflow()).await;
    assert!(matches!(result, Err(BlogError::Denied)));

    let Json(form) = handlers::post_new_form(fx.logged_in(), fx.workflow()).await.unwrap();
    assert_eq!(form, PostForm::blank());
}

#[test]
async fn test_post_edit_form_prefilled() {
    let fx = Fixture::new().await;
    let post = fx.post("Post01", true).await;

    let Json(form) = handlers::post_edit_form(fx.logged_in(), fx.workflow(), Path(post.id.to_string()))
        .await
        .unwrap();
    assert_eq!(form.post_id, Some(post.id));
    assert_eq!(form.title, "Post01");
    assert_eq!(form.text, "Hey");
    assert!(form.errors.is_empty());
}

#[test]
async fn test_post_edit_saves_and_redirects() {
    let fx = Fixture::new().await;
    let draft = fx.post("Post02", false).await;

    let response = handlers::post_edit(
        fx.logged_in(),
        fx.workflow(),
        Path(draft.id.to_string()),
        Bytes::from_static(b"title=new+title&text=new+text"),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], format!("/post/{}/", draft.id));

    let stored = fx.repo.get_post(draft.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "new title");
    assert_eq!(stored.text, "new text");
    assert_eq!(stored.author_id, draft.author_id);
    assert_eq!(stored.published_date, None);
}

#[test]
async fn test_post_edit_anonymous_is_denied() {
    let fx = Fixture::new().await;
    let post = fx.post("Post01", true).await;

    let result = handlers::post_edit(
        None,
        fx.workflow(),
        Path(post.id.to_string()),
        Bytes::from_static(b"title=hijack&text=hijack"),
    )
    .await;
    assert!(matches!(result, Err(BlogError::Denied)));

    let stored = fx.repo.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Post01");
}
