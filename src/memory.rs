use std::collections::BTreeMap;
use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{RepoError, RepoResult};
use crate::forms::PostInput;
use crate::models::{NewPost, Post, PostScope, User};
use crate::repository::Repository;

#[derive(Default)]
struct Tables {
    next_post_id: i64,
    next_user_id: i64,
    posts: BTreeMap<i64, Post>,
    users: BTreeMap<i64, User>,
}

/// MemoryRepository
///
/// An in-process `Repository` used by the test suites and for running the service
/// without Postgres. Ids start at 1 and are never reused. The title uniqueness
/// check runs under the same write lock as the insert/update.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn title_taken(tables: &Tables, title: &str, except: Option<i64>) -> bool {
    tables
        .posts
        .values()
        .any(|p| p.title == title && Some(p.id) != except)
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn title_exists(&self, title: &str) -> RepoResult<bool> {
        Ok(title_taken(&*self.tables.read().await, title, None))
    }

    async fn get_post(&self, id: i64) -> RepoResult<Option<Post>> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self, scope: PostScope) -> RepoResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| scope == PostScope::All || p.is_published())
            .cloned()
            .collect();
        // `Option` orders None first, so reversing puts drafts last.
        posts.sort_by_key(|p| Reverse((p.published_date, p.id)));
        Ok(posts)
    }

    async fn create_post(&self, new_post: NewPost) -> RepoResult<Post> {
        let mut tables = self.tables.write().await;
        if title_taken(&tables, &new_post.title, None) {
            return Err(RepoError::DuplicateTitle(new_post.title));
        }
        tables.next_post_id += 1;
        let post = Post {
            id: tables.next_post_id,
            author_id: new_post.author_id,
            title: new_post.title,
            text: new_post.text,
            created_date: Utc::now(),
            published_date: None,
        };
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: i64, input: PostInput) -> RepoResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&id) {
            return Ok(None);
        }
        if title_taken(&tables, &input.title, Some(id)) {
            return Err(RepoError::DuplicateTitle(input.title));
        }
        Ok(tables.posts.get_mut(&id).map(|post| {
            post.title = input.title;
            post.text = input.text;
            post.clone()
        }))
    }

    async fn publish_post(&self, id: i64, at: Option<DateTime<Utc>>) -> RepoResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        Ok(tables.posts.get_mut(&id).map(|post| {
            post.published_date = at;
            post.clone()
        }))
    }

    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_user(&self, username: &str, _password_hash: &str) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}
