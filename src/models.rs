use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The author/authentication subject stored in the `users` table.
/// The credential column is never loaded here; only the identity travels through the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// Post
///
/// A blog entry from the `posts` table. `title` is unique across all posts.
/// A post without a `published_date` is a draft and only visible to authenticated requesters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: i64,
    // FK to users.id
    pub author_id: i64,
    pub title: String,
    pub text: String,

    #[ts(type = "string")]
    pub created_date: DateTime<Utc>,
    // None means draft.
    #[ts(type = "string | null")]
    pub published_date: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_published(&self) -> bool {
        self.published_date.is_some()
    }
}

/// NewPost
///
/// Store-level insert payload. Built by the workflow after validation; the store
/// does not validate it again.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub title: String,
    pub text: String,
}

/// PostScope
///
/// Which posts a listing query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Only posts with a publish date (the public listing).
    Published,
    /// Drafts included.
    All,
}

// --- Response Schemas (Output) ---

/// PostList
///
/// Output schema for the front page (GET /). Published posts only, newest first.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostList {
    pub count: usize,
    pub posts: Vec<Post>,
}

impl From<Vec<Post>> for PostList {
    fn from(posts: Vec<Post>) -> Self {
        Self {
            count: posts.len(),
            posts,
        }
    }
}
