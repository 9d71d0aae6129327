use crate::error::{RepoError, RepoResult};
use crate::forms::PostInput;
use crate::models::{NewPost, Post, PostScope, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

/// Repository Trait
///
/// The Post Store contract. Handlers and the workflow only see this trait, so the
/// Postgres implementation and the in-memory one are interchangeable.
///
/// Mutations do not validate their input; that is the workflow's job. The one rule
/// enforced here is title uniqueness, which every implementation must check atomically
/// with the write and report as `RepoError::DuplicateTitle`.
///
/// **Send + Sync + async_trait** are required to share `Arc<dyn Repository>` across
/// Axum's request tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Post Queries ---
    /// Exact, case-sensitive match against every post, drafts included.
    async fn title_exists(&self, title: &str) -> RepoResult<bool>;
    async fn get_post(&self, id: i64) -> RepoResult<Option<Post>>;
    /// Newest `published_date` first, ties broken by descending id.
    /// Drafts (scope `All`) sort after published posts.
    async fn list_posts(&self, scope: PostScope) -> RepoResult<Vec<Post>>;

    // --- Post Mutations ---
    /// Inserts a draft (`published_date` unset).
    async fn create_post(&self, new_post: NewPost) -> RepoResult<Post>;
    /// Replaces title and text. Author and publish state are untouched.
    async fn update_post(&self, id: i64, input: PostInput) -> RepoResult<Option<Post>>;
    /// Sets or clears the publish date.
    async fn publish_post(&self, id: i64, at: Option<DateTime<Utc>>) -> RepoResult<Option<Post>>;

    // --- User/Auth ---
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;
    async fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const POST_COLUMNS: &str = "id, author_id, title, text, created_date, published_date";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Title uniqueness is the `posts_title_key` constraint.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a unique violation on insert/update to `DuplicateTitle`.
fn title_conflict(e: sqlx::Error, title: &str) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::DuplicateTitle(title.to_string())
        }
        _ => RepoError::Database(e),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn title_exists(&self, title: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE title = $1)")
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get_post(&self, id: i64) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    /// list_posts
    ///
    /// The `Published` scope is the only filter the public listing relies on, so it is
    /// applied in SQL rather than after fetching.
    async fn list_posts(&self, scope: PostScope) -> RepoResult<Vec<Post>> {
        let filter = match scope {
            PostScope::Published => "WHERE published_date IS NOT NULL",
            PostScope::All => "",
        };
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts {filter} \
             ORDER BY published_date DESC NULLS LAST, id DESC"
        );
        let posts = sqlx::query_as::<_, Post>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn create_post(&self, new_post: NewPost) -> RepoResult<Post> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (author_id, title, text, created_date) \
             VALUES ($1, $2, $3, NOW()) RETURNING {POST_COLUMNS}"
        ))
        .bind(new_post.author_id)
        .bind(&new_post.title)
        .bind(&new_post.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| title_conflict(e, &new_post.title))
    }

    async fn update_post(&self, id: i64, input: PostInput) -> RepoResult<Option<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET title = $2, text = $3 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.text)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| title_conflict(e, &input.title))
    }

    async fn publish_post(&self, id: i64, at: Option<DateTime<Utc>>) -> RepoResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "UPDATE posts SET published_date = $2 WHERE id = $1 RETURNING {POST_COLUMNS}"
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(post)
    }

    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id, username",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}
