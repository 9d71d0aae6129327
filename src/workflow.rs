use crate::{
    auth::AuthUser,
    error::{BlogError, RepoError, RepoResult},
    forms::{FormErrors, PostForm, PostFormData, PostInput, TITLE_EXISTS},
    models::{NewPost, Post, PostList, PostScope},
    policy,
    repository::{Repository, RepositoryState},
};

/// PostWorkflow
///
/// The four post operations (list, view, create, edit). Each one consults the
/// Visibility Policy, talks to the store, and reports either data or a `BlogError`.
/// Writes go through a two-stage pipeline before anything is persisted: decoding and
/// field cleaning (`PostFormData::clean`), then the business rules in `validate_new_post`.
#[derive(Clone)]
pub struct PostWorkflow {
    repo: RepositoryState,
}

/// Parses a raw path segment. Only plain digits name a post; signs, other characters
/// and out-of-range ids are simply not found.
pub fn parse_post_id(raw: &str) -> Result<i64, BlogError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BlogError::NotFound);
    }
    raw.parse::<i64>().map_err(|_| BlogError::NotFound)
}

/// Title-uniqueness rule, applied on create only. Drafts count.
///
/// The outer `Result` is the store lookup, the inner one the rule's verdict.
pub async fn validate_new_post(
    repo: &dyn Repository,
    input: &PostInput,
) -> RepoResult<Result<(), FormErrors>> {
    if repo.title_exists(&input.title).await? {
        return Ok(Err(FormErrors::non_field(TITLE_EXISTS)));
    }
    Ok(Ok(()))
}

impl PostWorkflow {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// list
    ///
    /// Published posts only, newest first, for every requester.
    pub async fn list(&self, viewer: Option<&AuthUser>) -> Result<PostList, BlogError> {
        policy::ensure(policy::can_list(viewer.is_some()))?;
        let posts = self.repo.list_posts(PostScope::Published).await?;
        Ok(PostList::from(posts))
    }

    /// view
    ///
    /// Drafts are only returned to authenticated requesters; anyone else gets `Denied`.
    pub async fn view(&self, viewer: Option<&AuthUser>, raw_id: &str) -> Result<Post, BlogError> {
        let post = self.find(raw_id).await?;
        if !policy::can_view(&post, viewer.is_some()) {
            tracing::debug!(post_id = post.id, "draft hidden from anonymous requester");
            return Err(BlogError::Denied);
        }
        Ok(post)
    }

    pub fn new_form(&self, viewer: Option<&AuthUser>) -> Result<PostForm, BlogError> {
        policy::ensure(policy::can_create(viewer.is_some()))?;
        Ok(PostForm::blank())
    }

    /// create
    ///
    /// The author is the requester and the post starts as a draft.
    /// A rejected submission comes back as `BlogError::Invalid` and nothing is stored.
    pub async fn create(&self, viewer: Option<&AuthUser>, body: &[u8]) -> Result<Post, BlogError> {
        policy::ensure(policy::can_create(viewer.is_some()))?;
        let author = viewer.ok_or(BlogError::Denied)?;

        let data = decode(None, body)?;
        let input = data
            .clean()
            .map_err(|errors| BlogError::Invalid(PostForm::bound(None, &data, errors)))?;
        validate_new_post(self.repo.as_ref(), &input)
            .await?
            .map_err(|errors| BlogError::Invalid(PostForm::bound(None, &data, errors)))?;

        let new_post = NewPost {
            author_id: author.id,
            title: input.title,
            text: input.text,
        };
        match self.repo.create_post(new_post).await {
            Ok(post) => {
                tracing::info!(post_id = post.id, author_id = author.id, "post created");
                Ok(post)
            }
            Err(RepoError::DuplicateTitle(_)) => Err(title_exists(None, &data)),
            Err(e) => Err(e.into()),
        }
    }

    /// edit_form
    ///
    /// The policy is consulted before the lookup, so an anonymous requester learns
    /// nothing about which ids exist.
    pub async fn edit_form(&self, viewer: Option<&AuthUser>, raw_id: &str) -> Result<PostForm, BlogError> {
        policy::ensure(policy::can_edit(viewer.is_some()))?;
        let post = self.find(raw_id).await?;
        Ok(PostForm::for_post(&post))
    }

    /// edit
    ///
    /// Same for drafts and published posts. Only the title and text change.
    pub async fn edit(
        &self,
        viewer: Option<&AuthUser>,
        raw_id: &str,
        body: &[u8],
    ) -> Result<Post, BlogError> {
        policy::ensure(policy::can_edit(viewer.is_some()))?;
        let post = self.find(raw_id).await?;

        let data = decode(Some(post.id), body)?;

        let input = data
            .clean()
            .map_err(|errors| BlogError::Invalid(PostForm::bound(Some(post.id), &data, errors)))?;

        match self.repo.update_post(post.id, input).await {
            Ok(Some(updated)) => {
                tracing::info!(post_id = updated.id, "post edited");
                Ok(updated)
            }
            Ok(None) => Err(BlogError::NotFound),
            Err(RepoError::DuplicateTitle(_)) => Err(title_exists(Some(post.id), &data)),
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, raw_id: &str) -> Result<Post, BlogError> {
        let id = parse_post_id(raw_id)?;
        self.repo.get_post(id).await?.ok_or_else(|| {
            tracing::debug!(post_id = id, "no such post");
            BlogError::NotFound
        })
    }
}

/// Decode stage. An undecodable body re-displays an empty form with the error.
fn decode(post_id: Option<i64>, body: &[u8]) -> Result<PostFormData, BlogError> {
    PostFormData::from_urlencoded(body)
        .map_err(|errors| BlogError::Invalid(PostForm::bound(post_id, &PostFormData::default(), errors)))
}

fn title_exists(post_id: Option<i64>, data: &PostFormData) -> BlogError {
    BlogError::Invalid(PostForm::bound(post_id, data, FormErrors::non_field(TITLE_EXISTS)))
}
