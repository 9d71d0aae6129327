//! Visibility Policy
//!
//! Pure decisions about what a requester may see or change, given only whether
//! they are authenticated. Any authenticated user may edit any post; there is no
//! per-author distinction.

use crate::error::BlogError;
use crate::models::Post;

/// Published posts are public. Drafts are visible to any authenticated requester.
pub fn can_view(post: &Post, is_authenticated: bool) -> bool {
    post.is_published() || is_authenticated
}

/// The listing itself is open to everyone; it only ever contains published posts.
pub fn can_list(_is_authenticated: bool) -> bool {
    true
}

pub fn can_create(is_authenticated: bool) -> bool {
    is_authenticated
}

pub fn can_edit(is_authenticated: bool) -> bool {
    is_authenticated
}

/// Turns a policy decision into the workflow's `Denied` outcome.
pub fn ensure(allowed: bool) -> Result<(), BlogError> {
    if allowed {
        Ok(())
    } else {
        Err(BlogError::Denied)
    }
}
