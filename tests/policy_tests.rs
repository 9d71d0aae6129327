use blog_portal::{BlogError, models::Post, policy};
use chrono::Utc;

fn published() -> Post {
    Post {
        id: 1,
        title: "Post01".to_string(),
        published_date: Some(Utc::now()),
        ..Post::default()
    }
}

fn draft() -> Post {
    Post {
        id: 2,
        title: "Post02".to_string(),
        ..Post::default()
    }
}

#[test]
fn test_published_posts_are_visible_to_everyone() {
    assert!(policy::can_view(&published(), true));
    assert!(policy::can_view(&published(), false));
}

#[test]
fn test_drafts_need_authentication() {
    assert!(policy::can_view(&draft(), true));
    assert!(!policy::can_view(&draft(), false));
}

#[test]
fn test_listing_is_open() {
    assert!(policy::can_list(true));
    assert!(policy::can_list(false));
}

#[test]
fn test_writes_need_authentication() {
    assert!(policy::can_create(true));
    assert!(!policy::can_create(false));
    assert!(policy::can_edit(true));
    assert!(!policy::can_edit(false));
}

#[test]
fn test_ensure_maps_refusal_to_denied() {
    assert!(policy::ensure(true).is_ok());
    let err = policy::ensure(false).unwrap_err();
    assert!(matches!(err, BlogError::Denied));
    assert!(err.is_not_found());
}
