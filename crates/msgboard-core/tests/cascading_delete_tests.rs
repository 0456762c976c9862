/// Deleting a post removes its comments and unwinds reply chains first
mod common;

use common::{add_community, add_text_post, new_store};
use msgboard_core::ops::{comment_ops, post_ops};
use msgboard_core::rules::validate_store;

#[test]
fn test_delete_post_with_reply_chain() {
    // GIVEN post P with comment A and comment B replying to A
    let (mut store, _clock) = new_store();
    add_text_post(&mut store, 1, None);
    comment_ops::create_comment(&mut store, 10, "A".to_string(), 1, None).unwrap();
    comment_ops::create_comment(&mut store, 11, "B".to_string(), 1, Some(10)).unwrap();
    assert_eq!(store.get_comment(10).unwrap().replies(), &[11]);

    // WHEN A is deleted on its own
    let mut probe = store.clone();
    comment_ops::delete_comment(&mut probe, 10).unwrap();
    // THEN B survives without a parent
    assert_eq!(probe.get_comment(11).unwrap().reply_to(), None);

    // WHEN P is deleted
    post_ops::delete_post(&mut store, 1).unwrap();

    // THEN both comments and the post are gone
    assert!(store.get_post(1).is_err());
    assert!(store.get_comment(10).is_err());
    assert!(store.get_comment(11).is_err());
    assert!(store.comments().is_empty());
    assert!(validate_store(&store).is_ok());
}

#[test]
fn test_delete_post_leaves_other_posts_alone() {
    let (mut store, _clock) = new_store();
    add_community(&mut store, "rust");
    add_text_post(&mut store, 1, Some("rust"));
    add_text_post(&mut store, 2, Some("rust"));
    comment_ops::create_comment(&mut store, 10, "on 1".to_string(), 1, None).unwrap();
    comment_ops::create_comment(&mut store, 20, "on 2".to_string(), 2, None).unwrap();
    // a reply across posts is detached, not deleted
    comment_ops::create_comment(&mut store, 21, "on 2 replying to 10".to_string(), 2, Some(10))
        .unwrap();

    post_ops::delete_post(&mut store, 1).unwrap();

    assert_eq!(store.comments().keys(), &[20, 21]);
    assert_eq!(store.get_comment(21).unwrap().reply_to(), None);
    assert_eq!(store.get_post(2).unwrap().comment_ids(), &[20, 21]);
    assert_eq!(store.get_community("rust").unwrap().post_ids(), &[2]);
    assert!(validate_store(&store).is_ok());
}

#[test]
fn test_delete_missing_post_fails_without_changes() {
    let (mut store, _clock) = new_store();
    add_text_post(&mut store, 1, None);
    assert!(post_ops::delete_post(&mut store, 2).is_err());
    assert_eq!(store.posts().len(), 1);
}
