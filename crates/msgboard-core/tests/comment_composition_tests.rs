/// Comment composition (fixed post binding) and reply chains
mod common;

use common::{add_text_post, new_store};
use msgboard_core::errors::{BoardError, ExError, ExErrorKind};
use msgboard_core::ops::comment_ops;

#[test]
fn test_no_comment_without_post() {
    let (mut store, _clock) = new_store();
    let err = comment_ops::create_comment(&mut store, 1, "hi".to_string(), 42, None).unwrap_err();
    assert_eq!(err, BoardError::PostNotFound { post_id: 42 });
    assert!(store.comments().is_empty());
}

#[test]
fn test_comment_cannot_move_posts() {
    let (mut store, _clock) = new_store();
    add_text_post(&mut store, 1, None);
    add_text_post(&mut store, 2, None);
    comment_ops::create_comment(&mut store, 10, "hi".to_string(), 1, None).unwrap();

    let err = comment_ops::bind_to_post(&mut store, 10, 2).unwrap_err();
    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::ImmutableRelationship);
    assert_eq!(store.get_comment(10).unwrap().post_id(), 1);

    comment_ops::bind_to_post(&mut store, 10, 1).unwrap();
    assert_eq!(store.get_post(1).unwrap().comment_ids(), &[10]);
}

#[test]
fn test_reply_chain_is_mutually_consistent() {
    let (mut store, _clock) = new_store();
    add_text_post(&mut store, 1, None);
    comment_ops::create_comment(&mut store, 10, "root".to_string(), 1, None).unwrap();
    comment_ops::create_comment(&mut store, 11, "child".to_string(), 1, Some(10)).unwrap();
    comment_ops::create_comment(&mut store, 12, "grandchild".to_string(), 1, Some(11)).unwrap();

    assert_eq!(store.get_comment(10).unwrap().replies(), &[11]);
    assert_eq!(store.get_comment(11).unwrap().replies(), &[12]);
    assert_eq!(store.get_comment(12).unwrap().reply_to(), Some(11));

    // re-setting the same parent changes nothing
    comment_ops::set_reply_to(&mut store, 12, Some(11)).unwrap();
    assert_eq!(store.get_comment(11).unwrap().replies(), &[12]);
}

#[test]
fn test_self_reply_always_fails() {
    let (mut store, _clock) = new_store();
    add_text_post(&mut store, 1, None);
    comment_ops::create_comment(&mut store, 10, "root".to_string(), 1, None).unwrap();

    let err = comment_ops::set_reply_to(&mut store, 10, Some(10)).unwrap_err();
    assert_eq!(err, BoardError::SelfReply { comment_id: 10 });
    assert_eq!(store.get_comment(10).unwrap().reply_to(), None);
    assert!(store.get_comment(10).unwrap().replies().is_empty());
}

#[test]
fn test_reply_to_unknown_comment() {
    let (mut store, _clock) = new_store();
    add_text_post(&mut store, 1, None);
    let err = comment_ops::create_comment(&mut store, 10, "x".to_string(), 1, Some(99)).unwrap_err();
    assert_eq!(err, BoardError::CommentNotFound { comment_id: 99 });
    assert!(store.comments().is_empty());
    assert!(store.get_post(1).unwrap().comment_ids().is_empty());
}

#[test]
fn test_content_and_votes() {
    let (mut store, _clock) = new_store();
    add_text_post(&mut store, 1, None);
    comment_ops::create_comment(&mut store, 10, "x".to_string(), 1, None).unwrap();
    assert!(comment_ops::set_content(&mut store, 10, "  ".to_string()).is_err());
    comment_ops::set_content(&mut store, 10, "edited".to_string()).unwrap();
    assert_eq!(comment_ops::downvote(&mut store, 10).unwrap(), -1);
    assert_eq!(comment_ops::upvote(&mut store, 10).unwrap(), 0);
    assert_eq!(store.get_comment(10).unwrap().content(), "edited");
}
