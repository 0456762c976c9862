mod common;

use chrono::Duration;
use common::{add_community, add_text_post, new_store, start};
use msgboard_core::errors::BoardError;
use msgboard_core::model::{PostContent, PostKind};
use msgboard_core::ops::{community_ops, post_ops};

#[test]
fn test_post_joins_community_on_both_sides() {
    let (mut store, _clock) = new_store();
    add_community(&mut store, "rust");
    add_text_post(&mut store, 1, Some("rust"));

    assert_eq!(store.get_post(1).unwrap().community(), Some("rust"));
    assert_eq!(store.get_community("rust").unwrap().post_ids(), &[1]);
}

#[test]
fn test_add_post_from_community_side() {
    let (mut store, _clock) = new_store();
    add_community(&mut store, "rust");
    add_community(&mut store, "go");
    add_text_post(&mut store, 1, None);

    community_ops::add_post(&mut store, "rust", 1).unwrap();
    community_ops::add_post(&mut store, "rust", 1).unwrap();
    assert_eq!(store.get_community("rust").unwrap().post_ids(), &[1]);

    community_ops::add_post(&mut store, "go", 1).unwrap();
    assert!(store.get_community("rust").unwrap().post_ids().is_empty());
    assert_eq!(store.get_community("go").unwrap().post_ids(), &[1]);
    assert_eq!(store.get_post(1).unwrap().community(), Some("go"));
}

#[test]
fn test_post_kinds() {
    let (mut store, _clock) = new_store();
    post_ops::create_text_post(&mut store, 1, "T".to_string(), "body".to_string(), true, None)
        .unwrap();
    post_ops::create_link_post(
        &mut store,
        2,
        "L".to_string(),
        vec!["https://rust-lang.org".to_string()],
        false,
        None,
    )
    .unwrap();
    post_ops::create_image_post(
        &mut store,
        3,
        "I".to_string(),
        vec!["https://img/a.png".to_string()],
        false,
        None,
    )
    .unwrap();

    assert_eq!(store.get_post(1).unwrap().kind(), PostKind::Text);
    assert!(store.get_post(1).unwrap().is_mature());
    assert_eq!(store.get_post(2).unwrap().kind(), PostKind::Link);
    assert_eq!(store.get_post(3).unwrap().kind(), PostKind::Image);
    assert_eq!(store.get_post(3).unwrap().created_at(), start());

    post_ops::add_image_url(&mut store, 3, "https://img/b.png".to_string()).unwrap();
    assert_eq!(
        store.get_post(3).unwrap().content(),
        &PostContent::Image {
            image_urls: vec![
                "https://img/a.png".to_string(),
                "https://img/b.png".to_string()
            ]
        }
    );
    assert!(matches!(
        post_ops::set_text(&mut store, 2, "nope".to_string()),
        Err(BoardError::WrongPostKind { .. })
    ));
    post_ops::set_text(&mut store, 1, "new body".to_string()).unwrap();
}

#[test]
fn test_invalid_posts_rejected_before_registration() {
    let (mut store, _clock) = new_store();
    assert!(post_ops::create_text_post(&mut store, 1, " ".to_string(), "b".to_string(), false, None).is_err());
    assert!(post_ops::create_text_post(&mut store, 1, "T".to_string(), " ".to_string(), false, None).is_err());
    assert!(post_ops::create_link_post(
        &mut store,
        1,
        "T".to_string(),
        vec!["".to_string()],
        false,
        None
    )
    .is_err());
    assert!(post_ops::create_text_post(&mut store, -3, "T".to_string(), "b".to_string(), false, None).is_err());
    assert!(store.posts().is_empty());

    add_text_post(&mut store, 1, None);
    assert!(matches!(
        post_ops::create_text_post(&mut store, 1, "T".to_string(), "b".to_string(), false, None),
        Err(BoardError::AlreadyExists { .. })
    ));
}

#[test]
fn test_created_at_not_in_future() {
    let (mut store, clock) = new_store();
    add_text_post(&mut store, 1, None);
    assert!(post_ops::set_created_at(&mut store, 1, start() + Duration::seconds(30)).is_err());
    clock.advance(Duration::minutes(1));
    post_ops::set_created_at(&mut store, 1, start() + Duration::seconds(30)).unwrap();
}

#[test]
fn test_delete_post_logs_action_in_community() {
    let (mut store, _clock) = new_store();
    add_community(&mut store, "rust");
    add_text_post(&mut store, 1, Some("rust"));
    post_ops::delete_post(&mut store, 1).unwrap();

    let community = store.get_community("rust").unwrap();
    assert!(community.post_ids().is_empty());
    assert_eq!(community.actions().len(), 1);
    assert!(community.actions()[0].description.contains("post 1"));
}

#[test]
fn test_votes_at_tally_limits_are_refused() {
    let (mut store, _clock) = new_store();
    add_text_post(&mut store, 1, None);
    msgboard_core::ops::comment_ops::create_comment(&mut store, 2, "hi".to_string(), 1, None)
        .unwrap();

    let mut contents = store.contents();
    let mut post = serde_json::to_value(&contents.posts[0]).unwrap();
    post["votes"] = serde_json::json!(i64::MAX);
    contents.posts[0] = serde_json::from_value(post).unwrap();
    let mut comment = serde_json::to_value(&contents.comments[0]).unwrap();
    comment["votes"] = serde_json::json!(i64::MIN);
    contents.comments[0] = serde_json::from_value(comment).unwrap();
    store.replace_extents(contents).unwrap();

    assert!(matches!(
        post_ops::upvote(&mut store, 1),
        Err(BoardError::VoteLimitReached { id: 1, .. })
    ));
    assert_eq!(store.get_post(1).unwrap().votes().score(), i64::MAX);
    assert_eq!(post_ops::downvote(&mut store, 1).unwrap(), i64::MAX - 1);

    assert!(matches!(
        msgboard_core::ops::comment_ops::downvote(&mut store, 2),
        Err(BoardError::VoteLimitReached { id: 2, .. })
    ));
    assert_eq!(store.get_comment(2).unwrap().votes().score(), i64::MIN);
}
