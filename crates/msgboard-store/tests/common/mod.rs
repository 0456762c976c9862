use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use msgboard_core::ops::{comment_ops, community_ops, post_ops, subscription_ops, user_ops};
use msgboard_core::{FixedClock, Store};

#[allow(dead_code)]
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn new_store() -> Store {
    Store::new().with_clock(Arc::new(FixedClock::new(start())))
}

/// Board with every entity kind and every relationship populated
///
/// - members alice (1), bob (2), carol (3); administrator root (10);
///   moderator account watcher (11)
/// - community "rust" (cap 2) holding posts 100 and 101; "empty" has none
/// - post 102 belongs to no community
/// - comments 200 <- 201 <- 202 on post 100, comment 203 on post 101
/// - subscriptions 300 (alice, moderator), 301 (bob), 302 (alice, empty)
#[allow(dead_code)]
pub fn populated_store() -> Store {
    let mut store = new_store();
    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        user_ops::create_member(
            &mut store,
            id,
            format!("{}@example.com", name),
            name.to_string(),
            "Password123".to_string(),
        )
        .expect("member");
    }
    user_ops::create_administrator(
        &mut store,
        10,
        "root@example.com".to_string(),
        "root".to_string(),
        "Password123".to_string(),
    )
    .expect("administrator");
    user_ops::create_moderator(
        &mut store,
        11,
        "watcher@example.com".to_string(),
        "watcher".to_string(),
        "Password123".to_string(),
        start(),
    )
    .expect("moderator account");

    community_ops::create_community(
        &mut store,
        "rust".to_string(),
        Some("Systems programming".to_string()),
        false,
    )
    .expect("community");
    community_ops::set_moderator_cap(&mut store, "rust", Some(2)).expect("cap");
    community_ops::create_community(&mut store, "empty".to_string(), None, true)
        .expect("community");

    post_ops::create_text_post(
        &mut store,
        100,
        "Hello".to_string(),
        "first post".to_string(),
        false,
        Some("rust"),
    )
    .expect("post");
    post_ops::create_link_post(
        &mut store,
        101,
        "Links".to_string(),
        vec!["https://www.rust-lang.org".to_string()],
        false,
        Some("rust"),
    )
    .expect("post");
    post_ops::create_image_post(
        &mut store,
        102,
        "Pictures".to_string(),
        vec!["https://example.com/a.png".to_string()],
        true,
        None,
    )
    .expect("post");
    post_ops::upvote(&mut store, 100).expect("vote");

    comment_ops::create_comment(&mut store, 200, "top".to_string(), 100, None).expect("comment");
    comment_ops::create_comment(&mut store, 201, "reply".to_string(), 100, Some(200))
        .expect("comment");
    comment_ops::create_comment(&mut store, 202, "nested".to_string(), 100, Some(201))
        .expect("comment");
    comment_ops::create_comment(&mut store, 203, "other".to_string(), 101, None).expect("comment");

    subscription_ops::create_subscription(&mut store, 300, 1, "rust", true).expect("subscription");
    subscription_ops::create_subscription(&mut store, 301, 2, "rust", false)
        .expect("subscription");
    subscription_ops::create_subscription(&mut store, 302, 1, "empty", false)
        .expect("subscription");

    store
}

/// Names of every entry in `dir`
#[allow(dead_code)]
pub fn dir_entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
