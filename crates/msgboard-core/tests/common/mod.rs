use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use msgboard_core::ops::{community_ops, post_ops, user_ops};
use msgboard_core::{FixedClock, Store};

/// Instant every test store starts at
#[allow(dead_code)]
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Create an empty store pinned to `start()`
///
/// The clock handle is returned so tests can move time forward.
#[allow(dead_code)]
pub fn new_store() -> (Store, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(start()));
    let store = Store::new().with_clock(clock.clone());
    (store, clock)
}

/// Create a member with a derived email and a valid password
#[allow(dead_code)]
pub fn add_member(store: &mut Store, id: i64, username: &str) -> i64 {
    user_ops::create_member(
        store,
        id,
        format!("{}@example.com", username),
        username.to_string(),
        "Password123".to_string(),
    )
    .expect("member should be created")
}

#[allow(dead_code)]
pub fn add_administrator(store: &mut Store, id: i64, username: &str) -> i64 {
    user_ops::create_administrator(
        store,
        id,
        format!("{}@example.com", username),
        username.to_string(),
        "Password123".to_string(),
    )
    .expect("administrator should be created")
}

#[allow(dead_code)]
pub fn add_community(store: &mut Store, name: &str) -> String {
    community_ops::create_community(store, name.to_string(), None, false)
        .expect("community should be created")
}

#[allow(dead_code)]
pub fn add_text_post(store: &mut Store, id: i64, community: Option<&str>) -> i64 {
    post_ops::create_text_post(
        store,
        id,
        format!("Post {}", id),
        "body".to_string(),
        false,
        community,
    )
    .expect("post should be created")
}
