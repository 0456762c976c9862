use std::collections::{HashMap, HashSet};

use crate::errors::BoardError;
use crate::ops::{rebuild_back_references, Store};
use crate::rules::attributes;

/// Find community post ids that name no post
///
/// Returns list of (community, post_id) tuples
pub fn find_dangling_post_refs(store: &Store) -> Vec<(String, i64)> {
    let mut dangling = Vec::new();
    for community in store.communities.iter() {
        for post_id in &community.post_ids {
            if !store.posts.contains(post_id) {
                dangling.push((community.name.clone(), *post_id));
            }
        }
    }
    dangling
}

/// Find posts listed by more than one community
///
/// Returns list of (post_id, communities) tuples
pub fn find_posts_in_multiple_communities(store: &Store) -> Vec<(i64, Vec<String>)> {
    let mut owners: HashMap<i64, Vec<String>> = HashMap::new();
    for community in store.communities.iter() {
        for post_id in &community.post_ids {
            owners
                .entry(*post_id)
                .or_default()
                .push(community.name.clone());
        }
    }
    let mut shared: Vec<(i64, Vec<String>)> = owners
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .collect();
    shared.sort_by_key(|(id, _)| *id);
    shared
}

/// Find comments whose post is missing
///
/// Returns list of (comment_id, post_id) tuples
pub fn find_comments_without_post(store: &Store) -> Vec<(i64, i64)> {
    store
        .comments
        .iter()
        .filter(|c| !store.posts.contains(&c.post_id))
        .map(|c| (c.id, c.post_id))
        .collect()
}

/// Find reply-to links naming a missing comment
///
/// Returns list of (comment_id, reply_to) tuples
pub fn find_dangling_reply_refs(store: &Store) -> Vec<(i64, i64)> {
    let mut dangling = Vec::new();
    for comment in store.comments.iter() {
        if let Some(parent) = comment.reply_to {
            if !store.comments.contains(&parent) {
                dangling.push((comment.id, parent));
            }
        }
    }
    dangling
}

pub fn find_self_replies(store: &Store) -> Vec<i64> {
    store
        .comments
        .iter()
        .filter(|c| c.reply_to == Some(c.id))
        .map(|c| c.id)
        .collect()
}

/// Find subscriptions whose member is missing or is not a member
///
/// Returns list of (subscription_id, member_id) tuples
pub fn find_subscriptions_without_member(store: &Store) -> Vec<(i64, i64)> {
    store
        .subscriptions
        .iter()
        .filter(|s| {
            store
                .users
                .get(&s.member_id)
                .map_or(true, |u| !u.is_member())
        })
        .map(|s| (s.id, s.member_id))
        .collect()
}

/// Returns list of (subscription_id, community) tuples
pub fn find_subscriptions_without_community(store: &Store) -> Vec<(i64, String)> {
    store
        .subscriptions
        .iter()
        .filter(|s| !store.communities.contains(&s.community))
        .map(|s| (s.id, s.community.clone()))
        .collect()
}

/// Find (member, community) pairs subscribed more than once
///
/// Returns list of (member_id, community) tuples
pub fn find_duplicate_subscriptions(store: &Store) -> Vec<(i64, String)> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for subscription in store.subscriptions.iter() {
        let pair = (subscription.member_id, subscription.community.clone());
        if !seen.insert(pair.clone()) {
            duplicates.push(pair);
        }
    }
    duplicates
}

/// Find communities whose moderators exceed the effective cap
///
/// Counts flagged subscriptions and listed usernames separately and
/// reports the larger.
///
/// Returns list of (community, moderators, cap) tuples
pub fn find_communities_over_cap(store: &Store) -> Vec<(String, usize, usize)> {
    let mut flagged: HashMap<&str, usize> = HashMap::new();
    for subscription in store.subscriptions.iter().filter(|s| s.moderator) {
        *flagged.entry(subscription.community.as_str()).or_insert(0) += 1;
    }

    let mut over = Vec::new();
    for community in store.communities.iter() {
        let cap = community.effective_moderator_cap(store.config.default_moderator_cap);
        let count = flagged
            .get(community.name.as_str())
            .copied()
            .unwrap_or(0)
            .max(community.moderator_usernames.len());
        if count > cap {
            over.push((community.name.clone(), count, cap));
        }
    }
    over
}

pub fn find_duplicate_usernames(store: &Store) -> Vec<String> {
    let mut seen = HashSet::new();
    store
        .users
        .iter()
        .filter(|u| !seen.insert(u.username.as_str()))
        .map(|u| u.username.clone())
        .collect()
}

/// Find scalar attributes that no constructor would have accepted
///
/// Covers ids, blank text and negative scores. Timestamps are not checked
/// since the clock may legitimately differ from the one that wrote them.
pub fn find_attribute_violations(store: &Store) -> Vec<BoardError> {
    let mut violations = Vec::new();
    let mut check = |result: crate::errors::Result<()>| {
        if let Err(e) = result {
            violations.push(e);
        }
    };

    for user in store.users.iter() {
        check(attributes::ensure_non_negative_id("user", user.id));
        check(attributes::ensure_non_blank("username", &user.username));
        if let Some(member) = user.member() {
            check(attributes::ensure_non_negative_score("post_score", member.post_score));
            check(attributes::ensure_non_negative_score(
                "comment_score",
                member.comment_score,
            ));
            check(attributes::ensure_score_sum_fits(
                member.post_score,
                member.comment_score,
            ));
            check(attributes::ensure_optional_non_blank("first_name", member.first_name()));
            check(attributes::ensure_optional_non_blank("last_name", member.last_name()));
            check(attributes::ensure_optional_non_blank("bio", member.bio()));
        }
    }
    for community in store.communities.iter() {
        check(attributes::ensure_non_blank("community name", &community.name));
        check(attributes::ensure_optional_non_blank(
            "description",
            community.description(),
        ));
        for username in &community.moderator_usernames {
            check(attributes::ensure_non_blank("username", username));
        }
    }
    for post in store.posts.iter() {
        check(attributes::ensure_non_negative_id("post", post.id));
        check(attributes::ensure_non_blank("title", &post.title));
    }
    for comment in store.comments.iter() {
        check(attributes::ensure_non_negative_id("comment", comment.id));
        check(attributes::ensure_non_blank("content", &comment.content));
    }
    for subscription in store.subscriptions.iter() {
        check(attributes::ensure_non_negative_id(
            "subscription",
            subscription.id,
        ));
    }
    violations
}

/// Find entities whose back-references disagree with the forward side
///
/// Compares the live graph with a freshly rebuilt copy. List order is
/// ignored; membership is not.
pub fn find_back_reference_mismatches(store: &Store) -> Vec<String> {
    let mut rebuilt = store.clone();
    rebuild_back_references(&mut rebuilt);

    fn sorted(ids: &[i64]) -> Vec<i64> {
        let mut v = ids.to_vec();
        v.sort_unstable();
        v
    }

    let mut mismatches = Vec::new();
    for post in store.posts.iter() {
        if let Some(expected) = rebuilt.posts.get(&post.id) {
            if post.community != expected.community {
                mismatches.push(format!("post {} community", post.id));
            }
            if sorted(&post.comment_ids) != sorted(&expected.comment_ids) {
                mismatches.push(format!("post {} comments", post.id));
            }
        }
    }
    for comment in store.comments.iter() {
        if let Some(expected) = rebuilt.comments.get(&comment.id) {
            if sorted(&comment.replies) != sorted(&expected.replies) {
                mismatches.push(format!("comment {} replies", comment.id));
            }
        }
    }
    for user in store.users.iter() {
        let expected = rebuilt.users.get(&user.id).and_then(|u| u.member());
        if let (Some(actual), Some(expected)) = (user.member(), expected) {
            if sorted(&actual.subscription_ids) != sorted(&expected.subscription_ids) {
                mismatches.push(format!("user {} subscriptions", user.id));
            }
        }
    }
    for community in store.communities.iter() {
        if let Some(expected) = rebuilt.communities.get(&community.name) {
            if community.subscribers != expected.subscribers {
                mismatches.push(format!("community {} subscribers", community.name));
            }
        }
    }
    mismatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{comment_ops, community_ops, post_ops, user_ops};

    #[test]
    fn test_clean_graph_has_no_findings() {
        let mut store = Store::new();
        community_ops::create_community(&mut store, "rust".to_string(), None, false).unwrap();
        user_ops::create_member(
            &mut store,
            1,
            "alice@example.com".to_string(),
            "alice".to_string(),
            "Password123".to_string(),
        )
        .unwrap();
        post_ops::create_text_post(&mut store, 7, "T".to_string(), "x".to_string(), false, Some("rust"))
            .unwrap();
        comment_ops::create_comment(&mut store, 20, "a".to_string(), 7, None).unwrap();

        assert!(find_dangling_post_refs(&store).is_empty());
        assert!(find_comments_without_post(&store).is_empty());
        assert!(find_duplicate_subscriptions(&store).is_empty());
        assert!(find_communities_over_cap(&store).is_empty());
        assert!(find_attribute_violations(&store).is_empty());
        assert!(find_back_reference_mismatches(&store).is_empty());
    }

    #[test]
    fn test_tampered_back_reference_detected() {
        let mut store = Store::new();
        post_ops::create_text_post(&mut store, 7, "T".to_string(), "x".to_string(), false, None)
            .unwrap();
        comment_ops::create_comment(&mut store, 20, "a".to_string(), 7, None).unwrap();
        store.posts.get_mut(&7).unwrap().comment_ids.clear();

        assert_eq!(
            find_back_reference_mismatches(&store),
            vec!["post 7 comments".to_string()]
        );
    }
}
