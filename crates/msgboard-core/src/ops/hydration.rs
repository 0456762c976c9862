//! Back-reference reconstruction
//!
//! Only forward references are persisted: community post ids, comment post
//! id and reply-to, subscription member id and community name. After the
//! extents are replaced wholesale this pass derives every reverse
//! collection from them. Forward references to missing entities are
//! skipped here and reported by `rules::validation::validate_store`.

use super::store::Store;

/// Clear and rebuild every transient back-reference
///
/// Reply lists and post comment lists follow comment extent order, and a
/// member's subscription list follows subscription extent order.
pub fn rebuild_back_references(store: &mut Store) {
    clear_back_references(store);

    let community_posts: Vec<(String, Vec<i64>)> = store
        .communities
        .iter()
        .map(|c| (c.name.clone(), c.post_ids.clone()))
        .collect();
    for (name, post_ids) in community_posts {
        for post_id in post_ids {
            if let Some(post) = store.posts.get_mut(&post_id) {
                post.community = Some(name.clone());
            }
        }
    }

    let comment_links: Vec<(i64, i64, Option<i64>)> = store
        .comments
        .iter()
        .map(|c| (c.id, c.post_id, c.reply_to))
        .collect();
    for (comment_id, post_id, reply_to) in comment_links {
        if let Some(post) = store.posts.get_mut(&post_id) {
            post.add_comment_id(comment_id);
        }
        if let Some(parent) = reply_to.and_then(|id| store.comments.get_mut(&id)) {
            parent.add_reply(comment_id);
        }
    }

    let subscription_links: Vec<(i64, i64, String)> = store
        .subscriptions
        .iter()
        .map(|s| (s.id, s.member_id, s.community.clone()))
        .collect();
    for (subscription_id, member_id, community) in subscription_links {
        let Some(user) = store.users.get_mut(&member_id) else {
            continue;
        };
        let username = user.username.clone();
        if let Some(profile) = user.member_mut() {
            profile.add_subscription_id(subscription_id);
        }
        if let Some(c) = store.communities.get_mut(&community) {
            c.subscribers.entry(username).or_insert(subscription_id);
        }
    }

    tracing::debug!(
        posts = store.posts.len(),
        comments = store.comments.len(),
        subscriptions = store.subscriptions.len(),
        "rebuilt back-references"
    );
}

fn clear_back_references(store: &mut Store) {
    for post in store.posts.values_mut() {
        post.community = None;
        post.comment_ids.clear();
    }
    for comment in store.comments.values_mut() {
        comment.replies.clear();
    }
    for user in store.users.values_mut() {
        if let Some(profile) = user.member_mut() {
            profile.subscription_ids.clear();
        }
    }
    for community in store.communities.values_mut() {
        community.subscribers.clear();
    }
}
