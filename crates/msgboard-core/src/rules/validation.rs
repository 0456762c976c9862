use crate::errors::{BoardError, Result};
use crate::ops::Store;

use super::invariants;

/// Validate the whole board graph
///
/// Runs every invariant check and returns the first violation found:
///
/// 1. Scalar attributes are within their constructor rules
/// 2. Usernames are unique
/// 3. Every forward reference names an existing entity of the right kind
/// 4. A post belongs to at most one community, a comment never replies to
///    itself, a (member, community) pair is subscribed at most once
/// 5. No community exceeds its moderator cap
/// 6. Back-references agree with the forward side
///
/// # Errors
/// The first violation. Call the individual `invariants::find_*` functions
/// for exhaustive reporting.
pub fn validate_store(store: &Store) -> Result<()> {
    if let Some(err) = invariants::find_attribute_violations(store).into_iter().next() {
        return Err(err);
    }

    if let Some(username) = invariants::find_duplicate_usernames(store).first() {
        return Err(BoardError::UsernameTaken {
            username: username.clone(),
        });
    }

    if let Some((community, post_id)) = invariants::find_dangling_post_refs(store).first() {
        return Err(BoardError::DanglingReference {
            from: format!("community {}", community),
            to: format!("post {}", post_id),
        });
    }

    if let Some((comment_id, post_id)) = invariants::find_comments_without_post(store).first() {
        return Err(BoardError::DanglingReference {
            from: format!("comment {}", comment_id),
            to: format!("post {}", post_id),
        });
    }

    if let Some((comment_id, parent)) = invariants::find_dangling_reply_refs(store).first() {
        return Err(BoardError::DanglingReference {
            from: format!("comment {}", comment_id),
            to: format!("comment {}", parent),
        });
    }

    if let Some((subscription_id, member_id)) =
        invariants::find_subscriptions_without_member(store).first()
    {
        return Err(BoardError::DanglingReference {
            from: format!("subscription {}", subscription_id),
            to: format!("member {}", member_id),
        });
    }

    if let Some((subscription_id, community)) =
        invariants::find_subscriptions_without_community(store).first()
    {
        return Err(BoardError::DanglingReference {
            from: format!("subscription {}", subscription_id),
            to: format!("community {}", community),
        });
    }

    if let Some((post_id, communities)) =
        invariants::find_posts_in_multiple_communities(store).first()
    {
        return Err(BoardError::RelationshipInconsistent {
            reason: format!(
                "post {} listed by communities {}",
                post_id,
                communities.join(", ")
            ),
        });
    }

    if let Some(comment_id) = invariants::find_self_replies(store).first() {
        return Err(BoardError::SelfReply {
            comment_id: *comment_id,
        });
    }

    if let Some((member_id, community)) = invariants::find_duplicate_subscriptions(store).first() {
        let username = store
            .users
            .get(member_id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| member_id.to_string());
        return Err(BoardError::DuplicateSubscription {
            username,
            community: community.clone(),
        });
    }

    if let Some((community, _, cap)) = invariants::find_communities_over_cap(store).first() {
        return Err(BoardError::ModeratorCapReached {
            community: community.clone(),
            cap: *cap,
        });
    }

    if let Some(reason) = invariants::find_back_reference_mismatches(store).first() {
        return Err(BoardError::RelationshipInconsistent {
            reason: format!("{} out of step with forward references", reason),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Community, Subscription};
    use crate::ops::{user_ops, ExtentContents};

    #[test]
    fn test_empty_store_is_valid() {
        assert!(validate_store(&Store::new()).is_ok());
    }

    #[test]
    fn test_dangling_post_ref_reported() {
        let mut store = Store::new();
        let mut community = Community::new("rust".to_string());
        community.post_ids.push(42);
        store
            .replace_extents(ExtentContents {
                communities: vec![community],
                ..ExtentContents::default()
            })
            .unwrap();
        assert!(matches!(
            validate_store(&store),
            Err(BoardError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_duplicate_pair_reported() {
        let mut store = Store::new();
        user_ops::create_member(
            &mut store,
            1,
            "alice@example.com".to_string(),
            "alice".to_string(),
            "Password123".to_string(),
        )
        .unwrap();
        let mut contents = store.contents();
        let at = store.now();
        contents.communities.push(Community::new("rust".to_string()));
        contents.subscriptions = vec![
            Subscription::new(1, at, false, 1, "rust".to_string()),
            Subscription::new(2, at, false, 1, "rust".to_string()),
        ];
        store.replace_extents(contents).unwrap();
        assert!(matches!(
            validate_store(&store),
            Err(BoardError::DuplicateSubscription { .. })
        ));
    }
}
