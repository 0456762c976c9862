use chrono::{DateTime, Utc};

use super::store::Store;
use crate::errors::{BoardError, Result};
use crate::model::{ModerationAction, Subscription};
use crate::rules::attributes::{ensure_non_negative_id, ensure_not_future};

/// Number of moderator-flagged subscriptions in community `name`
///
/// # Errors
/// * `CommunityNotFound`
pub fn moderator_count(store: &Store, name: &str) -> Result<usize> {
    let community = store.get_community(name)?;
    Ok(community
        .subscribers
        .values()
        .filter_map(|id| store.subscriptions.get(id))
        .filter(|s| s.moderator)
        .count())
}

fn cap_for(store: &Store, name: &str) -> Result<usize> {
    Ok(store
        .get_community(name)?
        .effective_moderator_cap(store.config.default_moderator_cap))
}

/// Subscribe a member to a community
///
/// Wires the member's subscription list and the community's subscriber map.
/// A subscription created with `moderator = true` counts against the cap
/// like a promotion.
///
/// # Errors
/// * `InvalidId` / `AlreadyExists` - bad or duplicate id
/// * `UserNotFound` / `WrongUserKind` - `member_id` is not a member
/// * `CommunityNotFound`
/// * `DuplicateSubscription` - the member is already subscribed
/// * `ModeratorCapReached` - `moderator` requested with the cap reached
pub fn create_subscription(
    store: &mut Store,
    id: i64,
    member_id: i64,
    community: &str,
    moderator: bool,
) -> Result<i64> {
    ensure_non_negative_id("subscription", id)?;
    if store.subscriptions.contains(&id) {
        return Err(BoardError::AlreadyExists {
            entity: "subscription".to_string(),
            key: id.to_string(),
        });
    }
    store.get_member(member_id)?;
    let username = store.get_user(member_id)?.username.clone();
    if store
        .get_community(community)?
        .subscription_id_for(&username)
        .is_some()
    {
        return Err(BoardError::DuplicateSubscription {
            username,
            community: community.to_string(),
        });
    }
    if moderator {
        let cap = cap_for(store, community)?;
        if moderator_count(store, community)? >= cap {
            return Err(BoardError::ModeratorCapReached {
                community: community.to_string(),
                cap,
            });
        }
    }

    let subscription = Subscription::new(
        id,
        store.now(),
        moderator,
        member_id,
        community.to_string(),
    );
    store.subscriptions.register(subscription);
    store.get_member_mut(member_id)?.add_subscription_id(id);
    store
        .get_community_mut(community)?
        .subscribers
        .insert(username, id);

    tracing::debug!(
        subscription_id = id,
        user_id = member_id,
        community = %community,
        "registered subscription"
    );
    Ok(id)
}

/// Promote a subscription to moderator
///
/// Succeeds only while the community's moderator count is strictly below
/// its effective cap.
///
/// # Errors
/// * `SubscriptionNotFound`
/// * `AlreadyModerator`
/// * `ModeratorCapReached`
pub fn promote_to_moderator(store: &mut Store, subscription_id: i64) -> Result<()> {
    let subscription = store.get_subscription(subscription_id)?;
    if subscription.moderator {
        return Err(BoardError::AlreadyModerator { subscription_id });
    }
    let community = subscription.community.clone();
    let member_id = subscription.member_id;

    let cap = cap_for(store, &community)?;
    if moderator_count(store, &community)? >= cap {
        return Err(BoardError::ModeratorCapReached { community, cap });
    }

    store.get_subscription_mut(subscription_id)?.moderator = true;
    record(
        store,
        &community,
        ModerationAction::UserGivenModerator,
        member_id,
    )?;
    tracing::debug!(subscription_id, community = %community, "promoted to moderator");
    Ok(())
}

/// Demote a moderator subscription; never blocked by the cap
///
/// # Errors
/// * `SubscriptionNotFound`
/// * `NotModerator`
pub fn demote_from_moderator(store: &mut Store, subscription_id: i64) -> Result<()> {
    let subscription = store.get_subscription(subscription_id)?;
    if !subscription.moderator {
        return Err(BoardError::NotModerator { subscription_id });
    }
    let community = subscription.community.clone();
    let member_id = subscription.member_id;

    store.get_subscription_mut(subscription_id)?.moderator = false;
    record(
        store,
        &community,
        ModerationAction::RemovedModeratorRole,
        member_id,
    )?;
    tracing::debug!(subscription_id, community = %community, "demoted from moderator");
    Ok(())
}

fn record(
    store: &mut Store,
    community: &str,
    action: ModerationAction,
    member_id: i64,
) -> Result<()> {
    let username = store
        .users
        .get(&member_id)
        .map(|u| u.username.clone())
        .unwrap_or_else(|| member_id.to_string());
    let description = match action {
        ModerationAction::UserGivenModerator => format!("{} promoted to moderator", username),
        ModerationAction::RemovedModeratorRole => format!("{} demoted from moderator", username),
        ModerationAction::PostRemoved => format!("post removed by {}", username),
    };
    let now = store.now();
    store
        .get_community_mut(community)?
        .record_action(action, description, now);
    Ok(())
}

/// # Errors
/// * `SubscriptionNotFound`
/// * `FutureTimestamp`
pub fn set_joined_at(store: &mut Store, subscription_id: i64, joined_at: DateTime<Utc>) -> Result<()> {
    store.get_subscription(subscription_id)?;
    ensure_not_future("joined_at", joined_at, store.now())?;
    store.get_subscription_mut(subscription_id)?.joined_at = joined_at;
    Ok(())
}

/// Delete a subscription, detaching it from its member and community
///
/// # Errors
/// * `SubscriptionNotFound`
pub fn delete_subscription(store: &mut Store, subscription_id: i64) -> Result<()> {
    let subscription = store.get_subscription(subscription_id)?;
    let member_id = subscription.member_id;
    let community = subscription.community.clone();

    if let Some(profile) = store.users.get_mut(&member_id).and_then(|u| u.member_mut()) {
        profile.remove_subscription_id(subscription_id);
    }
    if let Some(c) = store.communities.get_mut(&community) {
        c.subscribers.retain(|_, id| *id != subscription_id);
    }

    store.subscriptions.remove(&subscription_id);
    tracing::debug!(subscription_id, "deleted subscription");
    Ok(())
}
