use super::{post_ops, store::Store, subscription_ops};
use crate::config;
use crate::errors::{BoardError, Result};
use crate::model::{Community, ModerationAction, Subscription};
use crate::rules::attributes::{ensure_non_blank, ensure_optional_non_blank};

/// Create and register a community
///
/// # Returns
/// The community name, which is its key
///
/// # Errors
/// * `BlankField` - blank name, or description provided but blank
/// * `AlreadyExists` - a community with this name exists
pub fn create_community(
    store: &mut Store,
    name: String,
    description: Option<String>,
    private: bool,
) -> Result<String> {
    ensure_non_blank("community name", &name)?;
    ensure_optional_non_blank("description", description.as_deref())?;
    if store.communities.contains(&name) {
        return Err(BoardError::AlreadyExists {
            entity: "community".to_string(),
            key: name,
        });
    }

    let mut community = Community::new(name.clone());
    community.description = description;
    community.private = private;
    store.communities.register(community);
    tracing::debug!(community = %name, "registered community");
    Ok(name)
}

/// # Errors
/// * `CommunityNotFound`
/// * `BlankField` - description provided but blank
pub fn set_description(store: &mut Store, name: &str, description: Option<String>) -> Result<()> {
    store.get_community(name)?;
    ensure_optional_non_blank("description", description.as_deref())?;
    store.get_community_mut(name)?.description = description;
    Ok(())
}

/// # Errors
/// * `CommunityNotFound`
pub fn set_private(store: &mut Store, name: &str, private: bool) -> Result<()> {
    store.get_community_mut(name)?.private = private;
    Ok(())
}

/// Set or clear the community's own moderator cap
///
/// `None` falls back to the board default. A cap below the number of
/// current moderators (flagged subscriptions or listed usernames) is refused.
///
/// # Errors
/// * `CommunityNotFound`
/// * `InvalidSetting` - cap below 1 or below the current moderator count
pub fn set_moderator_cap(store: &mut Store, name: &str, cap: Option<usize>) -> Result<()> {
    let community = store.get_community(name)?;
    if let Some(value) = cap {
        config::check_moderator_cap(value)?;
        let current = subscription_ops::moderator_count(store, name)?
            .max(community.moderator_usernames.len());
        if value < current {
            return Err(BoardError::InvalidSetting {
                setting: "moderator_cap".to_string(),
                reason: format!(
                    "community {} already has {} moderators",
                    community.name, current
                ),
            });
        }
    }
    store.get_community_mut(name)?.moderator_cap = cap;
    Ok(())
}

/// Cap in force for `name`
///
/// # Errors
/// * `CommunityNotFound`
pub fn effective_moderator_cap(store: &Store, name: &str) -> Result<usize> {
    Ok(store
        .get_community(name)?
        .effective_moderator_cap(store.config.default_moderator_cap))
}

/// Add a username to the community's moderator list
///
/// # Returns
/// `false` when the username was already listed (nothing changes)
///
/// # Errors
/// * `CommunityNotFound`
/// * `BlankField` - blank username
/// * `ModeratorCapReached` - the list is full
pub fn add_moderator_username(store: &mut Store, name: &str, username: String) -> Result<bool> {
    ensure_non_blank("username", &username)?;
    let cap = effective_moderator_cap(store, name)?;
    let community = store.get_community(name)?;
    if community.moderator_usernames.contains(&username) {
        return Ok(false);
    }
    if community.moderator_usernames.len() >= cap {
        return Err(BoardError::ModeratorCapReached {
            community: name.to_string(),
            cap,
        });
    }

    let now = store.now();
    let community = store.get_community_mut(name)?;
    community.record_action(
        ModerationAction::UserGivenModerator,
        format!("{} added to the moderator list", username),
        now,
    );
    community.moderator_usernames.push(username);
    Ok(true)
}

/// Subscription held by `username` in community `name`
///
/// # Errors
/// * `CommunityNotFound`
/// * `BlankField` - blank username
pub fn get_subscriber<'a>(
    store: &'a Store,
    name: &str,
    username: &str,
) -> Result<Option<&'a Subscription>> {
    ensure_non_blank("username", username)?;
    let community = store.get_community(name)?;
    Ok(community
        .subscription_id_for(username)
        .and_then(|id| store.subscriptions.get(&id)))
}

/// # Errors
/// * `CommunityNotFound`
pub fn is_subscribed(store: &Store, name: &str, username: &str) -> Result<bool> {
    Ok(store
        .get_community(name)?
        .subscription_id_for(username)
        .is_some())
}

/// Add a post to a community, moving it out of any previous one
///
/// Same as `post_ops::set_community(store, post_id, Some(name))`.
///
/// # Errors
/// * `CommunityNotFound`
/// * `PostNotFound`
pub fn add_post(store: &mut Store, name: &str, post_id: i64) -> Result<()> {
    post_ops::set_community(store, post_id, Some(name))
}

/// Delete a community
///
/// Deletes every subscription to it and detaches every post; the posts
/// themselves survive without a community.
///
/// # Errors
/// * `CommunityNotFound`
pub fn delete_community(store: &mut Store, name: &str) -> Result<()> {
    let community = store.get_community(name)?;
    let mut subscription_ids: Vec<i64> = community.subscribers.values().copied().collect();
    subscription_ids.sort_unstable();
    let post_ids = community.post_ids.clone();

    for subscription_id in subscription_ids {
        subscription_ops::delete_subscription(store, subscription_id)?;
    }
    for post_id in post_ids {
        post_ops::set_community(store, post_id, None)?;
    }

    store.communities.remove(&name.to_string());
    tracing::debug!(community = %name, "deleted community");
    Ok(())
}
