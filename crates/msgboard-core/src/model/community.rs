use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kinds of moderation events recorded in a community's action log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    UserGivenModerator,
    RemovedModeratorRole,
    PostRemoved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: ModerationAction,
    pub description: String,
    pub at: DateTime<Utc>,
}

/// A named community
///
/// `post_ids` is the serialized side of the post association. The
/// subscriber map (username to subscription id) is a back-reference rebuilt
/// from the subscription extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) private: bool,
    /// Overrides the board-wide default when set
    #[serde(default)]
    pub(crate) moderator_cap: Option<usize>,
    #[serde(default)]
    pub(crate) moderator_usernames: Vec<String>,
    #[serde(default)]
    pub(crate) post_ids: Vec<i64>,
    #[serde(default)]
    pub(crate) actions: Vec<ActionRecord>,
    #[serde(skip)]
    pub(crate) subscribers: HashMap<String, i64>,
}

impl Community {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            description: None,
            private: false,
            moderator_cap: None,
            moderator_usernames: Vec::new(),
            post_ids: Vec::new(),
            actions: Vec::new(),
            subscribers: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn moderator_cap_override(&self) -> Option<usize> {
        self.moderator_cap
    }

    /// Cap in force: the community override, else `default_cap`
    pub fn effective_moderator_cap(&self, default_cap: usize) -> usize {
        self.moderator_cap.unwrap_or(default_cap)
    }

    pub fn moderator_usernames(&self) -> &[String] {
        &self.moderator_usernames
    }

    /// Post ids in the order they were added
    pub fn post_ids(&self) -> &[i64] {
        &self.post_ids
    }

    pub fn contains_post(&self, post_id: i64) -> bool {
        self.post_ids.contains(&post_id)
    }

    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Subscription id for `username`, if subscribed
    pub fn subscription_id_for(&self, username: &str) -> Option<i64> {
        self.subscribers.get(username).copied()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn add_post_id(&mut self, post_id: i64) {
        if !self.post_ids.contains(&post_id) {
            self.post_ids.push(post_id);
        }
    }

    pub(crate) fn remove_post_id(&mut self, post_id: i64) {
        self.post_ids.retain(|id| *id != post_id);
    }

    pub(crate) fn record_action(
        &mut self,
        action: ModerationAction,
        description: String,
        at: DateTime<Utc>,
    ) {
        self.actions.push(ActionRecord {
            action,
            description,
            at,
        });
    }
}
