use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{self, BoardConfig};
use crate::errors::{BoardError, Result};
use crate::model::{Comment, Community, MemberProfile, Post, Subscription, User, UserRole};
use crate::ops::extent::{Extent, Keyed};
use crate::policy::{Clock, CredentialPolicy, SimpleCredentialPolicy, SystemClock};

impl Keyed for User {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Community {
    type Key = String;

    fn key(&self) -> String {
        self.name.clone()
    }
}

impl Keyed for Post {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Comment {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Subscription {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }
}

/// Owned contents of every extent, in persistence order
///
/// Produced by `Store::contents` for snapshotting and consumed by
/// `Store::replace_extents` on load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtentContents {
    pub users: Vec<User>,
    pub communities: Vec<Community>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub subscriptions: Vec<Subscription>,
}

impl ExtentContents {
    /// Total number of entities across all kinds
    pub fn entity_count(&self) -> usize {
        self.users.len()
            + self.communities.len()
            + self.posts.len()
            + self.comments.len()
            + self.subscriptions.len()
    }
}

/// In-memory board state
///
/// Holds one extent per entity kind plus the injected clock, credential
/// policy and configuration. Not thread-safe; one caller mutates the graph
/// at a time. Extents are only exposed read-only; every mutation goes
/// through the `*_ops` modules so both sides of a relationship stay in step.
#[derive(Clone)]
pub struct Store {
    pub(crate) config: BoardConfig,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) credentials: Arc<dyn CredentialPolicy>,
    pub(crate) users: Extent<User>,
    pub(crate) communities: Extent<Community>,
    pub(crate) posts: Extent<Post>,
    pub(crate) comments: Extent<Comment>,
    pub(crate) subscriptions: Extent<Subscription>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("users", &self.users.len())
            .field("communities", &self.communities.len())
            .field("posts", &self.posts.len())
            .field("comments", &self.comments.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create an empty store with default configuration and the wall clock
    pub fn new() -> Self {
        Self {
            config: BoardConfig::default(),
            clock: Arc::new(SystemClock),
            credentials: Arc::new(SimpleCredentialPolicy),
            users: Extent::new(),
            communities: Extent::new(),
            posts: Extent::new(),
            comments: Extent::new(),
            subscriptions: Extent::new(),
        }
    }

    /// Create an empty store using `config`
    ///
    /// # Errors
    /// * `InvalidSetting` - a configuration value is out of range
    pub fn with_config(config: BoardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Replace the clock used for "now"
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the credential format rules
    pub fn with_credential_policy(mut self, policy: Arc<dyn CredentialPolicy>) -> Self {
        self.credentials = policy;
        self
    }

    /// Empty store sharing this store's configuration and collaborators
    pub fn empty_like(&self) -> Self {
        Self {
            config: self.config.clone(),
            clock: Arc::clone(&self.clock),
            credentials: Arc::clone(&self.credentials),
            users: Extent::new(),
            communities: Extent::new(),
            posts: Extent::new(),
            comments: Extent::new(),
            subscriptions: Extent::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Change the minimum password length for future credential checks
    ///
    /// # Errors
    /// * `InvalidSetting` - below the accepted floor
    pub fn set_password_min_length(&mut self, value: usize) -> Result<()> {
        config::check_password_min_length(value)?;
        self.config.password_min_length = value;
        Ok(())
    }

    /// Change the moderator cap used by communities without an override
    ///
    /// Refused when a community that follows the default already has more
    /// moderators (flagged subscriptions or listed usernames) than `value`.
    ///
    /// # Errors
    /// * `InvalidSetting` - cap below 1 or below a live moderator count
    pub fn set_default_moderator_cap(&mut self, value: usize) -> Result<()> {
        config::check_moderator_cap(value)?;

        let mut flagged: HashMap<&str, usize> = HashMap::new();
        for subscription in self.subscriptions.iter().filter(|s| s.moderator) {
            *flagged.entry(subscription.community.as_str()).or_insert(0) += 1;
        }
        for community in self
            .communities
            .iter()
            .filter(|c| c.moderator_cap.is_none())
        {
            let current = flagged
                .get(community.name.as_str())
                .copied()
                .unwrap_or(0)
                .max(community.moderator_usernames.len());
            if value < current {
                return Err(BoardError::InvalidSetting {
                    setting: "default_moderator_cap".to_string(),
                    reason: format!(
                        "community {} already has {} moderators",
                        community.name, current
                    ),
                });
            }
        }

        self.config.default_moderator_cap = value;
        Ok(())
    }

    // ===== Read-only extents =====

    pub fn users(&self) -> &Extent<User> {
        &self.users
    }

    pub fn communities(&self) -> &Extent<Community> {
        &self.communities
    }

    pub fn posts(&self) -> &Extent<Post> {
        &self.posts
    }

    pub fn comments(&self) -> &Extent<Comment> {
        &self.comments
    }

    pub fn subscriptions(&self) -> &Extent<Subscription> {
        &self.subscriptions
    }

    /// Users of one concrete kind, in extent order
    pub fn users_with_role(&self, role: UserRole) -> Vec<&User> {
        self.users.iter().filter(|u| u.role() == role).collect()
    }

    pub fn members(&self) -> Vec<&User> {
        self.users_with_role(UserRole::Member)
    }

    pub fn administrators(&self) -> Vec<&User> {
        self.users_with_role(UserRole::Administrator)
    }

    pub fn moderators(&self) -> Vec<&User> {
        self.users_with_role(UserRole::Moderator)
    }

    // ===== Lookups =====

    /// # Errors
    /// * `UserNotFound`
    pub fn get_user(&self, id: i64) -> Result<&User> {
        self.users
            .get(&id)
            .ok_or(BoardError::UserNotFound { user_id: id })
    }

    pub(crate) fn get_user_mut(&mut self, id: i64) -> Result<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or(BoardError::UserNotFound { user_id: id })
    }

    /// Member attributes of user `id`
    ///
    /// # Errors
    /// * `UserNotFound`
    /// * `WrongUserKind` - the user is not a member
    pub fn get_member(&self, id: i64) -> Result<&MemberProfile> {
        self.get_user(id)?
            .member()
            .ok_or_else(|| BoardError::WrongUserKind {
                user_id: id,
                expected: UserRole::Member.as_str().to_string(),
            })
    }

    pub(crate) fn get_member_mut(&mut self, id: i64) -> Result<&mut MemberProfile> {
        self.get_user_mut(id)?
            .member_mut()
            .ok_or_else(|| BoardError::WrongUserKind {
                user_id: id,
                expected: UserRole::Member.as_str().to_string(),
            })
    }

    /// Look a user up by username
    pub fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// # Errors
    /// * `CommunityNotFound`
    pub fn get_community(&self, name: &str) -> Result<&Community> {
        self.communities
            .get(&name.to_string())
            .ok_or_else(|| BoardError::CommunityNotFound {
                name: name.to_string(),
            })
    }

    pub(crate) fn get_community_mut(&mut self, name: &str) -> Result<&mut Community> {
        self.communities
            .get_mut(&name.to_string())
            .ok_or_else(|| BoardError::CommunityNotFound {
                name: name.to_string(),
            })
    }

    /// # Errors
    /// * `PostNotFound`
    pub fn get_post(&self, id: i64) -> Result<&Post> {
        self.posts
            .get(&id)
            .ok_or(BoardError::PostNotFound { post_id: id })
    }

    pub(crate) fn get_post_mut(&mut self, id: i64) -> Result<&mut Post> {
        self.posts
            .get_mut(&id)
            .ok_or(BoardError::PostNotFound { post_id: id })
    }

    /// # Errors
    /// * `CommentNotFound`
    pub fn get_comment(&self, id: i64) -> Result<&Comment> {
        self.comments
            .get(&id)
            .ok_or(BoardError::CommentNotFound { comment_id: id })
    }

    pub(crate) fn get_comment_mut(&mut self, id: i64) -> Result<&mut Comment> {
        self.comments
            .get_mut(&id)
            .ok_or(BoardError::CommentNotFound { comment_id: id })
    }

    /// # Errors
    /// * `SubscriptionNotFound`
    pub fn get_subscription(&self, id: i64) -> Result<&Subscription> {
        self.subscriptions
            .get(&id)
            .ok_or(BoardError::SubscriptionNotFound {
                subscription_id: id,
            })
    }

    pub(crate) fn get_subscription_mut(&mut self, id: i64) -> Result<&mut Subscription> {
        self.subscriptions
            .get_mut(&id)
            .ok_or(BoardError::SubscriptionNotFound {
                subscription_id: id,
            })
    }

    // ===== Bulk operations =====

    /// Empty every extent
    pub fn clear_all(&mut self) {
        self.users.clear();
        self.communities.clear();
        self.posts.clear();
        self.comments.clear();
        self.subscriptions.clear();
        tracing::debug!("cleared all extents");
    }

    /// Owned copy of every extent in insertion order
    pub fn contents(&self) -> ExtentContents {
        ExtentContents {
            users: self.users.to_vec(),
            communities: self.communities.to_vec(),
            posts: self.posts.to_vec(),
            comments: self.comments.to_vec(),
            subscriptions: self.subscriptions.to_vec(),
        }
    }

    /// Replace every extent wholesale and rebuild back-references
    ///
    /// Duplicate keys are rejected before anything is replaced. Forward
    /// references are not checked here; run
    /// `rules::validation::validate_store` afterwards for that.
    ///
    /// # Errors
    /// * `AlreadyExists` - a key appears twice within one kind
    pub fn replace_extents(&mut self, contents: ExtentContents) -> Result<()> {
        ensure_unique_keys("user", &contents.users)?;
        ensure_unique_keys("community", &contents.communities)?;
        ensure_unique_keys("post", &contents.posts)?;
        ensure_unique_keys("comment", &contents.comments)?;
        ensure_unique_keys("subscription", &contents.subscriptions)?;

        self.users.replace_all(Some(contents.users));
        self.communities.replace_all(Some(contents.communities));
        self.posts.replace_all(Some(contents.posts));
        self.comments.replace_all(Some(contents.comments));
        self.subscriptions.replace_all(Some(contents.subscriptions));

        crate::ops::hydration::rebuild_back_references(self);
        Ok(())
    }

    /// Take over every extent of `other`, keeping this store's collaborators
    pub fn adopt_extents(&mut self, other: Store) {
        self.users = other.users;
        self.communities = other.communities;
        self.posts = other.posts;
        self.comments = other.comments;
        self.subscriptions = other.subscriptions;
    }
}

fn ensure_unique_keys<T: Keyed>(entity: &str, items: &[T]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for item in items {
        let key = item.key();
        if !seen.insert(key.clone()) {
            return Err(BoardError::AlreadyExists {
                entity: entity.to_string(),
                key: format!("{:?}", key),
            });
        }
    }
    Ok(())
}
