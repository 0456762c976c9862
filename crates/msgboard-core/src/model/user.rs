use chrono::{DateTime, Utc};
use msgboard_core_types::Sensitive;
use serde::{Deserialize, Serialize};

use super::preferences::Preferences;

/// Badges an administrator can award to members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeType {
    Helper,
    Expert,
    ModeratorStar,
    FoundingMember,
}

/// Tag-only view of a user's concrete kind, used for filtering extents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserRole {
    Member,
    Administrator,
    Moderator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Administrator => "administrator",
            UserRole::Moderator => "moderator",
        }
    }
}

/// Member-specific attributes
///
/// `subscription_ids` is a back-reference maintained by the subscription
/// operations; it is never serialized and is rebuilt after a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    #[serde(default)]
    pub(crate) first_name: Option<String>,
    #[serde(default)]
    pub(crate) last_name: Option<String>,
    #[serde(default)]
    pub(crate) bio: Option<String>,
    #[serde(default)]
    pub(crate) badges: Vec<BadgeType>,
    pub(crate) post_score: i64,
    pub(crate) comment_score: i64,
    pub(crate) joined_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) subscription_ids: Vec<i64>,
}

impl MemberProfile {
    pub(crate) fn new(joined_at: DateTime<Utc>) -> Self {
        Self {
            first_name: None,
            last_name: None,
            bio: None,
            badges: Vec::new(),
            post_score: 0,
            comment_score: 0,
            joined_at,
            subscription_ids: Vec::new(),
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    pub fn badges(&self) -> &[BadgeType] {
        &self.badges
    }

    pub fn post_score(&self) -> i64 {
        self.post_score
    }

    pub fn comment_score(&self) -> i64 {
        self.comment_score
    }

    /// Derived: post score plus comment score, never stored
    ///
    /// The setters keep the sum within range; unvalidated data saturates.
    pub fn overall_score(&self) -> i64 {
        self.post_score.saturating_add(self.comment_score)
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Subscription ids in the order they were created
    pub fn subscription_ids(&self) -> &[i64] {
        &self.subscription_ids
    }

    pub(crate) fn add_badge(&mut self, badge: BadgeType) {
        if !self.badges.contains(&badge) {
            self.badges.push(badge);
        }
    }

    pub(crate) fn add_subscription_id(&mut self, subscription_id: i64) {
        if !self.subscription_ids.contains(&subscription_id) {
            self.subscription_ids.push(subscription_id);
        }
    }

    pub(crate) fn remove_subscription_id(&mut self, subscription_id: i64) {
        self.subscription_ids.retain(|id| *id != subscription_id);
    }
}

/// Attributes shared by administrators and moderator accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub(crate) assigned_at: DateTime<Utc>,
}

impl StaffProfile {
    pub fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }
}

/// Closed set of user kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserKind {
    Member(MemberProfile),
    Administrator(StaffProfile),
    Moderator(StaffProfile),
}

/// A board account
///
/// Usernames are immutable after construction because communities index
/// their subscribers by username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub(crate) id: i64,
    pub(crate) email: String,
    pub(crate) username: String,
    pub(crate) password: Sensitive<String>,
    #[serde(default)]
    pub(crate) banned: bool,
    #[serde(default)]
    pub(crate) preferences: Preferences,
    #[serde(flatten)]
    pub(crate) kind: UserKind,
}

impl User {
    /// Build a user from already-validated parts
    pub(crate) fn new(
        id: i64,
        email: String,
        username: String,
        password: String,
        kind: UserKind,
    ) -> Self {
        Self {
            id,
            email,
            username,
            password: Sensitive::new(password),
            banned: false,
            preferences: Preferences::default(),
            kind,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Sensitive<String> {
        &self.password
    }

    pub fn is_banned(&self) -> bool {
        self.banned
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn kind(&self) -> &UserKind {
        &self.kind
    }

    pub fn role(&self) -> UserRole {
        match self.kind {
            UserKind::Member(_) => UserRole::Member,
            UserKind::Administrator(_) => UserRole::Administrator,
            UserKind::Moderator(_) => UserRole::Moderator,
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self.kind, UserKind::Member(_))
    }

    /// Member attributes, if this user is a member
    pub fn member(&self) -> Option<&MemberProfile> {
        match &self.kind {
            UserKind::Member(profile) => Some(profile),
            _ => None,
        }
    }

    pub(crate) fn member_mut(&mut self) -> Option<&mut MemberProfile> {
        match &mut self.kind {
            UserKind::Member(profile) => Some(profile),
            _ => None,
        }
    }

    /// Staff attributes, if this user is an administrator or moderator account
    pub fn staff(&self) -> Option<&StaffProfile> {
        match &self.kind {
            UserKind::Administrator(profile) | UserKind::Moderator(profile) => Some(profile),
            UserKind::Member(_) => None,
        }
    }

    pub(crate) fn staff_mut(&mut self) -> Option<&mut StaffProfile> {
        match &mut self.kind {
            UserKind::Administrator(profile) | UserKind::Moderator(profile) => Some(profile),
            UserKind::Member(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn joined() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_member_overall_score_is_derived() {
        let mut profile = MemberProfile::new(joined());
        profile.post_score = 10;
        profile.comment_score = 5;
        assert_eq!(profile.overall_score(), 15);
    }

    #[test]
    fn test_badges_deduplicated() {
        let mut profile = MemberProfile::new(joined());
        profile.add_badge(BadgeType::Helper);
        profile.add_badge(BadgeType::Helper);
        profile.add_badge(BadgeType::Expert);
        assert_eq!(profile.badges(), &[BadgeType::Helper, BadgeType::Expert]);
    }

    #[test]
    fn test_role_dispatch() {
        let member = User::new(
            1,
            "a@b.co".to_string(),
            "alice".to_string(),
            "Password123".to_string(),
            UserKind::Member(MemberProfile::new(joined())),
        );
        let admin = User::new(
            2,
            "r@b.co".to_string(),
            "root".to_string(),
            "Password123".to_string(),
            UserKind::Administrator(StaffProfile {
                assigned_at: joined(),
            }),
        );
        assert_eq!(member.role(), UserRole::Member);
        assert!(member.member().is_some());
        assert!(member.staff().is_none());
        assert_eq!(admin.role(), UserRole::Administrator);
        assert!(admin.member().is_none());
        assert_eq!(admin.staff().map(|s| s.assigned_at()), Some(joined()));
    }

    #[test]
    fn test_serialized_user_is_tagged_and_skips_back_references() {
        let mut user = User::new(
            7,
            "a@b.co".to_string(),
            "alice".to_string(),
            "Password123".to_string(),
            UserKind::Member(MemberProfile::new(joined())),
        );
        if let Some(profile) = user.member_mut() {
            profile.add_subscription_id(99);
        }

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["kind"], "member");
        assert!(value.get("subscription_ids").is_none());

        let back: User = serde_json::from_value(value).unwrap();
        assert_eq!(back.member().map(|m| m.subscription_ids().len()), Some(0));
        assert_eq!(back.password().expose(), "Password123");
    }
}
