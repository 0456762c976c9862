use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Association between one member and one community
///
/// Both sides are stored by key and serialized; the member's subscription
/// list and the community's subscriber map are rebuilt from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub(crate) id: i64,
    pub(crate) joined_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) moderator: bool,
    pub(crate) member_id: i64,
    pub(crate) community: String,
}

impl Subscription {
    pub(crate) fn new(
        id: i64,
        joined_at: DateTime<Utc>,
        moderator: bool,
        member_id: i64,
        community: String,
    ) -> Self {
        Self {
            id,
            joined_at,
            moderator,
            member_id,
            community,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    pub fn is_moderator(&self) -> bool {
        self.moderator
    }

    pub fn member_id(&self) -> i64 {
        self.member_id
    }

    pub fn community(&self) -> &str {
        &self.community
    }
}
