use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::votes::Votes;

/// A comment on a post
///
/// `post_id` is fixed at construction (composition). `reply_to` is the
/// serialized side of the reflexive reply association; `replies` is its
/// back-reference and is rebuilt after a load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) votes: Votes,
    pub(crate) post_id: i64,
    #[serde(default)]
    pub(crate) reply_to: Option<i64>,
    #[serde(skip)]
    pub(crate) replies: Vec<i64>,
}

impl Comment {
    pub(crate) fn new(id: i64, content: String, created_at: DateTime<Utc>, post_id: i64) -> Self {
        Self {
            id,
            content,
            created_at,
            votes: Votes::new(),
            post_id,
            reply_to: None,
            replies: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn votes(&self) -> Votes {
        self.votes
    }

    /// The owning post; always present
    pub fn post_id(&self) -> i64 {
        self.post_id
    }

    pub fn reply_to(&self) -> Option<i64> {
        self.reply_to
    }

    pub fn replies(&self) -> &[i64] {
        &self.replies
    }

    pub(crate) fn add_reply(&mut self, reply_id: i64) {
        if !self.replies.contains(&reply_id) {
            self.replies.push(reply_id);
        }
    }

    pub(crate) fn remove_reply(&mut self, reply_id: i64) {
        self.replies.retain(|id| *id != reply_id);
    }
}
