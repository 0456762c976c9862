use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::votes::Votes;

/// Tag-only view of a post's payload kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostKind {
    Text,
    Link,
    Image,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Text => "text",
            PostKind::Link => "link",
            PostKind::Image => "image",
        }
    }
}

/// Type-specific post payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostContent {
    Text { text: String },
    Link { links: Vec<String> },
    Image { image_urls: Vec<String> },
}

impl PostContent {
    pub fn kind(&self) -> PostKind {
        match self {
            PostContent::Text { .. } => PostKind::Text,
            PostContent::Link { .. } => PostKind::Link,
            PostContent::Image { .. } => PostKind::Image,
        }
    }
}

/// A post on the board
///
/// Belongs to at most one community and exclusively owns its comments.
/// `community` and `comment_ids` are back-references: the community's post
/// set and each comment's `post_id` are the serialized sources of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) mature: bool,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) votes: Votes,
    #[serde(flatten)]
    pub(crate) content: PostContent,
    #[serde(skip)]
    pub(crate) community: Option<String>,
    #[serde(skip)]
    pub(crate) comment_ids: Vec<i64>,
}

impl Post {
    pub(crate) fn new(
        id: i64,
        title: String,
        mature: bool,
        created_at: DateTime<Utc>,
        content: PostContent,
    ) -> Self {
        Self {
            id,
            title,
            mature,
            created_at,
            votes: Votes::new(),
            content,
            community: None,
            comment_ids: Vec::new(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_mature(&self) -> bool {
        self.mature
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn votes(&self) -> Votes {
        self.votes
    }

    pub fn content(&self) -> &PostContent {
        &self.content
    }

    pub fn kind(&self) -> PostKind {
        self.content.kind()
    }

    /// Name of the community this post is assigned to
    pub fn community(&self) -> Option<&str> {
        self.community.as_deref()
    }

    /// Owned comments in creation order
    pub fn comment_ids(&self) -> &[i64] {
        &self.comment_ids
    }

    pub(crate) fn add_comment_id(&mut self, comment_id: i64) {
        if !self.comment_ids.contains(&comment_id) {
            self.comment_ids.push(comment_id);
        }
    }

    pub(crate) fn remove_comment_id(&mut self, comment_id: i64) {
        self.comment_ids.retain(|id| *id != comment_id);
    }
}
