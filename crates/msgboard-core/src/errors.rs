use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using BoardError
pub type Result<T> = std::result::Result<T, BoardError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Stable classification of every error the board can raise. Each kind maps
/// to an `ERR_*` code suitable for programmatic handling and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    InvalidSetting,
    AlreadyExists,
    NotFound,
    WrongKind,

    // Relationship invariants
    ConstraintViolation,
    ImmutableRelationship,
    SelfReference,
    CapacityExceeded,
    InvalidState,
    IntegrityViolation,

    // Persistence
    Io,
    Serialization,
    CorruptData,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidSetting => "ERR_INVALID_SETTING",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::WrongKind => "ERR_WRONG_KIND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::ImmutableRelationship => "ERR_IMMUTABLE_RELATIONSHIP",
            ExErrorKind::SelfReference => "ERR_SELF_REFERENCE",
            ExErrorKind::CapacityExceeded => "ERR_CAPACITY_EXCEEDED",
            ExErrorKind::InvalidState => "ERR_INVALID_STATE",
            ExErrorKind::IntegrityViolation => "ERR_INTEGRITY_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::CorruptData => "ERR_CORRUPT_DATA",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, entity, message, cause) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for board operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    // ===== Validation Errors =====
    /// Identifier is out of range (negative)
    #[error("Invalid {entity} id {id}: ids cannot be negative")]
    InvalidId { entity: String, id: i64 },

    /// Required text field is empty or whitespace-only
    #[error("{field} cannot be empty or whitespace-only")]
    BlankField { field: String },

    /// Email does not match the accepted pattern
    #[error("Email format is invalid: {email}")]
    InvalidEmail { email: String },

    /// Password shorter than the configured minimum
    #[error("Password must be at least {min_length} characters long (got {actual})")]
    PasswordTooShort { min_length: usize, actual: usize },

    /// Score set to a negative value
    #[error("{field} cannot be negative (got {value})")]
    NegativeScore { field: String, value: i64 },

    /// Post score plus comment score does not fit in an i64
    #[error("Overall score overflows: post score {post_score} + comment score {comment_score}")]
    ScoreOverflow { post_score: i64, comment_score: i64 },

    /// Timestamp lies in the future relative to the board clock
    #[error("{field} cannot be in the future: {value}")]
    FutureTimestamp { field: String, value: DateTime<Utc> },

    /// Runtime or configuration setting out of range
    #[error("Invalid setting {setting}: {reason}")]
    InvalidSetting { setting: String, reason: String },

    /// Entity key already registered in its extent
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: String, key: String },

    /// Username already used by another user
    #[error("Username already taken: {username}")]
    UsernameTaken { username: String },

    // ===== Lookup Errors =====
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Community not found: {name}")]
    CommunityNotFound { name: String },

    #[error("Post not found: {post_id}")]
    PostNotFound { post_id: i64 },

    #[error("Comment not found: {comment_id}")]
    CommentNotFound { comment_id: i64 },

    #[error("Subscription not found: {subscription_id}")]
    SubscriptionNotFound { subscription_id: i64 },

    /// User exists but is not of the kind the operation requires
    #[error("User {user_id} is not a {expected}")]
    WrongUserKind { user_id: i64, expected: String },

    /// Post exists but carries a different payload kind
    #[error("Post {post_id} is not a {expected} post")]
    WrongPostKind { post_id: i64, expected: String },

    // ===== Relationship Errors =====
    /// Comment is already bound to another post (composition is fixed)
    #[error("Cannot move comment {comment_id} from post {current_post_id} to post {requested_post_id}")]
    CommentPostImmutable {
        comment_id: i64,
        current_post_id: i64,
        requested_post_id: i64,
    },

    /// Comment cannot reply to itself
    #[error("Comment {comment_id} cannot reply to itself")]
    SelfReply { comment_id: i64 },

    /// Member already subscribed to the community
    #[error("Member '{username}' is already subscribed to community {community}")]
    DuplicateSubscription { username: String, community: String },

    /// Community moderator cap reached
    #[error("Community {community} already has the maximum of {cap} moderators")]
    ModeratorCapReached { community: String, cap: usize },

    /// Promotion of a subscription that is already a moderator
    #[error("Subscription {subscription_id} is already a moderator")]
    AlreadyModerator { subscription_id: i64 },

    /// Vote would push a tally past the i64 range
    #[error("Vote tally of {entity} {id} is at its limit ({score})")]
    VoteLimitReached { entity: String, id: i64, score: i64 },

    /// Demotion of a subscription that is not a moderator
    #[error("Subscription {subscription_id} is not a moderator")]
    NotModerator { subscription_id: i64 },

    // ===== Integrity Errors =====
    /// Forward reference points at an entity that does not exist
    #[error("{from} references missing {to}")]
    DanglingReference { from: String, to: String },

    /// Both sides of a bidirectional relationship disagree
    #[error("Relationship inconsistent: {reason}")]
    RelationshipInconsistent { reason: String },

}

/// Conversion from BoardError to ExError
impl From<BoardError> for ExError {
    fn from(err: BoardError) -> Self {
        let message = err.to_string();
        match err {
            BoardError::InvalidId { id, .. } => ExError::new(ExErrorKind::InvalidInput)
                .with_entity_id(id.to_string())
                .with_message(message),

            BoardError::BlankField { .. }
            | BoardError::InvalidEmail { .. }
            | BoardError::PasswordTooShort { .. }
            | BoardError::NegativeScore { .. }
            | BoardError::ScoreOverflow { .. }
            | BoardError::FutureTimestamp { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            BoardError::InvalidSetting { .. } => {
                ExError::new(ExErrorKind::InvalidSetting).with_message(message)
            }

            BoardError::AlreadyExists { key, .. } => ExError::new(ExErrorKind::AlreadyExists)
                .with_entity_id(key)
                .with_message(message),

            BoardError::UsernameTaken { username } => ExError::new(ExErrorKind::AlreadyExists)
                .with_entity_id(username)
                .with_message(message),

            BoardError::UserNotFound { user_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(user_id.to_string())
                .with_message(message),

            BoardError::CommunityNotFound { name } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(name)
                .with_message(message),

            BoardError::PostNotFound { post_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(post_id.to_string())
                .with_message(message),

            BoardError::CommentNotFound { comment_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(comment_id.to_string())
                .with_message(message),

            BoardError::SubscriptionNotFound { subscription_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(subscription_id.to_string())
                    .with_message(message)
            }

            BoardError::WrongUserKind { user_id, .. } => ExError::new(ExErrorKind::WrongKind)
                .with_entity_id(user_id.to_string())
                .with_message(message),

            BoardError::WrongPostKind { post_id, .. } => ExError::new(ExErrorKind::WrongKind)
                .with_entity_id(post_id.to_string())
                .with_message(message),

            BoardError::CommentPostImmutable { comment_id, .. } => {
                ExError::new(ExErrorKind::ImmutableRelationship)
                    .with_entity_id(comment_id.to_string())
                    .with_message(message)
            }

            BoardError::SelfReply { comment_id } => ExError::new(ExErrorKind::SelfReference)
                .with_entity_id(comment_id.to_string())
                .with_message(message),

            BoardError::DuplicateSubscription { username, .. } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_entity_id(username)
                    .with_message(message)
            }

            BoardError::ModeratorCapReached { community, .. } => {
                ExError::new(ExErrorKind::CapacityExceeded)
                    .with_entity_id(community)
                    .with_message(message)
            }

            BoardError::VoteLimitReached { id, .. } => ExError::new(ExErrorKind::InvalidState)
                .with_entity_id(id.to_string())
                .with_message(message),

            BoardError::AlreadyModerator { subscription_id }
            | BoardError::NotModerator { subscription_id } => {
                ExError::new(ExErrorKind::InvalidState)
                    .with_entity_id(subscription_id.to_string())
                    .with_message(message)
            }

            BoardError::DanglingReference { from, .. } => {
                ExError::new(ExErrorKind::IntegrityViolation)
                    .with_entity_id(from)
                    .with_message(message)
            }

            BoardError::RelationshipInconsistent { .. } => {
                ExError::new(ExErrorKind::IntegrityViolation).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ExErrorKind::InvalidInput,
            ExErrorKind::InvalidSetting,
            ExErrorKind::AlreadyExists,
            ExErrorKind::NotFound,
            ExErrorKind::WrongKind,
            ExErrorKind::ConstraintViolation,
            ExErrorKind::ImmutableRelationship,
            ExErrorKind::SelfReference,
            ExErrorKind::CapacityExceeded,
            ExErrorKind::InvalidState,
            ExErrorKind::IntegrityViolation,
            ExErrorKind::Io,
            ExErrorKind::Serialization,
            ExErrorKind::CorruptData,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::Io)
            .with_op("save")
            .with_message("disk full")
            .with_entity_id("board.json");
        let text = err.to_string();
        assert!(text.starts_with("[ERR_IO]"));
        assert!(text.contains("save"));
        assert!(text.contains("disk full"));
        assert!(text.contains("board.json"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        let inner = ExError::new(ExErrorKind::Serialization).with_message("bad json");
        let outer = ExError::new(ExErrorKind::CorruptData).with_source(inner);
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Serialization)
        );
        assert!(std::error::Error::source(&outer).is_some());
    }
}
