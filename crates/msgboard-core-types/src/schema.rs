//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names consistent across logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_COMMUNITY: &str = "community";
pub const FIELD_POST_ID: &str = "post_id";
pub const FIELD_COMMENT_ID: &str = "comment_id";
pub const FIELD_SUBSCRIPTION_ID: &str = "subscription_id";

// Persistence
pub const FIELD_SNAPSHOT_ID: &str = "snapshot_id";
pub const FIELD_PATH: &str = "path";
pub const FIELD_ENTITY_COUNT: &str = "entity_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
