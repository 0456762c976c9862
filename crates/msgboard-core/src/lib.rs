//! msgboard core - in-memory message-board graph
//!
//! This crate provides the domain model and the integrity engine that keeps
//! it consistent:
//! - Users (members, administrators, moderator accounts), communities,
//!   posts, comments and subscriptions held in ordered per-kind extents
//! - Relationship operations that always update both sides
//! - Cascading deletes and moderator-cap enforcement
//! - Back-reference reconstruction and whole-graph validation used after a
//!   load
//!
//! Persistence lives in `msgboard-store`.

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod policy;
pub mod rules;

// Re-export commonly used types
pub use config::{BoardConfig, LoadFailurePolicy};
pub use errors::{BoardError, ExError, ExErrorKind, Result};
pub use model::{
    Comment, Community, MemberProfile, Post, PostContent, PostKind, Subscription, User, UserKind,
    UserRole,
};
pub use ops::{ExtentContents, Store};
pub use policy::{Clock, CredentialPolicy, FixedClock, SimpleCredentialPolicy, SystemClock};
