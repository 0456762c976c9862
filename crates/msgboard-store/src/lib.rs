//! msgboard store - single-file snapshot persistence
//!
//! Provides:
//! - Snapshot envelope capture and restore with a SHA256 payload digest
//! - Atomic publish of the snapshot file (temp file, sync, rename)
//! - `PersistenceManager` for save, load with back-reference rebuild, and
//!   backup copies

pub mod atomic;
pub mod errors;
pub mod persistence;
pub mod snapshot;

// Re-export key types
pub use errors::Result;
pub use persistence::{LoadOutcome, PersistenceManager};
pub use snapshot::{SnapshotEnvelope, SnapshotPayload, FORMAT_VERSION};
