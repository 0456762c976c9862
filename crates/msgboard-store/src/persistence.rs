//! Save and load of the whole board
//!
//! A load never touches the live store until the file has been parsed,
//! verified, rebuilt and validated in a scratch store. Only then are the
//! extents swapped in. On a corrupt file the configured
//! `LoadFailurePolicy` decides whether the live store is kept or cleared.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use msgboard_core::errors::{ExError, ExErrorKind};
use msgboard_core::rules::validate_store;
use msgboard_core::{log_op_end, log_op_error, log_op_start};
use msgboard_core::{BoardConfig, LoadFailurePolicy, Store};

use crate::atomic;
use crate::errors::{io_error, Result};
use crate::snapshot;

/// Result of a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot file exists; the store was left as it was
    NoFile,
    /// The snapshot replaced every extent
    Loaded {
        snapshot_id: String,
        entity_count: usize,
    },
}

/// Reads and writes one snapshot file
#[derive(Debug, Clone)]
pub struct PersistenceManager {
    path: PathBuf,
    policy: LoadFailurePolicy,
}

impl PersistenceManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            policy: LoadFailurePolicy::default(),
        }
    }

    /// Manager for the configured data file and failure policy
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            path: config.data_file.clone(),
            policy: config.load_failure_policy,
        }
    }

    pub fn with_policy(mut self, policy: LoadFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> LoadFailurePolicy {
        self.policy
    }

    /// Write every extent to the snapshot file
    ///
    /// Returns the new snapshot id.
    ///
    /// # Errors
    /// * `Serialization` - an entity could not be encoded
    /// * `Io` - the file could not be published; the previous file is kept
    pub fn save(&self, store: &Store) -> Result<String> {
        let start = Instant::now();
        log_op_start!("save_snapshot", path = %self.path.display());

        let result = self.save_inner(store);
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(snapshot_id) => {
                log_op_end!("save_snapshot", duration_ms = duration_ms, snapshot_id = %snapshot_id);
            }
            Err(e) => {
                log_op_error!("save_snapshot", e.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    fn save_inner(&self, store: &Store) -> Result<String> {
        let envelope = snapshot::capture(store)?;
        let bytes = snapshot::encode(&envelope)?;
        atomic::publish(&self.path, &bytes).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("save_snapshot")
                .with_entity_id(self.path.display().to_string())
                .with_message("failed to publish snapshot")
                .with_source(e)
        })?;
        tracing::debug!(
            snapshot_id = %envelope.snapshot_id,
            digest = %envelope.digest,
            bytes = bytes.len(),
            "snapshot written"
        );
        Ok(envelope.snapshot_id)
    }

    /// Replace every extent with the snapshot file's contents
    ///
    /// A missing file is not an error and leaves the store untouched.
    ///
    /// # Errors
    /// * `Io` - the file exists but cannot be read; the store is untouched
    /// * `CorruptData` - the file is unparseable, fails its digest or
    ///   describes an inconsistent graph; the store is kept or cleared per
    ///   the failure policy
    pub fn load(&self, store: &mut Store) -> Result<LoadOutcome> {
        let start = Instant::now();
        log_op_start!("load_snapshot", path = %self.path.display());

        let result = self.load_inner(store);
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(LoadOutcome::Loaded {
                snapshot_id,
                entity_count,
            }) => {
                log_op_end!(
                    "load_snapshot",
                    duration_ms = duration_ms,
                    snapshot_id = %snapshot_id,
                    entity_count = *entity_count
                );
            }
            Ok(LoadOutcome::NoFile) => {
                log_op_end!("load_snapshot", duration_ms = duration_ms, entity_count = 0u64);
            }
            Err(e) => {
                log_op_error!("load_snapshot", e.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    fn load_inner(&self, store: &mut Store) -> Result<LoadOutcome> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no snapshot file, keeping current state");
                return Ok(LoadOutcome::NoFile);
            }
            Err(e) => return Err(io_error("load_snapshot", e)),
        };

        match build_candidate(store, &bytes) {
            Ok((candidate, snapshot_id, entity_count)) => {
                store.adopt_extents(candidate);
                Ok(LoadOutcome::Loaded {
                    snapshot_id,
                    entity_count,
                })
            }
            Err(cause) => {
                if self.policy == LoadFailurePolicy::ClearAll {
                    store.clear_all();
                }
                tracing::warn!(
                    path = %self.path.display(),
                    policy = ?self.policy,
                    cause = %cause,
                    "snapshot rejected"
                );
                Err(ExError::new(ExErrorKind::CorruptData)
                    .with_op("load_snapshot")
                    .with_entity_id(self.path.display().to_string())
                    .with_message("snapshot file is corrupt")
                    .with_source(cause))
            }
        }
    }

    /// Copy the current snapshot file to `dest`
    ///
    /// Creates missing parent directories. Returns false when there is no
    /// snapshot file or the copy fails.
    pub fn backup(&self, dest: &Path) -> bool {
        if !self.path.is_file() {
            tracing::warn!(path = %self.path.display(), "no snapshot file to back up");
            return false;
        }
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(path = %parent.display(), error = %e, "cannot create backup directory");
                    return false;
                }
            }
        }
        match fs::copy(&self.path, dest) {
            Ok(_) => {
                tracing::info!(from = %self.path.display(), to = %dest.display(), "snapshot backed up");
                true
            }
            Err(e) => {
                tracing::warn!(to = %dest.display(), error = %e, "snapshot backup failed");
                false
            }
        }
    }
}

/// Parse, verify, rebuild and validate into a scratch store
fn build_candidate(store: &Store, bytes: &[u8]) -> Result<(Store, String, usize)> {
    let envelope = snapshot::decode(bytes)?;
    let contents = snapshot::restore(&envelope)?;
    let entity_count = contents.entity_count();

    let mut candidate = store.empty_like();
    candidate
        .replace_extents(contents)
        .map_err(|e| ExError::from(e).with_op("restore_snapshot"))?;
    validate_store(&candidate).map_err(|e| ExError::from(e).with_op("validate_snapshot"))?;

    Ok((candidate, envelope.snapshot_id, entity_count))
}
