//! Atomic file publish
//!
//! Content is written to a temp file in the target's directory, synced,
//! then renamed over the target. The previous file is kept as a `.bak`
//! copy until the replacement is confirmed, so a failed publish leaves the
//! old content in place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::{io_error, Result};

/// Path of the backup kept while a publish is in flight
pub fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Atomically replace `target` with `content`
///
/// Tries a plain rename first. If the rename is refused, falls back to
/// copying the temp file over the target, then to deleting the target and
/// renaming. When every strategy fails the previous content is restored
/// from the backup.
///
/// # Errors
/// * `Io` - the temp file cannot be written or no strategy succeeded
pub fn publish(target: &Path, content: &[u8]) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| io_error("publish_create_dir", e))?;

    let mut temp = NamedTempFile::new_in(&dir).map_err(|e| io_error("publish_create_temp", e))?;
    temp.write_all(content)
        .map_err(|e| io_error("publish_write_temp", e))?;
    temp.flush().map_err(|e| io_error("publish_flush_temp", e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| io_error("publish_sync_temp", e))?;

    let backup = backup_path(target);
    let has_backup = if target.is_file() {
        fs::copy(target, &backup).map_err(|e| io_error("publish_backup", e))?;
        true
    } else {
        false
    };

    let outcome = match temp.persist(target) {
        Ok(_) => Ok(()),
        Err(persist_err) => {
            tracing::warn!(
                path = %target.display(),
                error = %persist_err.error,
                "rename refused, falling back to copy"
            );
            replace_by_fallback(persist_err.file, target)
        }
    };

    match outcome {
        Ok(()) => {
            if has_backup {
                if let Err(e) = fs::remove_file(&backup) {
                    tracing::warn!(path = %backup.display(), error = %e, "failed to remove backup");
                }
            }
            tracing::debug!(path = %target.display(), bytes = content.len(), "published file");
            Ok(())
        }
        Err(err) => {
            if has_backup {
                if let Err(e) = fs::copy(&backup, target) {
                    tracing::error!(
                        path = %target.display(),
                        error = %e,
                        "failed to restore previous content from backup"
                    );
                } else {
                    let _ = fs::remove_file(&backup);
                }
            }
            Err(err)
        }
    }
}

fn replace_by_fallback(temp: NamedTempFile, target: &Path) -> Result<()> {
    if fs::copy(temp.path(), target).is_ok() {
        return Ok(());
    }

    if target.is_file() {
        fs::remove_file(target).map_err(|e| io_error("publish_remove_target", e))?;
    }
    temp.persist(target)
        .map(|_| ())
        .map_err(|e| io_error("publish_rename", e.error))
}
