//! Board configuration
//!
//! Loaded from TOML; every key is optional and falls back to its default.
//!
//! ```toml
//! password_min_length = 10
//! default_moderator_cap = 5
//! data_file = "data/board.json"
//! load_failure_policy = "clear_all"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{BoardError, ExError, ExErrorKind, Result};

/// Smallest password minimum the board accepts
pub const PASSWORD_MIN_LENGTH_FLOOR: usize = 4;
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;
pub const DEFAULT_MODERATOR_CAP: usize = 10;
pub const DEFAULT_DATA_FILE: &str = "messageboard_data.json";

/// What a load does to in-memory state when the snapshot file is corrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailurePolicy {
    /// Leave every extent exactly as it was before the load
    #[default]
    PreserveState,
    /// Empty every extent, then report the failure
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardConfig {
    pub password_min_length: usize,
    pub default_moderator_cap: usize,
    pub data_file: PathBuf,
    pub load_failure_policy: LoadFailurePolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            default_moderator_cap: DEFAULT_MODERATOR_CAP,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            load_failure_policy: LoadFailurePolicy::default(),
        }
    }
}

impl BoardConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// * `Serialization` - malformed TOML or unknown keys
    /// * `InvalidSetting` - a value is out of range
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, ExError> {
        let config: BoardConfig = toml::from_str(source).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("load_config")
                .with_message(format!("Invalid board config: {}", e))
        })?;
        config.validate().map_err(|e| ExError::from(e).with_op("load_config"))?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// * `Io` - the file cannot be read
    /// * anything `from_toml_str` returns
    pub fn from_file(path: &Path) -> std::result::Result<Self, ExError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_config")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })?;
        Self::from_toml_str(&source)
    }

    /// Check every value against its allowed range
    pub fn validate(&self) -> Result<()> {
        check_password_min_length(self.password_min_length)?;
        check_moderator_cap(self.default_moderator_cap)?;
        if self.data_file.as_os_str().is_empty() {
            return Err(BoardError::InvalidSetting {
                setting: "data_file".to_string(),
                reason: "path cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn check_password_min_length(value: usize) -> Result<()> {
    if value < PASSWORD_MIN_LENGTH_FLOOR {
        return Err(BoardError::InvalidSetting {
            setting: "password_min_length".to_string(),
            reason: format!("must be at least {}", PASSWORD_MIN_LENGTH_FLOOR),
        });
    }
    Ok(())
}

pub(crate) fn check_moderator_cap(value: usize) -> Result<()> {
    if value < 1 {
        return Err(BoardError::InvalidSetting {
            setting: "moderator_cap".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
