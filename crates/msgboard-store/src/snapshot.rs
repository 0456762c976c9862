//! Snapshot envelope
//!
//! One JSON document holds every extent. Users are split by kind so the
//! file reads the way the board is administered. Only forward references
//! are written; back-references are rebuilt on restore.
//!
//! The digest is SHA256 over the compact JSON of the payload after it has
//! been normalized through `serde_json::Value` (keys sorted), so it is
//! stable across a parse and re-serialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use msgboard_core::errors::{ExError, ExErrorKind};
use msgboard_core::model::{Comment, Community, Post, Subscription, User, UserRole};
use msgboard_core::ops::ExtentContents;
use msgboard_core::Store;

use crate::errors::{corrupt_data, serialization_error, Result};

/// Current on-disk format
pub const FORMAT_VERSION: u32 = 1;

/// Every extent, users grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub members: Vec<User>,
    #[serde(default)]
    pub administrators: Vec<User>,
    #[serde(default)]
    pub moderators: Vec<User>,
    #[serde(default)]
    pub communities: Vec<Community>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl SnapshotPayload {
    pub fn entity_count(&self) -> usize {
        self.members.len()
            + self.administrators.len()
            + self.moderators.len()
            + self.communities.len()
            + self.posts.len()
            + self.comments.len()
            + self.subscriptions.len()
    }
}

/// Versioned wrapper written to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub format_version: u32,
    pub snapshot_id: String,
    pub saved_at: DateTime<Utc>,
    /// Hex SHA256 of the normalized payload
    pub digest: String,
    pub payload: serde_json::Value,
}

/// Capture the store into an envelope stamped with the store clock
///
/// # Errors
/// * `Serialization` - an entity could not be converted to JSON
pub fn capture(store: &Store) -> Result<SnapshotEnvelope> {
    let contents = store.contents();
    let mut payload = SnapshotPayload {
        communities: contents.communities,
        posts: contents.posts,
        comments: contents.comments,
        subscriptions: contents.subscriptions,
        ..SnapshotPayload::default()
    };
    for user in contents.users {
        match user.role() {
            UserRole::Member => payload.members.push(user),
            UserRole::Administrator => payload.administrators.push(user),
            UserRole::Moderator => payload.moderators.push(user),
        }
    }

    let payload =
        serde_json::to_value(&payload).map_err(|e| serialization_error("capture_snapshot", e))?;
    let digest = compute_digest(&payload)?;

    Ok(SnapshotEnvelope {
        format_version: FORMAT_VERSION,
        snapshot_id: uuid::Uuid::now_v7().to_string(),
        saved_at: store.now(),
        digest,
        payload,
    })
}

/// Hex SHA256 of the compact JSON form of `payload`
///
/// # Errors
/// * `Serialization` - the value could not be written as JSON
pub fn compute_digest(payload: &serde_json::Value) -> Result<String> {
    let bytes =
        serde_json::to_vec(payload).map_err(|e| serialization_error("compute_digest", e))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Serialize an envelope for writing
///
/// # Errors
/// * `Serialization` - the envelope could not be written as JSON
pub fn encode(envelope: &SnapshotEnvelope) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(envelope).map_err(|e| serialization_error("encode_snapshot", e))
}

/// Parse an envelope and check its version and digest
///
/// # Errors
/// * `Serialization` - the bytes are not an envelope
/// * `CorruptData` - unknown version or digest mismatch
pub fn decode(bytes: &[u8]) -> Result<SnapshotEnvelope> {
    let envelope: SnapshotEnvelope =
        serde_json::from_slice(bytes).map_err(|e| serialization_error("decode_snapshot", e))?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(corrupt_data(
            "decode_snapshot",
            format!(
                "unsupported format version {} (expected {})",
                envelope.format_version, FORMAT_VERSION
            ),
        ));
    }

    let actual = compute_digest(&envelope.payload)?;
    if actual != envelope.digest {
        return Err(corrupt_data(
            "decode_snapshot",
            format!("digest mismatch: recorded {}, computed {}", envelope.digest, actual),
        )
        .with_entity_id(envelope.snapshot_id.clone()));
    }

    Ok(envelope)
}

/// Turn a verified envelope back into extent contents
///
/// Users are restored members first, then administrators, then moderator
/// accounts. A user filed under the wrong kind is rejected.
///
/// # Errors
/// * `Serialization` - the payload does not match the entity shapes
/// * `CorruptData` - a user is filed under the wrong kind
pub fn restore(envelope: &SnapshotEnvelope) -> Result<ExtentContents> {
    let payload: SnapshotPayload = serde_json::from_value(envelope.payload.clone())
        .map_err(|e| serialization_error("restore_snapshot", e))?;

    let mut users = Vec::with_capacity(
        payload.members.len() + payload.administrators.len() + payload.moderators.len(),
    );
    for (expected, group) in [
        (UserRole::Member, payload.members),
        (UserRole::Administrator, payload.administrators),
        (UserRole::Moderator, payload.moderators),
    ] {
        for user in group {
            if user.role() != expected {
                return Err(ExError::new(ExErrorKind::CorruptData)
                    .with_op("restore_snapshot")
                    .with_entity_id(user.id().to_string())
                    .with_message(format!(
                        "user filed as {} but is {}",
                        expected.as_str(),
                        user.role().as_str()
                    )));
            }
            users.push(user);
        }
    }

    Ok(ExtentContents {
        users,
        communities: payload.communities,
        posts: payload.posts,
        comments: payload.comments,
        subscriptions: payload.subscriptions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgboard_core::ops::{community_ops, user_ops};

    fn sample_store() -> Store {
        let mut store = Store::new();
        user_ops::create_member(
            &mut store,
            1,
            "alice@example.com".to_string(),
            "alice".to_string(),
            "Password123".to_string(),
        )
        .unwrap();
        user_ops::create_administrator(
            &mut store,
            2,
            "root@example.com".to_string(),
            "root".to_string(),
            "Password123".to_string(),
        )
        .unwrap();
        community_ops::create_community(&mut store, "rust".to_string(), None, false).unwrap();
        store
    }

    #[test]
    fn test_capture_groups_users_by_kind() {
        let envelope = capture(&sample_store()).unwrap();
        let payload: SnapshotPayload = serde_json::from_value(envelope.payload).unwrap();

        assert_eq!(payload.members.len(), 1);
        assert_eq!(payload.administrators.len(), 1);
        assert!(payload.moderators.is_empty());
        assert_eq!(payload.communities.len(), 1);
        assert_eq!(payload.entity_count(), 3);
    }

    #[test]
    fn test_digest_survives_encode_decode() {
        let envelope = capture(&sample_store()).unwrap();
        let bytes = encode(&envelope).unwrap();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.digest, envelope.digest);
        assert_eq!(decoded.snapshot_id, envelope.snapshot_id);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let mut envelope = capture(&sample_store()).unwrap();
        envelope.payload["communities"][0]["name"] = serde_json::json!("python");
        let bytes = encode(&envelope).unwrap();

        let err = decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::CorruptData);
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut envelope = capture(&sample_store()).unwrap();
        envelope.format_version = 99;
        let bytes = encode(&envelope).unwrap();

        assert_eq!(decode(&bytes).unwrap_err().kind(), ExErrorKind::CorruptData);
    }

    #[test]
    fn test_misfiled_user_rejected() {
        let mut envelope = capture(&sample_store()).unwrap();
        let admin = envelope.payload["administrators"][0].clone();
        envelope.payload["members"]
            .as_array_mut()
            .unwrap()
            .push(admin);

        assert_eq!(restore(&envelope).unwrap_err().kind(), ExErrorKind::CorruptData);
    }
}
