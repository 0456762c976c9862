//! Scalar attribute checks shared by the operation modules
//!
//! Every check runs before the first mutation so a rejected call leaves the
//! store untouched.

use chrono::{DateTime, Utc};

use crate::errors::{BoardError, Result};

pub fn ensure_non_negative_id(entity: &str, id: i64) -> Result<()> {
    if id < 0 {
        return Err(BoardError::InvalidId {
            entity: entity.to_string(),
            id,
        });
    }
    Ok(())
}

pub fn ensure_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BoardError::BlankField {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Optional text: absent is fine, present must be non-blank
pub fn ensure_optional_non_blank(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(text) => ensure_non_blank(field, text),
        None => Ok(()),
    }
}

pub fn ensure_non_negative_score(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(BoardError::NegativeScore {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Reject a score pair whose sum does not fit in an i64
pub fn ensure_score_sum_fits(post_score: i64, comment_score: i64) -> Result<()> {
    if post_score.checked_add(comment_score).is_none() {
        return Err(BoardError::ScoreOverflow {
            post_score,
            comment_score,
        });
    }
    Ok(())
}

/// Reject instants strictly after `now`
pub fn ensure_not_future(field: &str, value: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if value > now {
        return Err(BoardError::FutureTimestamp {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Length is counted in characters, not bytes
pub fn ensure_password_length(password: &str, min_length: usize) -> Result<()> {
    let actual = password.chars().count();
    if actual < min_length {
        return Err(BoardError::PasswordTooShort { min_length, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_ids() {
        assert!(ensure_non_negative_id("post", 0).is_ok());
        assert!(matches!(
            ensure_non_negative_id("post", -1),
            Err(BoardError::InvalidId { id: -1, .. })
        ));
    }

    #[test]
    fn test_blank_strings() {
        assert!(ensure_non_blank("title", "x").is_ok());
        assert!(ensure_non_blank("title", "").is_err());
        assert!(ensure_non_blank("title", " \t\n").is_err());
        assert!(ensure_optional_non_blank("bio", None).is_ok());
        assert!(ensure_optional_non_blank("bio", Some("  ")).is_err());
    }

    #[test]
    fn test_future_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert!(ensure_not_future("joined_at", now, now).is_ok());
        assert!(ensure_not_future("joined_at", now - Duration::days(1), now).is_ok());
        assert!(ensure_not_future("joined_at", now + Duration::seconds(1), now).is_err());
    }

    #[test]
    fn test_password_counts_chars() {
        assert!(ensure_password_length("ääää", 4).is_ok());
        assert_eq!(
            ensure_password_length("abc", 8),
            Err(BoardError::PasswordTooShort {
                min_length: 8,
                actual: 3
            })
        );
    }

    #[test]
    fn test_scores() {
        assert!(ensure_non_negative_score("post_score", 0).is_ok());
        assert!(ensure_non_negative_score("post_score", -5).is_err());
    }

    #[test]
    fn test_score_sum_must_fit() {
        assert!(ensure_score_sum_fits(i64::MAX, 0).is_ok());
        assert!(matches!(
            ensure_score_sum_fits(i64::MAX, 1),
            Err(BoardError::ScoreOverflow { .. })
        ));
    }
}
