//! Injected collaborators: clock and credential policy
//!
//! Both are trait seams so tests can supply deterministic behavior. The
//! `Store` owns one of each; operations never read the ambient clock or
//! hard-code format rules.

use chrono::{DateTime, Utc};
use std::sync::Mutex;

/// Source of "now" for every not-in-the-future check and creation timestamp
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a settable instant
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use msgboard_core::policy::{Clock, FixedClock};
///
/// let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let clock = FixedClock::new(start);
/// assert_eq!(clock.now(), start);
///
/// clock.advance(Duration::minutes(5));
/// assert_eq!(clock.now(), start + Duration::minutes(5));
/// ```
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Pin the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut guard) = self.instant.lock() {
            *guard = instant;
        }
    }

    /// Move the clock forward (or backward with a negative duration)
    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut guard) = self.instant.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

/// Format rules for user credentials
///
/// The store only needs a pass/fail answer for emails and usernames; the
/// password length rule is enforced by the store itself against its
/// configured minimum.
pub trait CredentialPolicy: Send + Sync {
    /// Whether `email` is acceptable
    fn is_valid_email(&self, email: &str) -> bool;

    /// Whether `username` is acceptable
    fn is_valid_username(&self, username: &str) -> bool;
}

/// Default rules: `local@domain.tld` emails, non-blank usernames
///
/// The email check mirrors `^[^@\s]+@[^@\s]+\.[^@\s]+$`: exactly one `@`,
/// no whitespace, and a dot with text on both sides somewhere after the `@`.
/// `alice@example.` is still rejected while `alice@b.c.` passes, as the
/// pattern allows dots inside the final segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCredentialPolicy;

impl CredentialPolicy for SimpleCredentialPolicy {
    fn is_valid_email(&self, email: &str) -> bool {
        if email.chars().any(char::is_whitespace) {
            return false;
        }
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') {
            return false;
        }
        domain
            .char_indices()
            .any(|(idx, c)| c == '.' && idx > 0 && idx < domain.len() - 1)
    }

    fn is_valid_username(&self, username: &str) -> bool {
        !username.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_simple_policy_accepts_plain_addresses() {
        let policy = SimpleCredentialPolicy;
        assert!(policy.is_valid_email("alice@example.com"));
        assert!(policy.is_valid_email("a.b@mail.example.org"));
        assert!(policy.is_valid_email("x@y.z"));
    }

    #[test]
    fn test_simple_policy_rejects_malformed_addresses() {
        let policy = SimpleCredentialPolicy;
        for bad in [
            "",
            "alice",
            "alice@",
            "@example.com",
            "alice@example",
            "alice@example.",
            "alice@.com",
            "al ice@example.com",
            "alice@@example.com",
            "alice@ex@ample.com",
        ] {
            assert!(!policy.is_valid_email(bad), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_simple_policy_usernames() {
        let policy = SimpleCredentialPolicy;
        assert!(policy.is_valid_username("alice"));
        assert!(!policy.is_valid_username("   "));
        assert!(!policy.is_valid_username(""));
    }

    #[test]
    fn test_fixed_clock_set() {
        let t0 = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(t0);
        clock.set(t1);
        assert_eq!(clock.now(), t1);
    }
}
