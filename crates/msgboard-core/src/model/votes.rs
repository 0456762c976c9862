use serde::{Deserialize, Serialize};

/// Vote tally embedded in posts and comments
///
/// Only ever moves by one in either direction. There is no floor or ceiling
/// short of the i64 range itself; a vote that would leave it is refused and
/// the tally stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Votes {
    score: i64,
}

impl Votes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Returns the new score, or `None` at `i64::MAX`
    pub fn upvote(&mut self) -> Option<i64> {
        self.score = self.score.checked_add(1)?;
        Some(self.score)
    }

    /// Returns the new score, or `None` at `i64::MIN`
    pub fn downvote(&mut self) -> Option<i64> {
        self.score = self.score.checked_sub(1)?;
        Some(self.score)
    }
}
