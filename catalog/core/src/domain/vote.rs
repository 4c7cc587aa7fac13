// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::discovery::DiscoveryId;
use crate::domain::user::UserId;

/// Unique identifier for a vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteId(pub Uuid);

impl VoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for VoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single user's judgment on a discovery.
///
/// At most one per (voter, discovery); never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub discovery_id: DiscoveryId,
    pub voter_id: UserId,
    pub is_upvote: bool,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(
        discovery_id: DiscoveryId,
        voter_id: UserId,
        is_upvote: bool,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: VoteId::new(),
            discovery_id,
            voter_id,
            is_upvote,
            comment: comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            created_at: Utc::now(),
        }
    }
}

/// Aggregate vote counts for one discovery
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VoteTally {
    pub upvotes: u64,
    pub downvotes: u64,
}

impl VoteTally {
    pub fn new(upvotes: u64, downvotes: u64) -> Self {
        Self { upvotes, downvotes }
    }

    pub fn total(&self) -> u64 {
        self.upvotes + self.downvotes
    }

    /// `upvotes / total`, exactly `0.0` when there are no votes
    pub fn approval_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.upvotes as f64 / total as f64
    }
}

/// Community engagement a discovery needs before astronomers review it
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewPolicy {
    /// Minimum number of votes cast, up or down
    #[serde(default)]
    pub min_votes: u64,
    /// Minimum approval rate in `[0, 1]`
    #[serde(default)]
    pub min_approval_rate: f64,
}

impl ReviewPolicy {
    pub fn is_met(&self, tally: &VoteTally) -> bool {
        tally.total() >= self.min_votes && tally.approval_rate() >= self.min_approval_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_rate_is_zero_without_votes() {
        let tally = VoteTally::default();
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.approval_rate(), 0.0);
        assert!(!tally.approval_rate().is_nan());
    }

    #[test]
    fn test_approval_rate_bounds() {
        for (up, down) in [(0, 5), (5, 0), (3, 1), (1, 3), (7, 7)] {
            let rate = VoteTally::new(up, down).approval_rate();
            assert!((0.0..=1.0).contains(&rate), "{} / {} gave {}", up, down, rate);
        }
        assert_eq!(VoteTally::new(3, 1).approval_rate(), 0.75);
        assert_eq!(VoteTally::new(0, 4).approval_rate(), 0.0);
        assert_eq!(VoteTally::new(4, 0).approval_rate(), 1.0);
    }

    #[test]
    fn test_blank_vote_comment_is_dropped() {
        let vote = Vote::new(DiscoveryId::new(), UserId::new(), true, Some("   ".to_string()));
        assert!(vote.comment.is_none());
    }

    #[test]
    fn test_default_review_policy_accepts_everything() {
        assert!(ReviewPolicy::default().is_met(&VoteTally::default()));
    }

    #[test]
    fn test_review_policy_needs_both_thresholds() {
        let policy = ReviewPolicy {
            min_votes: 4,
            min_approval_rate: 0.6,
        };
        assert!(!policy.is_met(&VoteTally::new(3, 0)));
        assert!(!policy.is_met(&VoteTally::new(2, 2)));
        assert!(policy.is_met(&VoteTally::new(3, 1)));
    }
}
