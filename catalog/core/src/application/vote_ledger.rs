// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Vote Ledger Application Service
//!
//! One vote per (voter, discovery), plus the aggregate counts derived from
//! them.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Collaborators:**
//!   - Domain: `Vote`, `VoteTally`, `Discovery` (ownership, lifecycle)
//!   - Infrastructure: `DiscoveryRepository`, `VoteRepository`, `AuditSink`
//!
//! The duplicate-vote rule is not checked here. The vote store rejects the
//! second insert atomically and the ledger translates that `Conflict` into
//! `ModerationError::Validation("already voted")`.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::discovery::DiscoveryId;
use crate::domain::error::ModerationError;
use crate::domain::events::{AuditEvent, AuditSink};
use crate::domain::repository::{DiscoveryRepository, RepositoryError, VoteRepository};
use crate::domain::user::UserId;
use crate::domain::vote::{Vote, VoteTally};

pub struct VoteLedger {
    discoveries: Arc<dyn DiscoveryRepository>,
    votes: Arc<dyn VoteRepository>,
    audit: Arc<dyn AuditSink>,
}

impl VoteLedger {
    pub fn new(
        discoveries: Arc<dyn DiscoveryRepository>,
        votes: Arc<dyn VoteRepository>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            discoveries,
            votes,
            audit,
        }
    }

    /// Record a vote.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the discovery does not exist
    /// - `BusinessRule`: the voter reported the discovery, or it is already reviewed
    /// - `Validation`: the voter already voted on this discovery
    pub async fn cast(
        &self,
        discovery_id: DiscoveryId,
        voter_id: UserId,
        is_upvote: bool,
        comment: Option<String>,
    ) -> Result<Vote, ModerationError> {
        let discovery = self
            .discoveries
            .find_by_id(discovery_id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("Discovery {}", discovery_id)))?;

        if discovery.reporter_id == voter_id {
            return Err(ModerationError::BusinessRule(
                "reporters cannot vote on their own discovery".to_string(),
            ));
        }
        // Not atomic with the insert below: a vote racing an approve or reject
        // can still land after it. Tallies only gate the advance out of
        // community review, which a reviewed discovery never takes.
        if discovery.is_terminal() {
            return Err(ModerationError::BusinessRule(format!(
                "discovery already reviewed ({})",
                discovery.state
            )));
        }

        let vote = Vote::new(discovery_id, voter_id, is_upvote, comment);
        self.votes.insert(&vote).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => ModerationError::Validation("already voted".to_string()),
            other => ModerationError::from(other),
        })?;

        info!(
            discovery_id = %discovery_id,
            voter_id = %voter_id,
            is_upvote,
            "Vote cast"
        );
        metrics::counter!(
            "astrodex_votes_cast_total",
            "direction" => if is_upvote { "up" } else { "down" }
        )
        .increment(1);

        self.audit.record(AuditEvent::VoteCast {
            vote_id: vote.id,
            discovery_id,
            voter_id,
            is_upvote,
            cast_at: vote.created_at,
        });

        Ok(vote)
    }

    /// Withdraw the voter's vote; `NotFound` when there is none
    pub async fn remove(&self, discovery_id: DiscoveryId, voter_id: UserId) -> Result<(), ModerationError> {
        let vote = self
            .votes
            .find(voter_id, discovery_id)
            .await?
            .ok_or_else(|| {
                ModerationError::NotFound(format!(
                    "Vote by {} on discovery {}",
                    voter_id, discovery_id
                ))
            })?;

        self.votes.delete(vote.id).await?;

        info!(discovery_id = %discovery_id, voter_id = %voter_id, "Vote removed");
        self.audit.record(AuditEvent::VoteRemoved {
            discovery_id,
            voter_id,
            removed_at: chrono::Utc::now(),
        });

        Ok(())
    }

    pub async fn upvotes(&self, discovery_id: DiscoveryId) -> Result<u64, ModerationError> {
        Ok(self.votes.count_upvotes(discovery_id).await?)
    }

    pub async fn downvotes(&self, discovery_id: DiscoveryId) -> Result<u64, ModerationError> {
        Ok(self.votes.count_downvotes(discovery_id).await?)
    }

    /// `upvotes / (upvotes + downvotes)`, `0.0` without votes
    pub async fn approval_rate(&self, discovery_id: DiscoveryId) -> Result<f64, ModerationError> {
        Ok(self.tally(discovery_id).await?.approval_rate())
    }

    pub async fn tally(&self, discovery_id: DiscoveryId) -> Result<VoteTally, ModerationError> {
        let upvotes = self.upvotes(discovery_id).await?;
        let downvotes = self.downvotes(discovery_id).await?;
        debug!(discovery_id = %discovery_id, upvotes, downvotes, "Vote tally");
        Ok(VoteTally::new(upvotes, downvotes))
    }

    /// Every vote on an existing discovery, oldest first
    pub async fn votes(&self, discovery_id: DiscoveryId) -> Result<Vec<Vote>, ModerationError> {
        if self.discoveries.find_by_id(discovery_id).await?.is_none() {
            return Err(ModerationError::NotFound(format!("Discovery {}", discovery_id)));
        }
        Ok(self.votes.list_by_discovery(discovery_id).await?)
    }
}
