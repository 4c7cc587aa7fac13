// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Discovery Workflow Application Service
//!
//! Drives a discovery through its lifecycle:
//!
//! ```text
//! Pending → CommunityReview → AstronomerReview → Approved
//!    │             │                  │
//!    └─────────────┴──────────────────┴────────→ Rejected
//! ```
//!
//! Community transitions need no role but may not be triggered by the
//! reporter. Review transitions (approve/reject) and edits go through
//! [`ModerationGate`]. The acting user is always passed in explicitly and its
//! role resolved through the [`IdentityProvider`].
//!
//! Every operation loads, mutates and stores the aggregate once. A failed
//! check returns before anything is written, so state is unchanged on error.
//! Writes are conditional on the state that was loaded: if another request
//! moved the discovery in between, the write is refused and the caller gets
//! a `BusinessRule` error instead of overwriting the newer state.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::vote_ledger::VoteLedger;
use crate::domain::discovery::{Discovery, DiscoveryChanges, DiscoveryId, DiscoveryState, NewDiscovery};
use crate::domain::error::ModerationError;
use crate::domain::events::{AuditEvent, AuditSink};
use crate::domain::moderation::{Actor, ModerationGate, Operation};
use crate::domain::repository::{DiscoveryRepository, RepositoryError, VoteRepository};
use crate::domain::user::{IdentityProvider, UserId};
use crate::domain::vote::ReviewPolicy;

pub struct DiscoveryWorkflow {
    discoveries: Arc<dyn DiscoveryRepository>,
    votes: Arc<dyn VoteRepository>,
    ledger: Arc<VoteLedger>,
    identity: Arc<dyn IdentityProvider>,
    audit: Arc<dyn AuditSink>,
    review_policy: ReviewPolicy,
}

impl DiscoveryWorkflow {
    pub fn new(
        discoveries: Arc<dyn DiscoveryRepository>,
        votes: Arc<dyn VoteRepository>,
        ledger: Arc<VoteLedger>,
        identity: Arc<dyn IdentityProvider>,
        audit: Arc<dyn AuditSink>,
        review_policy: ReviewPolicy,
    ) -> Self {
        Self {
            discoveries,
            votes,
            ledger,
            identity,
            audit,
            review_policy,
        }
    }

    async fn actor(&self, user_id: UserId) -> Result<Actor, ModerationError> {
        let role = self.identity.role_of(user_id).await?;
        Ok(Actor::new(user_id, role))
    }

    async fn load(&self, id: DiscoveryId) -> Result<Discovery, ModerationError> {
        self.discoveries
            .find_by_id(id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("Discovery {}", id)))
    }

    async fn store(&self, discovery: &Discovery, expected: DiscoveryState) -> Result<(), ModerationError> {
        self.discoveries
            .update(discovery, expected)
            .await
            .map_err(|e| concurrent_change(discovery.id, e))
    }

    /// Community transitions need no role, only someone other than the reporter
    fn ensure_not_reporter(discovery: &Discovery, acting_user: UserId) -> Result<(), ModerationError> {
        if discovery.reporter_id == acting_user {
            return Err(ModerationError::Forbidden(
                "reporters cannot advance their own discovery".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate and store a new discovery in `Pending`
    pub async fn submit(&self, new: NewDiscovery) -> Result<Discovery, ModerationError> {
        let discovery = Discovery::submit(new)?;
        self.discoveries.insert(&discovery).await?;

        info!(
            discovery_id = %discovery.id,
            reporter_id = %discovery.reporter_id,
            object_type = discovery.object_type.as_str(),
            "Discovery submitted"
        );
        metrics::counter!("astrodex_discoveries_submitted_total").increment(1);

        self.audit.record(AuditEvent::DiscoveryCreated {
            discovery_id: discovery.id,
            reporter_id: discovery.reporter_id,
            suggested_name: discovery.suggested_name.clone(),
            created_at: discovery.created_at,
        });

        Ok(discovery)
    }

    pub async fn get(&self, id: DiscoveryId) -> Result<Discovery, ModerationError> {
        debug!(discovery_id = %id, "Loading discovery");
        self.load(id).await
    }

    pub async fn list_by_state(&self, state: DiscoveryState) -> Result<Vec<Discovery>, ModerationError> {
        Ok(self.discoveries.list_by_state(state).await?)
    }

    pub async fn list_by_reporter(&self, reporter_id: UserId) -> Result<Vec<Discovery>, ModerationError> {
        Ok(self.discoveries.list_by_reporter(reporter_id).await?)
    }

    /// `Pending → CommunityReview`
    pub async fn open_community_review(
        &self,
        id: DiscoveryId,
        acting_user: UserId,
    ) -> Result<Discovery, ModerationError> {
        let mut discovery = self.load(id).await?;
        Self::ensure_not_reporter(&discovery, acting_user)?;
        let from = discovery.state;
        discovery.open_community_review()?;
        self.store_transition(&discovery, from).await?;
        Ok(discovery)
    }

    /// `CommunityReview → AstronomerReview`, once the review policy is met
    pub async fn advance_to_astronomer_review(
        &self,
        id: DiscoveryId,
        acting_user: UserId,
    ) -> Result<Discovery, ModerationError> {
        let mut discovery = self.load(id).await?;
        Self::ensure_not_reporter(&discovery, acting_user)?;

        if discovery.state == DiscoveryState::CommunityReview {
            let tally = self.ledger.tally(id).await?;
            if !self.review_policy.is_met(&tally) {
                return Err(ModerationError::BusinessRule(format!(
                    "community engagement not met: {} votes at {:.2} approval, need {} at {:.2}",
                    tally.total(),
                    tally.approval_rate(),
                    self.review_policy.min_votes,
                    self.review_policy.min_approval_rate
                )));
            }
        }

        let from = discovery.state;
        discovery.advance_to_astronomer_review()?;
        self.store_transition(&discovery, from).await?;
        Ok(discovery)
    }

    async fn store_transition(&self, discovery: &Discovery, from: DiscoveryState) -> Result<(), ModerationError> {
        self.store(discovery, from).await?;

        info!(
            discovery_id = %discovery.id,
            from = %from,
            to = %discovery.state,
            "Discovery advanced"
        );
        self.audit.record(AuditEvent::DiscoveryAdvanced {
            discovery_id: discovery.id,
            from,
            to: discovery.state,
            advanced_at: discovery.updated_at,
        });
        Ok(())
    }

    /// Approve a discovery in `AstronomerReview`. Moderators only.
    pub async fn approve(&self, id: DiscoveryId, acting_user: UserId) -> Result<Discovery, ModerationError> {
        let actor = self.actor(acting_user).await?;
        let mut discovery = self.load(id).await?;
        ModerationGate::authorize(&actor, discovery.reporter_id, Operation::ReviewDiscovery)?;

        let from = discovery.state;
        discovery.approve(acting_user)?;
        self.store(&discovery, from).await?;

        info!(discovery_id = %id, verified_by = %acting_user, "Discovery approved");
        metrics::counter!("astrodex_discoveries_reviewed_total", "outcome" => "approved").increment(1);

        self.audit.record(AuditEvent::DiscoveryApproved {
            discovery_id: id,
            verified_by: acting_user,
            approved_at: discovery.updated_at,
        });

        Ok(discovery)
    }

    /// Reject a non-terminal discovery. Moderators only.
    pub async fn reject(
        &self,
        id: DiscoveryId,
        acting_user: UserId,
        reason: &str,
    ) -> Result<Discovery, ModerationError> {
        let actor = self.actor(acting_user).await?;
        let mut discovery = self.load(id).await?;
        ModerationGate::authorize(&actor, discovery.reporter_id, Operation::ReviewDiscovery)?;

        let from = discovery.state;
        discovery.reject(reason)?;
        self.store(&discovery, from).await?;

        info!(discovery_id = %id, rejected_by = %acting_user, "Discovery rejected");
        metrics::counter!("astrodex_discoveries_reviewed_total", "outcome" => "rejected").increment(1);

        self.audit.record(AuditEvent::DiscoveryRejected {
            discovery_id: id,
            rejected_by: acting_user,
            reason: reason.trim().to_string(),
            rejected_at: discovery.updated_at,
        });

        Ok(discovery)
    }

    /// Edit fields. The reporter may edit until the discovery is reviewed;
    /// moderators at any time. State is never changed.
    pub async fn update(
        &self,
        id: DiscoveryId,
        acting_user: UserId,
        changes: DiscoveryChanges,
    ) -> Result<Discovery, ModerationError> {
        let actor = self.actor(acting_user).await?;
        let mut discovery = self.load(id).await?;
        ModerationGate::authorize(&actor, discovery.reporter_id, Operation::UpdateDiscovery)?;

        if discovery.is_terminal() && !actor.role.is_moderator() {
            return Err(ModerationError::BusinessRule(format!(
                "discovery already reviewed ({})",
                discovery.state
            )));
        }

        discovery.apply_changes(changes)?;
        self.discoveries
            .update_fields(&discovery, discovery.state)
            .await
            .map_err(|e| concurrent_change(id, e))?;

        info!(discovery_id = %id, updated_by = %acting_user, "Discovery updated");
        self.audit.record(AuditEvent::DiscoveryUpdated {
            discovery_id: id,
            updated_by: acting_user,
            updated_at: discovery.updated_at,
        });

        Ok(discovery)
    }

    /// Remove the discovery and its votes. Reporter or Admin only.
    pub async fn delete(&self, id: DiscoveryId, acting_user: UserId) -> Result<(), ModerationError> {
        let actor = self.actor(acting_user).await?;
        let discovery = self.load(id).await?;
        ModerationGate::authorize(&actor, discovery.reporter_id, Operation::DeleteDiscovery)?;

        let removed_votes = self.votes.delete_by_discovery(id).await?;
        self.discoveries.delete(id).await?;

        info!(
            discovery_id = %id,
            deleted_by = %acting_user,
            removed_votes,
            "Discovery deleted"
        );
        self.audit.record(AuditEvent::DiscoveryDeleted {
            discovery_id: id,
            deleted_by: acting_user,
            deleted_at: chrono::Utc::now(),
        });

        Ok(())
    }
}

fn concurrent_change(id: DiscoveryId, err: RepositoryError) -> ModerationError {
    match err {
        RepositoryError::Conflict(_) => {
            ModerationError::BusinessRule(format!("discovery {} was changed concurrently", id))
        }
        other => other.into(),
    }
}
