// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! Infrastructure implementations of the repository abstractions defined in
//! the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve domain aggregates
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! ## PostgreSQL Repositories
//!
//! - **PostgresDiscoveryRepository**
//! - **PostgresVoteRepository** - relies on `UNIQUE (voter_id, discovery_id)`
//! - **PostgresCommentRepository**
//! - **PostgresAuditLogRepository**
//!
//! ## In-Memory Repositories
//!
//! Lock-guarded `HashMap`/`Vec` stores for tests and development. The vote
//! store performs its duplicate check and insert under one write lock, which
//! gives the same atomicity as the unique index.

pub mod postgres_discovery;
pub mod postgres_vote;
pub mod postgres_comment;
pub mod postgres_audit;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::comment::{Comment, CommentId, CommentRoot};
use crate::domain::discovery::{Discovery, DiscoveryId, DiscoveryState};
use crate::domain::events::AuditRecord;
use crate::domain::repository::{
    AuditLogRepository, CommentRepository, DiscoveryRepository, RepositoryError, VoteRepository,
};
use crate::domain::user::UserId;
use crate::domain::vote::{Vote, VoteId};

#[derive(Clone, Default)]
pub struct InMemoryDiscoveryRepository {
    discoveries: Arc<RwLock<HashMap<DiscoveryId, Discovery>>>,
}

impl InMemoryDiscoveryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn list_where(&self, predicate: impl Fn(&Discovery) -> bool) -> Vec<Discovery> {
        let discoveries = self.discoveries.read().await;
        let mut list: Vec<Discovery> = discoveries.values().filter(|d| predicate(d)).cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        list
    }
}

/// The stored discovery, if it is still in `expected`. Called under the write lock.
fn expect_state(
    discoveries: &mut HashMap<DiscoveryId, Discovery>,
    id: DiscoveryId,
    expected: DiscoveryState,
) -> Result<&mut Discovery, RepositoryError> {
    let existing = discoveries
        .get_mut(&id)
        .ok_or_else(|| RepositoryError::NotFound(format!("Discovery {}", id)))?;
    if existing.state != expected {
        return Err(RepositoryError::Conflict(format!(
            "Discovery {} is {}, expected {}",
            id, existing.state, expected
        )));
    }
    Ok(existing)
}

#[async_trait]
impl DiscoveryRepository for InMemoryDiscoveryRepository {
    async fn find_by_id(&self, id: DiscoveryId) -> Result<Option<Discovery>, RepositoryError> {
        let discoveries = self.discoveries.read().await;
        Ok(discoveries.get(&id).cloned())
    }

    async fn insert(&self, discovery: &Discovery) -> Result<(), RepositoryError> {
        let mut discoveries = self.discoveries.write().await;
        if discoveries.contains_key(&discovery.id) {
            return Err(RepositoryError::Conflict(format!("Discovery {} already exists", discovery.id)));
        }
        discoveries.insert(discovery.id, discovery.clone());
        Ok(())
    }

    async fn update(&self, discovery: &Discovery, expected: DiscoveryState) -> Result<(), RepositoryError> {
        let mut discoveries = self.discoveries.write().await;
        let existing = expect_state(&mut discoveries, discovery.id, expected)?;
        *existing = discovery.clone();
        Ok(())
    }

    async fn update_fields(&self, discovery: &Discovery, expected: DiscoveryState) -> Result<(), RepositoryError> {
        let mut discoveries = self.discoveries.write().await;
        let existing = expect_state(&mut discoveries, discovery.id, expected)?;
        existing.object_type = discovery.object_type;
        existing.suggested_name = discovery.suggested_name.clone();
        existing.coordinates = discovery.coordinates;
        existing.description = discovery.description.clone();
        existing.attachments = discovery.attachments.clone();
        existing.updated_at = discovery.updated_at;
        Ok(())
    }

    async fn delete(&self, id: DiscoveryId) -> Result<(), RepositoryError> {
        let mut discoveries = self.discoveries.write().await;
        discoveries
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("Discovery {}", id)))
    }

    async fn list_by_state(&self, state: DiscoveryState) -> Result<Vec<Discovery>, RepositoryError> {
        Ok(self.list_where(|d| d.state == state).await)
    }

    async fn list_by_reporter(&self, reporter_id: UserId) -> Result<Vec<Discovery>, RepositoryError> {
        Ok(self.list_where(|d| d.reporter_id == reporter_id).await)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryVoteRepository {
    votes: Arc<RwLock<HashMap<VoteId, Vote>>>,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn count(&self, discovery_id: DiscoveryId, upvote: bool) -> u64 {
        let votes = self.votes.read().await;
        votes
            .values()
            .filter(|v| v.discovery_id == discovery_id && v.is_upvote == upvote)
            .count() as u64
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn find(&self, voter_id: UserId, discovery_id: DiscoveryId) -> Result<Option<Vote>, RepositoryError> {
        let votes = self.votes.read().await;
        Ok(votes
            .values()
            .find(|v| v.voter_id == voter_id && v.discovery_id == discovery_id)
            .cloned())
    }

    async fn insert(&self, vote: &Vote) -> Result<(), RepositoryError> {
        let mut votes = self.votes.write().await;
        let duplicate = votes
            .values()
            .any(|v| v.voter_id == vote.voter_id && v.discovery_id == vote.discovery_id);
        if duplicate {
            return Err(RepositoryError::Conflict(format!(
                "User {} already voted on discovery {}",
                vote.voter_id, vote.discovery_id
            )));
        }
        votes.insert(vote.id, vote.clone());
        Ok(())
    }

    async fn delete(&self, id: VoteId) -> Result<(), RepositoryError> {
        let mut votes = self.votes.write().await;
        votes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("Vote {}", id)))
    }

    async fn delete_by_discovery(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError> {
        let mut votes = self.votes.write().await;
        let before = votes.len();
        votes.retain(|_, v| v.discovery_id != discovery_id);
        Ok((before - votes.len()) as u64)
    }

    async fn count_upvotes(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError> {
        Ok(self.count(discovery_id, true).await)
    }

    async fn count_downvotes(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError> {
        Ok(self.count(discovery_id, false).await)
    }

    async fn list_by_discovery(&self, discovery_id: DiscoveryId) -> Result<Vec<Vote>, RepositoryError> {
        let votes = self.votes.read().await;
        let mut list: Vec<Vote> = votes
            .values()
            .filter(|v| v.discovery_id == discovery_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }
}

/// Comments are kept in insertion order so equal timestamps stay stable
#[derive(Clone, Default)]
pub struct InMemoryCommentRepository {
    comments: Arc<RwLock<Vec<Comment>>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let comments = self.comments.read().await;
        Ok(comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_by_root(&self, root: CommentRoot) -> Result<Vec<Comment>, RepositoryError> {
        let comments = self.comments.read().await;
        let mut list: Vec<Comment> = comments.iter().filter(|c| c.root == root).cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(list)
    }

    async fn insert(&self, comment: &Comment) -> Result<(), RepositoryError> {
        let mut comments = self.comments.write().await;
        if comments.iter().any(|c| c.id == comment.id) {
            return Err(RepositoryError::Conflict(format!("Comment {} already exists", comment.id)));
        }
        comments.push(comment.clone());
        Ok(())
    }

    async fn update(&self, comment: &Comment) -> Result<(), RepositoryError> {
        let mut comments = self.comments.write().await;
        match comments.iter_mut().find(|c| c.id == comment.id) {
            Some(existing) => {
                *existing = comment.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("Comment {}", comment.id))),
        }
    }

    async fn soft_deactivate(&self, id: CommentId) -> Result<(), RepositoryError> {
        let mut comments = self.comments.write().await;
        match comments.iter_mut().find(|c| c.id == id) {
            Some(existing) => {
                existing.is_active = false;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!("Comment {}", id))),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAuditLogRepository {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn save(&self, record: &AuditRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}
