// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate, following the DDD Repository
//! pattern: one repository per aggregate, interface defined in the domain
//! layer, implemented in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `DiscoveryRepository` | `Discovery` | `InMemoryDiscoveryRepository`, `PostgresDiscoveryRepository` |
//! | `VoteRepository` | `Vote` | `InMemoryVoteRepository`, `PostgresVoteRepository` |
//! | `CommentRepository` | `Comment` | `InMemoryCommentRepository`, `PostgresCommentRepository` |
//! | `AuditLogRepository` | `AuditRecord` | `InMemoryAuditLogRepository`, `PostgresAuditLogRepository` |
//!
//! ## Vote uniqueness
//!
//! "One vote per (voter, discovery)" is a storage-level constraint.
//! [`VoteRepository::insert`] must check and insert atomically and report a
//! duplicate as [`RepositoryError::Conflict`]; the application layer never
//! pre-checks.
//!
//! ## Discovery writes
//!
//! Both discovery write methods take the state the caller loaded and only
//! apply when the stored row is still in that state. A row that moved on is
//! reported as [`RepositoryError::Conflict`], so a slow write can never undo
//! a concurrent approve or reject.

use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentId, CommentRoot};
use crate::domain::discovery::{Discovery, DiscoveryId, DiscoveryState};
use crate::domain::events::AuditRecord;
use crate::domain::user::UserId;
use crate::domain::vote::{Vote, VoteId};

/// Storage backend enum for pluggable persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    PostgreSQL(PostgresConfig),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresConfig {
    pub connection_string: String,
}

#[async_trait]
pub trait DiscoveryRepository: Send + Sync {
    async fn find_by_id(&self, id: DiscoveryId) -> Result<Option<Discovery>, RepositoryError>;

    async fn insert(&self, discovery: &Discovery) -> Result<(), RepositoryError>;

    /// Store a transition (state, verification, description and
    /// timestamps), provided the stored state is still `expected`.
    /// `Conflict` if it is not, `NotFound` if the discovery is gone.
    async fn update(&self, discovery: &Discovery, expected: DiscoveryState) -> Result<(), RepositoryError>;

    /// Store edited fields only; state and verification are left as stored.
    /// Same precondition and errors as [`update`](Self::update).
    async fn update_fields(&self, discovery: &Discovery, expected: DiscoveryState) -> Result<(), RepositoryError>;

    /// Delete the discovery; `NotFound` if it does not exist. Votes are
    /// removed by the caller via [`VoteRepository::delete_by_discovery`].
    async fn delete(&self, id: DiscoveryId) -> Result<(), RepositoryError>;

    async fn list_by_state(&self, state: DiscoveryState) -> Result<Vec<Discovery>, RepositoryError>;

    async fn list_by_reporter(&self, reporter_id: UserId) -> Result<Vec<Discovery>, RepositoryError>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn find(&self, voter_id: UserId, discovery_id: DiscoveryId) -> Result<Option<Vote>, RepositoryError>;

    /// Atomic conditional insert; `Conflict` when (voter, discovery) already has a vote
    async fn insert(&self, vote: &Vote) -> Result<(), RepositoryError>;

    async fn delete(&self, id: VoteId) -> Result<(), RepositoryError>;

    async fn delete_by_discovery(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError>;

    async fn count_upvotes(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError>;

    async fn count_downvotes(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError>;

    /// Oldest first
    async fn list_by_discovery(&self, discovery_id: DiscoveryId) -> Result<Vec<Vote>, RepositoryError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError>;

    /// Every comment of the root, active or not, ordered by `created_at` ascending
    async fn list_by_root(&self, root: CommentRoot) -> Result<Vec<Comment>, RepositoryError>;

    async fn insert(&self, comment: &Comment) -> Result<(), RepositoryError>;

    async fn update(&self, comment: &Comment) -> Result<(), RepositoryError>;

    async fn soft_deactivate(&self, id: CommentId) -> Result<(), RepositoryError>;
}

/// Audit trail storage fed by the audit persister
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn save(&self, record: &AuditRecord) -> Result<(), RepositoryError>;

    /// Most recent first
    async fn find_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
