// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Repository Factory - Application Layer
//!
//! Creates concrete repository implementations based on the storage backend
//! configuration. The domain layer only knows the traits; this is the one
//! place that picks in-memory or PostgreSQL adapters.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::domain::repository::{
    AuditLogRepository, CommentRepository, DiscoveryRepository, StorageBackend, VoteRepository,
};
use crate::infrastructure::db::Database;
use crate::infrastructure::repositories::postgres_audit::PostgresAuditLogRepository;
use crate::infrastructure::repositories::postgres_comment::PostgresCommentRepository;
use crate::infrastructure::repositories::postgres_discovery::PostgresDiscoveryRepository;
use crate::infrastructure::repositories::postgres_vote::PostgresVoteRepository;
use crate::infrastructure::repositories::{
    InMemoryAuditLogRepository, InMemoryCommentRepository, InMemoryDiscoveryRepository,
    InMemoryVoteRepository,
};

/// One repository per aggregate, all on the same backend
#[derive(Clone)]
pub struct Repositories {
    pub discoveries: Arc<dyn DiscoveryRepository>,
    pub votes: Arc<dyn VoteRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub audit_log: Arc<dyn AuditLogRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            discoveries: Arc::new(InMemoryDiscoveryRepository::new()),
            votes: Arc::new(InMemoryVoteRepository::new()),
            comments: Arc::new(InMemoryCommentRepository::new()),
            audit_log: Arc::new(InMemoryAuditLogRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            discoveries: Arc::new(PostgresDiscoveryRepository::new(pool.clone())),
            votes: Arc::new(PostgresVoteRepository::new(pool.clone())),
            comments: Arc::new(PostgresCommentRepository::new(pool.clone())),
            audit_log: Arc::new(PostgresAuditLogRepository::new(pool)),
        }
    }

    /// Build the repositories for `backend`. PostgreSQL connects and applies
    /// the schema first.
    pub async fn from_backend(backend: &StorageBackend, max_connections: u32) -> Result<Self> {
        match backend {
            StorageBackend::InMemory => {
                info!("Using in-memory repositories");
                Ok(Self::in_memory())
            }
            StorageBackend::PostgreSQL(config) => {
                info!("Using PostgreSQL repositories");
                let database = Database::new(&config.connection_string, max_connections).await?;
                database.apply_schema().await?;
                Ok(Self::postgres(database.get_pool().clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_backend_needs_no_database() {
        let repos = Repositories::from_backend(&StorageBackend::InMemory, 1).await.unwrap();
        let recent = repos.audit_log.find_recent(10).await.unwrap();
        assert!(recent.is_empty());
    }
}
