// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Vote Repository
//!
//! Uniqueness of (voter, discovery) is the `uq_votes_voter_discovery`
//! constraint. `insert` is a single `INSERT … ON CONFLICT DO NOTHING`; zero
//! affected rows means another vote already holds the pair.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::discovery::DiscoveryId;
use crate::domain::repository::{RepositoryError, VoteRepository};
use crate::domain::user::UserId;
use crate::domain::vote::{Vote, VoteId};

pub struct PostgresVoteRepository {
    pool: PgPool,
}

impl PostgresVoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_vote(row: &PgRow) -> Result<Vote, RepositoryError> {
        Ok(Vote {
            id: VoteId(row.try_get("id")?),
            discovery_id: DiscoveryId(row.try_get("discovery_id")?),
            voter_id: UserId(row.try_get("voter_id")?),
            is_upvote: row.try_get("is_upvote")?,
            comment: row.try_get("comment")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn count(&self, discovery_id: DiscoveryId, upvote: bool) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM votes WHERE discovery_id = $1 AND is_upvote = $2",
        )
        .bind(discovery_id.0)
        .bind(upvote)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn find(&self, voter_id: UserId, discovery_id: DiscoveryId) -> Result<Option<Vote>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, discovery_id, voter_id, is_upvote, comment, created_at
            FROM votes
            WHERE voter_id = $1 AND discovery_id = $2
            "#,
        )
        .bind(voter_id.0)
        .bind(discovery_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_vote).transpose()
    }

    async fn insert(&self, vote: &Vote) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO votes (id, discovery_id, voter_id, is_upvote, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ON CONSTRAINT uq_votes_voter_discovery DO NOTHING
            "#,
        )
        .bind(vote.id.0)
        .bind(vote.discovery_id.0)
        .bind(vote.voter_id.0)
        .bind(vote.is_upvote)
        .bind(vote.comment.as_deref())
        .bind(vote.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                RepositoryError::NotFound(format!("Discovery {}", vote.discovery_id))
            }
            other => RepositoryError::from(other),
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "User {} already voted on discovery {}",
                vote.voter_id, vote.discovery_id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: VoteId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM votes WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Vote {}", id)));
        }
        Ok(())
    }

    async fn delete_by_discovery(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM votes WHERE discovery_id = $1")
            .bind(discovery_id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_upvotes(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError> {
        self.count(discovery_id, true).await
    }

    async fn count_downvotes(&self, discovery_id: DiscoveryId) -> Result<u64, RepositoryError> {
        self.count(discovery_id, false).await
    }

    async fn list_by_discovery(&self, discovery_id: DiscoveryId) -> Result<Vec<Vote>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, discovery_id, voter_id, is_upvote, comment, created_at
            FROM votes
            WHERE discovery_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(discovery_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_vote).collect()
    }
}
