// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::events::AuditRecord;
use crate::domain::repository::{AuditLogRepository, RepositoryError};
use crate::domain::user::UserId;

/// Append-only `audit_log` table
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn save(&self, record: &AuditRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (event_type, description, acting_user, payload, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.event_type)
        .bind(&record.description)
        .bind(record.acting_user.map(|u| u.0))
        .bind(&record.payload)
        .bind(record.occurred_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> Result<Vec<AuditRecord>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT event_type, description, acting_user, payload, occurred_at
            FROM audit_log
            ORDER BY occurred_at DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(AuditRecord {
                    event_type: row.try_get("event_type")?,
                    description: row.try_get("description")?,
                    acting_user: row.try_get::<Option<uuid::Uuid>, _>("acting_user")?.map(UserId),
                    payload: row.try_get("payload")?,
                    occurred_at: row.try_get("occurred_at")?,
                })
            })
            .collect()
    }
}
