// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Discovery Repository
//!
//! `DiscoveryRepository` backed by the `discoveries` table. Enum columns are
//! stored as their snake_case names; coordinates are re-validated on load.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::discovery::{Coordinates, Discovery, DiscoveryId, DiscoveryState, ObjectType};
use crate::domain::repository::{DiscoveryRepository, RepositoryError};
use crate::domain::user::UserId;

const SELECT_COLUMNS: &str = r#"
    SELECT id, reporter_id, object_type, suggested_name, right_ascension, declination,
           description, attachments, state, created_at, updated_at, verified_at, verified_by
    FROM discoveries
"#;

pub struct PostgresDiscoveryRepository {
    pool: PgPool,
}

impl PostgresDiscoveryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explain a conditional write that matched no row
    async fn missed_write(&self, id: DiscoveryId, expected: DiscoveryState) -> RepositoryError {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM discoveries WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await;

        match exists {
            Ok(true) => RepositoryError::Conflict(format!("Discovery {} is no longer {}", id, expected)),
            Ok(false) => RepositoryError::NotFound(format!("Discovery {}", id)),
            Err(e) => e.into(),
        }
    }

    fn row_to_discovery(row: &PgRow) -> Result<Discovery, RepositoryError> {
        let object_type: String = row.try_get("object_type")?;
        let state: String = row.try_get("state")?;
        let coordinates = Coordinates::new(row.try_get("right_ascension")?, row.try_get("declination")?)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        Ok(Discovery {
            id: DiscoveryId(row.try_get("id")?),
            reporter_id: UserId(row.try_get("reporter_id")?),
            object_type: object_type
                .parse::<ObjectType>()
                .map_err(RepositoryError::Serialization)?,
            suggested_name: row.try_get("suggested_name")?,
            coordinates,
            description: row.try_get("description")?,
            attachments: row.try_get("attachments")?,
            state: state
                .parse::<DiscoveryState>()
                .map_err(RepositoryError::Serialization)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            verified_at: row.try_get("verified_at")?,
            verified_by: row.try_get::<Option<uuid::Uuid>, _>("verified_by")?.map(UserId),
        })
    }
}

#[async_trait]
impl DiscoveryRepository for PostgresDiscoveryRepository {
    async fn find_by_id(&self, id: DiscoveryId) -> Result<Option<Discovery>, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_discovery).transpose()
    }

    async fn insert(&self, discovery: &Discovery) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO discoveries (
                id, reporter_id, object_type, suggested_name, right_ascension, declination,
                description, attachments, state, created_at, updated_at, verified_at, verified_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(discovery.id.0)
        .bind(discovery.reporter_id.0)
        .bind(discovery.object_type.as_str())
        .bind(&discovery.suggested_name)
        .bind(discovery.coordinates.right_ascension())
        .bind(discovery.coordinates.declination())
        .bind(&discovery.description)
        .bind(discovery.attachments.as_deref())
        .bind(discovery.state.as_str())
        .bind(discovery.created_at)
        .bind(discovery.updated_at)
        .bind(discovery.verified_at)
        .bind(discovery.verified_by.map(|u| u.0))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, discovery: &Discovery, expected: DiscoveryState) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE discoveries SET
                description = $2,
                state = $3,
                updated_at = $4,
                verified_at = $5,
                verified_by = $6
            WHERE id = $1 AND state = $7
            "#,
        )
        .bind(discovery.id.0)
        .bind(&discovery.description)
        .bind(discovery.state.as_str())
        .bind(discovery.updated_at)
        .bind(discovery.verified_at)
        .bind(discovery.verified_by.map(|u| u.0))
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missed_write(discovery.id, expected).await);
        }
        Ok(())
    }

    async fn update_fields(&self, discovery: &Discovery, expected: DiscoveryState) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE discoveries SET
                object_type = $2,
                suggested_name = $3,
                right_ascension = $4,
                declination = $5,
                description = $6,
                attachments = $7,
                updated_at = $8
            WHERE id = $1 AND state = $9
            "#,
        )
        .bind(discovery.id.0)
        .bind(discovery.object_type.as_str())
        .bind(&discovery.suggested_name)
        .bind(discovery.coordinates.right_ascension())
        .bind(discovery.coordinates.declination())
        .bind(&discovery.description)
        .bind(discovery.attachments.as_deref())
        .bind(discovery.updated_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missed_write(discovery.id, expected).await);
        }
        Ok(())
    }

    async fn delete(&self, id: DiscoveryId) -> Result<(), RepositoryError> {
        // votes go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM discoveries WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Discovery {}", id)));
        }
        Ok(())
    }

    async fn list_by_state(&self, state: DiscoveryState) -> Result<Vec<Discovery>, RepositoryError> {
        let rows = sqlx::query(&format!("{} WHERE state = $1 ORDER BY created_at ASC", SELECT_COLUMNS))
            .bind(state.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_discovery).collect()
    }

    async fn list_by_reporter(&self, reporter_id: UserId) -> Result<Vec<Discovery>, RepositoryError> {
        let rows = sqlx::query(&format!("{} WHERE reporter_id = $1 ORDER BY created_at ASC", SELECT_COLUMNS))
            .bind(reporter_id.0)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_discovery).collect()
    }
}
