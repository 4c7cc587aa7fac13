// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Comment Repository
//!
//! Comments of discoveries and articles share one table, keyed by
//! `(root_type, root_id)`. Soft delete only; no row is ever removed here.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::comment::{ArticleId, Comment, CommentId, CommentRoot};
use crate::domain::discovery::DiscoveryId;
use crate::domain::repository::{CommentRepository, RepositoryError};
use crate::domain::user::UserId;

pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_comment(row: &PgRow) -> Result<Comment, RepositoryError> {
        let root_type: String = row.try_get("root_type")?;
        let root_id: uuid::Uuid = row.try_get("root_id")?;
        let root = match root_type.as_str() {
            "discovery" => CommentRoot::Discovery(DiscoveryId(root_id)),
            "article" => CommentRoot::Article(ArticleId(root_id)),
            other => {
                return Err(RepositoryError::Serialization(format!(
                    "Unknown comment root type: {}",
                    other
                )))
            }
        };

        Ok(Comment {
            id: CommentId(row.try_get("id")?),
            root,
            author_id: UserId(row.try_get("author_id")?),
            content: row.try_get("content")?,
            parent_id: row.try_get::<Option<uuid::Uuid>, _>("parent_id")?.map(CommentId),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_id(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, root_type, root_id, author_id, content, parent_id, is_active, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_comment).transpose()
    }

    async fn list_by_root(&self, root: CommentRoot) -> Result<Vec<Comment>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, root_type, root_id, author_id, content, parent_id, is_active, created_at
            FROM comments
            WHERE root_type = $1 AND root_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(root.kind())
        .bind(root.id())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_comment).collect()
    }

    async fn insert(&self, comment: &Comment) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, root_type, root_id, author_id, content, parent_id, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(comment.id.0)
        .bind(comment.root.kind())
        .bind(comment.root.id())
        .bind(comment.author_id.0)
        .bind(&comment.content)
        .bind(comment.parent_id.map(|p| p.0))
        .bind(comment.is_active)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, comment: &Comment) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE comments SET content = $2, is_active = $3 WHERE id = $1")
            .bind(comment.id.0)
            .bind(&comment.content)
            .bind(comment.is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Comment {}", comment.id)));
        }
        Ok(())
    }

    async fn soft_deactivate(&self, id: CommentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE comments SET is_active = FALSE WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Comment {}", id)));
        }
        Ok(())
    }
}
