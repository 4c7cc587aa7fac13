// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::discovery::DiscoveryId;
use crate::domain::user::UserId;

/// Default maximum comment length in characters
pub const DEFAULT_MAX_COMMENT_LEN: usize = 5_000;

/// Unique identifier for a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for CommentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a catalogue article. Articles themselves live outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleId(pub Uuid);

impl ArticleId {
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The discussion a comment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum CommentRoot {
    Discovery(DiscoveryId),
    Article(ArticleId),
}

impl CommentRoot {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Discovery(_) => "discovery",
            Self::Article(_) => "article",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Discovery(id) => id.0,
            Self::Article(id) => id.0,
        }
    }
}

impl std::fmt::Display for CommentRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub root: CommentRoot,
    pub author_id: UserId,
    pub content: String,
    pub parent_id: Option<CommentId>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        root: CommentRoot,
        author_id: UserId,
        content: &str,
        parent_id: Option<CommentId>,
        max_len: usize,
    ) -> Result<Self, CommentError> {
        Ok(Self {
            id: CommentId::new(),
            root,
            author_id,
            content: validate_content(content, max_len)?,
            parent_id,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    /// Replace the content. Only active comments can be edited.
    pub fn edit(&mut self, content: &str, max_len: usize) -> Result<(), CommentError> {
        if !self.is_active {
            return Err(CommentError::Inactive(self.id));
        }
        self.content = validate_content(content, max_len)?;
        Ok(())
    }

    /// Soft delete. Returns `false` when the comment was already inactive.
    pub fn deactivate(&mut self) -> bool {
        std::mem::replace(&mut self.is_active, false)
    }
}

fn validate_content(content: &str, max_len: usize) -> Result<String, CommentError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CommentError::EmptyContent);
    }
    if content.chars().count() > max_len {
        return Err(CommentError::ContentTooLong(max_len));
    }
    Ok(content.to_string())
}

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("Comment content cannot be empty")]
    EmptyContent,

    #[error("Comment too long (max {0} characters)")]
    ContentTooLong(usize),

    #[error("Comment {0} is no longer active")]
    Inactive(CommentId),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> CommentRoot {
        CommentRoot::Discovery(DiscoveryId::new())
    }

    #[test]
    fn test_new_comment_is_active_and_trimmed() {
        let comment = Comment::new(root(), UserId::new(), "  clear skies  ", None, 100).unwrap();
        assert!(comment.is_active);
        assert_eq!(comment.content, "clear skies");
    }

    #[test]
    fn test_content_limits() {
        assert!(matches!(
            Comment::new(root(), UserId::new(), "  ", None, 100),
            Err(CommentError::EmptyContent)
        ));
        assert!(matches!(
            Comment::new(root(), UserId::new(), "abcdef", None, 5),
            Err(CommentError::ContentTooLong(5))
        ));
    }

    #[test]
    fn test_deactivate_is_idempotent_and_blocks_edits() {
        let mut comment = Comment::new(root(), UserId::new(), "first light", None, 100).unwrap();
        assert!(comment.deactivate());
        assert!(!comment.deactivate());
        assert!(matches!(comment.edit("edited", 100), Err(CommentError::Inactive(_))));
        assert_eq!(comment.content, "first light");
    }

    #[test]
    fn test_root_serializes_tagged() {
        let id = DiscoveryId::new();
        let json = serde_json::to_value(CommentRoot::Discovery(id)).unwrap();
        assert_eq!(json["type"], "discovery");
        assert_eq!(json["id"], id.0.to_string());
    }
}
