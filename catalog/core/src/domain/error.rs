// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Moderation Error Taxonomy
//!
//! Every use case fails with exactly one [`ModerationError`] kind. The
//! presentation layer maps each kind to its own status code.

use thiserror::Error;

use crate::domain::comment::CommentError;
use crate::domain::discovery::DiscoveryError;
use crate::domain::moderation::Forbidden;
use crate::domain::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum ModerationError {
    /// Malformed input, duplicate vote, invalid state transition
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Self-vote, already reviewed, engagement threshold not met
    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    Repository(RepositoryError),
}

impl ModerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::BusinessRule(_) => "business_rule_error",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Repository(_) => "storage_error",
        }
    }
}

impl From<DiscoveryError> for ModerationError {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::AlreadyReviewed(_) => Self::BusinessRule(err.to_string()),
            DiscoveryError::InvalidCoordinates(_)
            | DiscoveryError::InvalidField(_)
            | DiscoveryError::InvalidStateTransition { .. } => Self::Validation(err.to_string()),
        }
    }
}

impl From<CommentError> for ModerationError {
    fn from(err: CommentError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<Forbidden> for ModerationError {
    fn from(err: Forbidden) -> Self {
        Self::Forbidden(err.to_string())
    }
}

impl From<RepositoryError> for ModerationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => Self::NotFound(what),
            other => Self::Repository(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discovery::DiscoveryState;

    #[test]
    fn test_discovery_errors_split_into_validation_and_business_rule() {
        let transition = DiscoveryError::InvalidStateTransition {
            from: DiscoveryState::Pending,
            to: DiscoveryState::Approved,
        };
        assert!(matches!(ModerationError::from(transition), ModerationError::Validation(_)));

        let reviewed = DiscoveryError::AlreadyReviewed(DiscoveryState::Approved);
        assert!(matches!(ModerationError::from(reviewed), ModerationError::BusinessRule(_)));
    }

    #[test]
    fn test_repository_not_found_surfaces_as_not_found() {
        let err = ModerationError::from(RepositoryError::NotFound("vote".to_string()));
        assert_eq!(err.kind(), "not_found");

        let err = ModerationError::from(RepositoryError::Database("down".to_string()));
        assert_eq!(err.kind(), "storage_error");
    }
}
