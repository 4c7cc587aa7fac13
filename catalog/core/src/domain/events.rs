// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::comment::{CommentId, CommentRoot};
use crate::domain::discovery::{DiscoveryId, DiscoveryState};
use crate::domain::user::UserId;
use crate::domain::vote::VoteId;

/// Notification emitted after every successful mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    DiscoveryCreated {
        discovery_id: DiscoveryId,
        reporter_id: UserId,
        suggested_name: String,
        created_at: DateTime<Utc>,
    },
    DiscoveryUpdated {
        discovery_id: DiscoveryId,
        updated_by: UserId,
        updated_at: DateTime<Utc>,
    },
    DiscoveryAdvanced {
        discovery_id: DiscoveryId,
        from: DiscoveryState,
        to: DiscoveryState,
        advanced_at: DateTime<Utc>,
    },
    DiscoveryApproved {
        discovery_id: DiscoveryId,
        verified_by: UserId,
        approved_at: DateTime<Utc>,
    },
    DiscoveryRejected {
        discovery_id: DiscoveryId,
        rejected_by: UserId,
        reason: String,
        rejected_at: DateTime<Utc>,
    },
    DiscoveryDeleted {
        discovery_id: DiscoveryId,
        deleted_by: UserId,
        deleted_at: DateTime<Utc>,
    },
    VoteCast {
        vote_id: VoteId,
        discovery_id: DiscoveryId,
        voter_id: UserId,
        is_upvote: bool,
        cast_at: DateTime<Utc>,
    },
    VoteRemoved {
        discovery_id: DiscoveryId,
        voter_id: UserId,
        removed_at: DateTime<Utc>,
    },
    CommentPosted {
        comment_id: CommentId,
        root: CommentRoot,
        author_id: UserId,
        posted_at: DateTime<Utc>,
    },
    CommentEdited {
        comment_id: CommentId,
        author_id: UserId,
        edited_at: DateTime<Utc>,
    },
    CommentDeactivated {
        comment_id: CommentId,
        deactivated_by: UserId,
        deactivated_at: DateTime<Utc>,
    },
}

impl AuditEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::DiscoveryCreated { .. } => "DiscoveryCreated",
            Self::DiscoveryUpdated { .. } => "DiscoveryUpdated",
            Self::DiscoveryAdvanced { .. } => "DiscoveryAdvanced",
            Self::DiscoveryApproved { .. } => "DiscoveryApproved",
            Self::DiscoveryRejected { .. } => "DiscoveryRejected",
            Self::DiscoveryDeleted { .. } => "DiscoveryDeleted",
            Self::VoteCast { .. } => "VoteCast",
            Self::VoteRemoved { .. } => "VoteRemoved",
            Self::CommentPosted { .. } => "CommentPosted",
            Self::CommentEdited { .. } => "CommentEdited",
            Self::CommentDeactivated { .. } => "CommentDeactivated",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::DiscoveryCreated { discovery_id, suggested_name, .. } => {
                format!("Discovery {} '{}' submitted", discovery_id, suggested_name)
            }
            Self::DiscoveryUpdated { discovery_id, .. } => {
                format!("Discovery {} updated", discovery_id)
            }
            Self::DiscoveryAdvanced { discovery_id, from, to, .. } => {
                format!("Discovery {} moved from {} to {}", discovery_id, from, to)
            }
            Self::DiscoveryApproved { discovery_id, .. } => {
                format!("Discovery {} approved", discovery_id)
            }
            Self::DiscoveryRejected { discovery_id, reason, .. } => {
                format!("Discovery {} rejected: {}", discovery_id, reason)
            }
            Self::DiscoveryDeleted { discovery_id, .. } => {
                format!("Discovery {} deleted", discovery_id)
            }
            Self::VoteCast { discovery_id, is_upvote, .. } => format!(
                "{} cast on discovery {}",
                if *is_upvote { "Upvote" } else { "Downvote" },
                discovery_id
            ),
            Self::VoteRemoved { discovery_id, .. } => {
                format!("Vote removed from discovery {}", discovery_id)
            }
            Self::CommentPosted { comment_id, root, .. } => {
                format!("Comment {} posted on {}", comment_id, root)
            }
            Self::CommentEdited { comment_id, .. } => format!("Comment {} edited", comment_id),
            Self::CommentDeactivated { comment_id, .. } => {
                format!("Comment {} deactivated", comment_id)
            }
        }
    }

    pub fn acting_user(&self) -> Option<UserId> {
        match self {
            Self::DiscoveryCreated { reporter_id, .. } => Some(*reporter_id),
            Self::DiscoveryUpdated { updated_by, .. } => Some(*updated_by),
            Self::DiscoveryAdvanced { .. } => None,
            Self::DiscoveryApproved { verified_by, .. } => Some(*verified_by),
            Self::DiscoveryRejected { rejected_by, .. } => Some(*rejected_by),
            Self::DiscoveryDeleted { deleted_by, .. } => Some(*deleted_by),
            Self::VoteCast { voter_id, .. } => Some(*voter_id),
            Self::VoteRemoved { voter_id, .. } => Some(*voter_id),
            Self::CommentPosted { author_id, .. } => Some(*author_id),
            Self::CommentEdited { author_id, .. } => Some(*author_id),
            Self::CommentDeactivated { deactivated_by, .. } => Some(*deactivated_by),
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::DiscoveryCreated { created_at, .. } => *created_at,
            Self::DiscoveryUpdated { updated_at, .. } => *updated_at,
            Self::DiscoveryAdvanced { advanced_at, .. } => *advanced_at,
            Self::DiscoveryApproved { approved_at, .. } => *approved_at,
            Self::DiscoveryRejected { rejected_at, .. } => *rejected_at,
            Self::DiscoveryDeleted { deleted_at, .. } => *deleted_at,
            Self::VoteCast { cast_at, .. } => *cast_at,
            Self::VoteRemoved { removed_at, .. } => *removed_at,
            Self::CommentPosted { posted_at, .. } => *posted_at,
            Self::CommentEdited { edited_at, .. } => *edited_at,
            Self::CommentDeactivated { deactivated_at, .. } => *deactivated_at,
        }
    }
}

/// Receives audit events. Fire-and-forget: implementations swallow and log
/// their own failures, callers never see them.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Persisted form of an audit event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub event_type: String,
    pub description: String,
    pub acting_user: Option<UserId>,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn from_event(event: &AuditEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type: event.event_type().to_string(),
            description: event.description(),
            acting_user: event.acting_user(),
            payload: serde_json::to_value(event)?,
            occurred_at: event.occurred_at(),
        })
    }
}
