// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Comment Application Service
//!
//! Posting, editing and soft-deactivating comments on discoveries and
//! articles, plus thread reconstruction through
//! [`build_thread`](crate::domain::thread::build_thread).
//!
//! Comments are never hard-deleted. An edit is author-only; deactivation is
//! open to the author and to moderators. Replies nest at most `max_depth`
//! levels below a top-level comment.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::comment::{Comment, CommentId, CommentRoot};
use crate::domain::error::ModerationError;
use crate::domain::events::{AuditEvent, AuditSink};
use crate::domain::moderation::{Actor, ModerationGate, Operation};
use crate::domain::repository::{CommentRepository, DiscoveryRepository};
use crate::domain::thread::{build_thread, CommentTree, OrphanPolicy};
use crate::domain::user::{IdentityProvider, UserId};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    discoveries: Arc<dyn DiscoveryRepository>,
    identity: Arc<dyn IdentityProvider>,
    audit: Arc<dyn AuditSink>,
    orphan_policy: OrphanPolicy,
    max_length: usize,
    max_depth: usize,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        discoveries: Arc<dyn DiscoveryRepository>,
        identity: Arc<dyn IdentityProvider>,
        audit: Arc<dyn AuditSink>,
        orphan_policy: OrphanPolicy,
        max_length: usize,
        max_depth: usize,
    ) -> Self {
        Self {
            comments,
            discoveries,
            identity,
            audit,
            orphan_policy,
            max_length,
            max_depth,
        }
    }

    /// Discovery roots must exist. Articles live outside this crate and are
    /// taken as given.
    async fn ensure_root(&self, root: CommentRoot) -> Result<(), ModerationError> {
        if let CommentRoot::Discovery(discovery_id) = root {
            if self.discoveries.find_by_id(discovery_id).await?.is_none() {
                return Err(ModerationError::NotFound(format!("Discovery {}", discovery_id)));
            }
        }
        Ok(())
    }

    async fn load(&self, id: CommentId) -> Result<Comment, ModerationError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| ModerationError::NotFound(format!("Comment {}", id)))
    }

    /// Depth a reply to `parent` would sit at, top-level comments being 0.
    /// The walk up the ancestors stops once the cap is passed.
    async fn reply_depth(&self, parent: &Comment) -> Result<usize, ModerationError> {
        let mut depth = 1;
        let mut ancestor = parent.parent_id;
        while let Some(id) = ancestor {
            depth += 1;
            if depth > self.max_depth {
                break;
            }
            ancestor = self.comments.find_by_id(id).await?.and_then(|c| c.parent_id);
        }
        Ok(depth)
    }

    async fn actor(&self, user_id: UserId) -> Result<Actor, ModerationError> {
        let role = self.identity.role_of(user_id).await?;
        Ok(Actor::new(user_id, role))
    }

    pub async fn post(
        &self,
        root: CommentRoot,
        author_id: UserId,
        content: &str,
        parent_id: Option<CommentId>,
    ) -> Result<Comment, ModerationError> {
        self.ensure_root(root).await?;
        let comment = Comment::new(root, author_id, content, parent_id, self.max_length)?;

        if let Some(parent_id) = parent_id {
            let parent = self.comments.find_by_id(parent_id).await?.ok_or_else(|| {
                ModerationError::Validation(format!("parent comment {} does not exist", parent_id))
            })?;
            if !parent.is_active {
                return Err(ModerationError::Validation(format!(
                    "parent comment {} is inactive",
                    parent_id
                )));
            }
            if parent.root != root {
                return Err(ModerationError::Validation(format!(
                    "parent comment {} belongs to {}",
                    parent_id, parent.root
                )));
            }
            if self.reply_depth(&parent).await? > self.max_depth {
                return Err(ModerationError::Validation(format!(
                    "replies may nest at most {} levels deep",
                    self.max_depth
                )));
            }
        }

        self.comments.insert(&comment).await?;

        info!(comment_id = %comment.id, root = %root, author_id = %author_id, "Comment posted");
        metrics::counter!("astrodex_comments_posted_total", "root" => root.kind()).increment(1);

        self.audit.record(AuditEvent::CommentPosted {
            comment_id: comment.id,
            root,
            author_id,
            posted_at: comment.created_at,
        });

        Ok(comment)
    }

    pub async fn edit(
        &self,
        id: CommentId,
        acting_user: UserId,
        content: &str,
    ) -> Result<Comment, ModerationError> {
        let actor = self.actor(acting_user).await?;
        let mut comment = self.load(id).await?;
        ModerationGate::authorize(&actor, comment.author_id, Operation::EditComment)?;

        comment.edit(content, self.max_length)?;
        self.comments.update(&comment).await?;

        info!(comment_id = %id, "Comment edited");
        self.audit.record(AuditEvent::CommentEdited {
            comment_id: id,
            author_id: acting_user,
            edited_at: chrono::Utc::now(),
        });

        Ok(comment)
    }

    /// Soft delete. Deactivating an inactive comment succeeds without effect.
    pub async fn deactivate(&self, id: CommentId, acting_user: UserId) -> Result<Comment, ModerationError> {
        let actor = self.actor(acting_user).await?;
        let mut comment = self.load(id).await?;
        ModerationGate::authorize(&actor, comment.author_id, Operation::DeactivateComment)?;

        if !comment.deactivate() {
            debug!(comment_id = %id, "Comment already inactive");
            return Ok(comment);
        }
        self.comments.soft_deactivate(id).await?;

        info!(comment_id = %id, deactivated_by = %acting_user, "Comment deactivated");
        self.audit.record(AuditEvent::CommentDeactivated {
            comment_id: id,
            deactivated_by: acting_user,
            deactivated_at: chrono::Utc::now(),
        });

        Ok(comment)
    }

    /// The root's active comments as a forest, roots in posting order
    pub async fn thread(&self, root: CommentRoot) -> Result<Vec<CommentTree>, ModerationError> {
        self.ensure_root(root).await?;
        let comments = self.comments.list_by_root(root).await?;
        debug!(root = %root, comments = comments.len(), "Building comment thread");
        Ok(build_thread(&comments, self.orphan_policy, self.max_depth))
    }
}
