// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for comment posting, editing, soft deletion and thread
//! assembly.

mod common;

use astrodex_core::domain::comment::{ArticleId, Comment, CommentId, CommentRoot};
use astrodex_core::domain::discovery::DiscoveryId;
use astrodex_core::domain::error::ModerationError;
use astrodex_core::domain::repository::CommentRepository;
use uuid::Uuid;

use common::{Harness, MAX_DEPTH};

async fn discovery_root(h: &Harness) -> CommentRoot {
    CommentRoot::Discovery(h.submit().await.id)
}

#[tokio::test]
async fn test_thread_drops_orphans() {
    let h = Harness::new();
    let root = discovery_root(&h).await;

    let first = h.comments.post(root, h.researcher, "Confirmed in my data", None).await.unwrap();
    let reply = h
        .comments
        .post(root, h.astronomer, "Which telescope?", Some(first.id))
        .await
        .unwrap();

    // posting validates parents, so plant the orphan directly
    let orphan = Comment::new(root, h.admin, "lost reply", Some(CommentId::new()), 2000).unwrap();
    h.repos.comments.insert(&orphan).await.unwrap();

    let thread = h.comments.thread(root).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].comment.id, first.id);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].comment.id, reply.id);
    assert!(thread[0].replies[0].replies.is_empty());
}

#[tokio::test]
async fn test_thread_hides_deactivated_subtrees() {
    let h = Harness::new();
    let root = discovery_root(&h).await;

    let first = h.comments.post(root, h.researcher, "first", None).await.unwrap();
    h.comments.post(root, h.admin, "reply", Some(first.id)).await.unwrap();
    let second = h.comments.post(root, h.researcher, "second", None).await.unwrap();

    h.comments.deactivate(first.id, h.researcher).await.unwrap();

    let thread = h.comments.thread(root).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].comment.id, second.id);
}

#[tokio::test]
async fn test_thread_of_unknown_discovery_is_not_found() {
    let h = Harness::new();
    let err = h
        .comments
        .thread(CommentRoot::Discovery(DiscoveryId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotFound(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_article_comments() {
    let h = Harness::new();
    let root = CommentRoot::Article(ArticleId(Uuid::new_v4()));

    assert!(h.comments.thread(root).await.unwrap().is_empty());
    let comment = h.comments.post(root, h.researcher, "Great write-up", None).await.unwrap();
    assert_eq!(comment.root, root);
    assert_eq!(h.comments.thread(root).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_post_rejects_blank_content() {
    let h = Harness::new();
    let root = discovery_root(&h).await;

    let err = h.comments.post(root, h.researcher, "   ", None).await.unwrap_err();
    assert!(matches!(err, ModerationError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_post_validates_parent() {
    let h = Harness::new();
    let root = discovery_root(&h).await;
    let other_root = discovery_root(&h).await;

    let err = h
        .comments
        .post(root, h.researcher, "reply", Some(CommentId::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::Validation(_)), "got {:?}", err);

    let elsewhere = h.comments.post(other_root, h.researcher, "elsewhere", None).await.unwrap();
    let err = h
        .comments
        .post(root, h.researcher, "cross-thread reply", Some(elsewhere.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::Validation(_)), "got {:?}", err);

    let parent = h.comments.post(root, h.researcher, "parent", None).await.unwrap();
    h.comments.deactivate(parent.id, h.researcher).await.unwrap();
    let err = h
        .comments
        .post(root, h.astronomer, "reply to removed", Some(parent.id))
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_post_on_unknown_discovery_is_not_found() {
    let h = Harness::new();
    let err = h
        .comments
        .post(CommentRoot::Discovery(DiscoveryId::new()), h.researcher, "hello", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotFound(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_only_author_edits() {
    let h = Harness::new();
    let root = discovery_root(&h).await;
    let comment = h.comments.post(root, h.researcher, "tpyo", None).await.unwrap();

    let edited = h.comments.edit(comment.id, h.researcher, "typo").await.unwrap();
    assert_eq!(edited.content, "typo");

    // moderators deactivate, they do not rewrite
    for user in [h.admin, h.astronomer, h.reporter] {
        let err = h.comments.edit(comment.id, user, "rewritten").await.unwrap_err();
        assert!(matches!(err, ModerationError::Forbidden(_)), "got {:?}", err);
    }

    let stored = h.repos.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.content, "typo");
}

#[tokio::test]
async fn test_edit_inactive_comment_is_validation_error() {
    let h = Harness::new();
    let root = discovery_root(&h).await;
    let comment = h.comments.post(root, h.researcher, "soon gone", None).await.unwrap();
    h.comments.deactivate(comment.id, h.researcher).await.unwrap();

    let err = h.comments.edit(comment.id, h.researcher, "back").await.unwrap_err();
    assert!(matches!(err, ModerationError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_moderator_deactivates_and_repeat_is_noop() {
    let h = Harness::new();
    let root = discovery_root(&h).await;
    let comment = h.comments.post(root, h.researcher, "spam", None).await.unwrap();

    let err = h.comments.deactivate(comment.id, h.reporter).await.unwrap_err();
    assert!(matches!(err, ModerationError::Forbidden(_)), "got {:?}", err);

    let mut events = h.bus.subscribe();
    let removed = h.comments.deactivate(comment.id, h.astronomer).await.unwrap();
    assert!(!removed.is_active);
    assert!(events.try_recv().is_ok());

    let again = h.comments.deactivate(comment.id, h.astronomer).await.unwrap();
    assert!(!again.is_active);
    assert!(events.try_recv().is_err(), "repeat deactivation must not emit");

    let stored = h.repos.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
}

#[tokio::test]
async fn test_deactivate_unknown_comment_is_not_found() {
    let h = Harness::new();
    let err = h
        .comments
        .deactivate(CommentId::new(), h.admin)
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::NotFound(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_reply_depth_is_capped() {
    let h = Harness::new();
    let root = discovery_root(&h).await;

    let top = h.comments.post(root, h.researcher, "depth 0", None).await.unwrap();
    let mut parent = top.id;
    for depth in 1..=MAX_DEPTH {
        let reply = h
            .comments
            .post(root, h.astronomer, &format!("depth {}", depth), Some(parent))
            .await
            .unwrap();
        parent = reply.id;
    }

    let err = h
        .comments
        .post(root, h.researcher, "one too deep", Some(parent))
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::Validation(_)), "got {:?}", err);

    // the full chain still renders
    let thread = h.comments.thread(root).await.unwrap();
    let mut node = &thread[0];
    for _ in 0..MAX_DEPTH {
        assert_eq!(node.replies.len(), 1);
        node = &node.replies[0];
    }
    assert!(node.replies.is_empty());
    assert_eq!(node.comment.id, parent);
}

#[tokio::test]
async fn test_thread_cuts_chains_planted_past_the_cap() {
    let h = Harness::new();
    let root = discovery_root(&h).await;

    let mut parent = None;
    let mut chain = Vec::new();
    for n in 0..5_000 {
        let comment = Comment::new(root, h.researcher, &format!("link {}", n), parent, 2000).unwrap();
        h.repos.comments.insert(&comment).await.unwrap();
        parent = Some(comment.id);
        chain.push(comment.id);
    }

    let thread = h.comments.thread(root).await.unwrap();
    let mut node = &thread[0];
    let mut depth = 0;
    while let Some(reply) = node.replies.first() {
        node = reply;
        depth += 1;
    }
    assert_eq!(depth, MAX_DEPTH);
    assert_eq!(node.comment.id, chain[MAX_DEPTH]);
    assert!(serde_json::to_string(&thread).is_ok());
}
