// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Comment Thread Reconstruction
//!
//! Rebuilds the reply forest of one discussion (a discovery or an article)
//! from the flat comment list the repository returns.
//!
//! Nodes live in a flat arena; children are arena indices. Two passes:
//!
//! 1. keep active comments, index them by id, record parentless ones as roots
//! 2. attach every comment with a parent to that parent's child list
//!
//! Both passes preserve input order, so callers that want chronological
//! display pass the list sorted by `created_at` ascending. Comments on a
//! parent cycle are never reachable from a root and never appear.
//!
//! Root comments sit at depth 0. Replies nested deeper than the forest's
//! `max_depth` are cut off together with everything below them, which keeps
//! the nested [`CommentTree`] output bounded no matter what is stored.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::comment::{Comment, CommentId};

/// Reply nesting allowed when none is configured
pub const DEFAULT_MAX_THREAD_DEPTH: usize = 32;

/// What happens to an active comment whose parent is missing or inactive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Leave the orphan (and its replies) out of the forest
    #[default]
    Drop,
    /// Promote the orphan to a root at its input position
    Reroot,
}

#[derive(Debug, Clone, PartialEq)]
struct ThreadNode {
    comment: Comment,
    children: Vec<usize>,
}

/// Arena-backed comment forest
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentForest {
    nodes: Vec<ThreadNode>,
    roots: Vec<usize>,
    max_depth: usize,
}

impl CommentForest {
    pub fn build(comments: &[Comment], policy: OrphanPolicy, max_depth: usize) -> Self {
        let nodes: Vec<ThreadNode> = comments
            .iter()
            .filter(|c| c.is_active)
            .map(|c| ThreadNode {
                comment: c.clone(),
                children: Vec::new(),
            })
            .collect();

        let mut index: HashMap<CommentId, usize> = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            index.insert(node.comment.id, i);
        }

        let mut forest = Self {
            nodes,
            roots: Vec::new(),
            max_depth,
        };

        for i in 0..forest.nodes.len() {
            match forest.nodes[i].comment.parent_id {
                None => forest.roots.push(i),
                Some(parent_id) => match index.get(&parent_id) {
                    Some(&parent) => forest.nodes[parent].children.push(i),
                    None if policy == OrphanPolicy::Reroot => forest.roots.push(i),
                    None => {}
                },
            }
        }

        forest
    }

    /// Number of comments reachable from the roots within the depth cap
    #[cfg(test)]
    fn visible_len(&self) -> usize {
        self.preorder().len()
    }

    /// Convert into owned nested trees for display/serialization
    pub fn to_trees(&self) -> Vec<CommentTree> {
        let order = self.preorder();

        // children always follow their parent in preorder, so building in
        // reverse sees every subtree before the node that owns it
        let mut built: Vec<Option<CommentTree>> = vec![None; self.nodes.len()];
        for &i in order.iter().rev() {
            let node = &self.nodes[i];
            let replies = node
                .children
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[i] = Some(CommentTree {
                comment: node.comment.clone(),
                replies,
            });
        }

        self.roots.iter().filter_map(|&r| built[r].take()).collect()
    }

    fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, usize)> = self.roots.iter().rev().map(|&r| (r, 0)).collect();
        while let Some((i, depth)) = stack.pop() {
            order.push(i);
            if depth < self.max_depth {
                stack.extend(self.nodes[i].children.iter().rev().map(|&c| (c, depth + 1)));
            }
        }
        order
    }
}

/// A comment with its nested replies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentTree {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentTree>,
}

/// Build the nested reply forest for one discussion, at most `max_depth`
/// replies deep
pub fn build_thread(comments: &[Comment], policy: OrphanPolicy, max_depth: usize) -> Vec<CommentTree> {
    CommentForest::build(comments, policy, max_depth).to_trees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comment::CommentRoot;
    use crate::domain::discovery::DiscoveryId;
    use crate::domain::user::UserId;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn id(n: u128) -> CommentId {
        CommentId(Uuid::from_u128(n))
    }

    fn comment(n: u128, parent: Option<u128>) -> Comment {
        Comment {
            id: id(n),
            root: CommentRoot::Discovery(DiscoveryId(Uuid::from_u128(1000))),
            author_id: UserId(Uuid::from_u128(500)),
            content: format!("comment {}", n),
            parent_id: parent.map(id),
            is_active: true,
            created_at: Utc::now() + Duration::seconds(n as i64),
        }
    }

    fn shape(trees: &[CommentTree]) -> Vec<(u128, Vec<u128>)> {
        trees
            .iter()
            .map(|t| (t.comment.id.0.as_u128(), t.replies.iter().map(|r| r.comment.id.0.as_u128()).collect()))
            .collect()
    }

    #[test]
    fn test_missing_parent_is_dropped() {
        let comments = vec![comment(1, None), comment(2, Some(1)), comment(3, Some(99))];
        let trees = build_thread(&comments, OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);

        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].comment.id, id(1));
        assert_eq!(trees[0].replies.len(), 1);
        assert_eq!(trees[0].replies[0].comment.id, id(2));
        assert!(trees[0].replies[0].replies.is_empty());
    }

    #[test]
    fn test_inactive_parent_drops_whole_subtree() {
        let mut parent = comment(2, Some(1));
        parent.is_active = false;
        let comments = vec![comment(1, None), parent, comment(3, Some(2)), comment(4, Some(3))];

        let forest = CommentForest::build(&comments, OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);
        assert_eq!(shape(&forest.to_trees()), vec![(1, vec![])]);
        assert_eq!(forest.visible_len(), 1);
    }

    #[test]
    fn test_reroot_promotes_orphan_in_input_order() {
        let comments = vec![comment(1, None), comment(3, Some(99)), comment(4, Some(3)), comment(2, None)];
        let trees = build_thread(&comments, OrphanPolicy::Reroot, DEFAULT_MAX_THREAD_DEPTH);

        assert_eq!(shape(&trees), vec![(1, vec![]), (3, vec![4]), (2, vec![])]);
    }

    #[test]
    fn test_roots_and_children_keep_input_order() {
        let comments = vec![
            comment(5, None),
            comment(1, None),
            comment(7, Some(1)),
            comment(6, Some(1)),
            comment(8, Some(5)),
        ];
        let trees = build_thread(&comments, OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);
        assert_eq!(shape(&trees), vec![(5, vec![8]), (1, vec![7, 6])]);
    }

    #[test]
    fn test_child_listed_before_parent_still_attaches() {
        let comments = vec![comment(2, Some(1)), comment(1, None)];
        let trees = build_thread(&comments, OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);
        assert_eq!(shape(&trees), vec![(1, vec![2])]);
    }

    #[test]
    fn test_cycles_never_surface() {
        let comments = vec![
            comment(1, None),
            comment(2, Some(3)),
            comment(3, Some(2)),
            comment(4, Some(4)),
        ];
        for policy in [OrphanPolicy::Drop, OrphanPolicy::Reroot] {
            let forest = CommentForest::build(&comments, policy, DEFAULT_MAX_THREAD_DEPTH);
            assert_eq!(shape(&forest.to_trees()), vec![(1, vec![])]);
            assert_eq!(forest.visible_len(), 1);
        }
    }

    #[test]
    fn test_build_is_idempotent_and_does_not_mutate_input() {
        let comments = vec![comment(1, None), comment(2, Some(1)), comment(3, Some(2)), comment(4, Some(99))];
        let snapshot = comments.clone();

        let first = build_thread(&comments, OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);
        let second = build_thread(&comments, OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);

        assert_eq!(first, second);
        assert_eq!(comments, snapshot);
    }

    fn chain(len: u128) -> Vec<Comment> {
        let mut comments = vec![comment(0, None)];
        for n in 1..len {
            comments.push(comment(n, Some(n - 1)));
        }
        comments
    }

    fn depth(trees: &[CommentTree]) -> usize {
        let mut deepest = 0;
        let mut level: Vec<&CommentTree> = trees.iter().collect();
        while !level.is_empty() {
            deepest += 1;
            level = level.into_iter().flat_map(|t| t.replies.iter()).collect();
        }
        deepest
    }

    #[test]
    fn test_deep_chain_is_cut_at_max_depth() {
        let comments = chain(20_000);
        let trees = build_thread(&comments, OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);

        // the root plus DEFAULT_MAX_THREAD_DEPTH levels of replies
        assert_eq!(depth(&trees), DEFAULT_MAX_THREAD_DEPTH + 1);
        let json = serde_json::to_string(&trees).unwrap();
        assert!(json.contains(&id(DEFAULT_MAX_THREAD_DEPTH as u128).to_string()));
        assert!(!json.contains(&id(DEFAULT_MAX_THREAD_DEPTH as u128 + 1).to_string()));

        let forest = CommentForest::build(&comments, OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);
        assert_eq!(forest.visible_len(), DEFAULT_MAX_THREAD_DEPTH + 1);
    }

    #[test]
    fn test_chain_at_max_depth_is_kept_whole() {
        let comments = chain(4);
        let trees = build_thread(&comments, OrphanPolicy::Drop, 3);
        assert_eq!(depth(&trees), 4);

        let trees = build_thread(&comments, OrphanPolicy::Drop, 0);
        assert_eq!(shape(&trees), vec![(0, vec![])]);
    }

    #[test]
    fn test_empty_input() {
        let forest = CommentForest::build(&[], OrphanPolicy::Drop, DEFAULT_MAX_THREAD_DEPTH);
        assert!(forest.to_trees().is_empty());
        assert_eq!(forest.visible_len(), 0);
    }
}
