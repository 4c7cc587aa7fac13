// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Moderation Gate
//!
//! One permission predicate for every owner-or-privileged mutation. Each
//! [`Operation`] maps to an [`OperationPolicy`] in a static table: whether
//! the resource owner may perform it, and which roles may perform it on
//! anyone's resource.
//!
//! | Operation | Owner | Roles |
//! |-----------|-------|-------|
//! | `UpdateDiscovery` | yes | Astronomer, Admin |
//! | `DeleteDiscovery` | yes | Admin |
//! | `ReviewDiscovery` | no | Astronomer, Admin |
//! | `EditComment` | yes | (none) |
//! | `DeactivateComment` | yes | Astronomer, Admin |

use serde::{Deserialize, Serialize};

use crate::domain::user::{Role, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    UpdateDiscovery,
    DeleteDiscovery,
    /// approve or reject
    ReviewDiscovery,
    EditComment,
    DeactivateComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationPolicy {
    pub owner_allowed: bool,
    pub roles: &'static [Role],
}

const MODERATORS: &[Role] = &[Role::Astronomer, Role::Admin];

static POLICY_TABLE: &[(Operation, OperationPolicy)] = &[
    (
        Operation::UpdateDiscovery,
        OperationPolicy { owner_allowed: true, roles: MODERATORS },
    ),
    (
        Operation::DeleteDiscovery,
        OperationPolicy { owner_allowed: true, roles: &[Role::Admin] },
    ),
    (
        Operation::ReviewDiscovery,
        OperationPolicy { owner_allowed: false, roles: MODERATORS },
    ),
    (
        Operation::EditComment,
        OperationPolicy { owner_allowed: true, roles: &[] },
    ),
    (
        Operation::DeactivateComment,
        OperationPolicy { owner_allowed: true, roles: MODERATORS },
    ),
];

impl Operation {
    pub fn policy(&self) -> OperationPolicy {
        POLICY_TABLE
            .iter()
            .find(|(op, _)| op == self)
            .map(|(_, policy)| *policy)
            // every variant has a row; an unlisted one grants nothing
            .unwrap_or(OperationPolicy { owner_allowed: false, roles: &[] })
    }
}

/// The acting side of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

pub struct ModerationGate;

impl ModerationGate {
    pub fn can_mutate(actor: &Actor, owner: UserId, operation: Operation) -> bool {
        let policy = operation.policy();
        (policy.owner_allowed && actor.user_id == owner) || policy.roles.contains(&actor.role)
    }

    pub fn authorize(actor: &Actor, owner: UserId, operation: Operation) -> Result<(), Forbidden> {
        if Self::can_mutate(actor, owner, operation) {
            Ok(())
        } else {
            Err(Forbidden {
                operation,
                role: actor.role,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Role {role} may not perform {operation:?} on this resource")]
pub struct Forbidden {
    pub operation: Operation,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 4] = [Role::Visitor, Role::Researcher, Role::Astronomer, Role::Admin];

    #[test]
    fn test_every_operation_has_a_row() {
        for op in [
            Operation::UpdateDiscovery,
            Operation::DeleteDiscovery,
            Operation::ReviewDiscovery,
            Operation::EditComment,
            Operation::DeactivateComment,
        ] {
            assert!(POLICY_TABLE.iter().any(|(o, _)| *o == op), "{:?} missing", op);
        }
    }

    #[test]
    fn test_review_ignores_ownership() {
        let owner = UserId::new();
        for role in ALL_ROLES {
            let actor = Actor::new(owner, role);
            assert_eq!(
                ModerationGate::can_mutate(&actor, owner, Operation::ReviewDiscovery),
                role.is_moderator()
            );
        }
    }

    #[test]
    fn test_delete_is_owner_or_admin_only() {
        let owner = UserId::new();
        let other = UserId::new();

        assert!(ModerationGate::can_mutate(&Actor::new(owner, Role::Visitor), owner, Operation::DeleteDiscovery));
        assert!(ModerationGate::can_mutate(&Actor::new(other, Role::Admin), owner, Operation::DeleteDiscovery));
        assert!(!ModerationGate::can_mutate(&Actor::new(other, Role::Astronomer), owner, Operation::DeleteDiscovery));
        assert!(!ModerationGate::can_mutate(&Actor::new(other, Role::Researcher), owner, Operation::DeleteDiscovery));
    }

    #[test]
    fn test_update_and_deactivate_allow_owner_or_moderator() {
        let owner = UserId::new();
        let other = UserId::new();
        for op in [Operation::UpdateDiscovery, Operation::DeactivateComment] {
            assert!(ModerationGate::can_mutate(&Actor::new(owner, Role::Visitor), owner, op));
            assert!(ModerationGate::can_mutate(&Actor::new(other, Role::Astronomer), owner, op));
            assert!(ModerationGate::can_mutate(&Actor::new(other, Role::Admin), owner, op));
            assert!(!ModerationGate::can_mutate(&Actor::new(other, Role::Researcher), owner, op));
        }
    }

    #[test]
    fn test_only_author_edits_comment() {
        let owner = UserId::new();
        let other = UserId::new();
        assert!(ModerationGate::authorize(&Actor::new(owner, Role::Visitor), owner, Operation::EditComment).is_ok());
        for role in ALL_ROLES {
            let err = ModerationGate::authorize(&Actor::new(other, role), owner, Operation::EditComment).unwrap_err();
            assert_eq!(err.operation, Operation::EditComment);
        }
    }
}
