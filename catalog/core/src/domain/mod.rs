// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`user`] | `UserId`, `Role`, `IdentityProvider` |
//! | [`discovery`] | `Discovery` aggregate root and its lifecycle |
//! | [`vote`] | `Vote` entity, `VoteTally` |
//! | [`comment`] | `Comment` entity, `CommentRoot` |
//! | [`thread`] | comment forest reconstruction |
//! | [`moderation`] | operation → allowed-role table |
//! | [`events`] | audit events and the `AuditSink` contract |
//! | [`repository`] | persistence contracts |
//! | [`error`] | `ModerationError` taxonomy |

pub mod user;
pub mod discovery;
pub mod vote;
pub mod comment;
pub mod thread;
pub mod moderation;
pub mod events;
pub mod repository;
pub mod error;
