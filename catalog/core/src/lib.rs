// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # astrodex-core
//!
//! Discovery moderation workflow, vote ledger and comment threads for the
//! astrodex catalogue.
//!
//! # Architecture
//!
//! - **Domain:** aggregates, value objects, repository contracts, moderation gate
//! - **Application:** use-case services (workflow, ledger, comments), configuration
//! - **Infrastructure:** in-memory and PostgreSQL repositories, event bus, identity
//! - **Presentation:** axum HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
