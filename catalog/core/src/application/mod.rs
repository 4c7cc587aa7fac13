// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod config;
pub mod discovery_workflow;
pub mod vote_ledger;
pub mod comment_service;
pub mod audit_persister;
pub mod repository_factory;

// Re-export services for convenience
pub use audit_persister::AuditPersister;
pub use comment_service::CommentService;
pub use config::CatalogConfig;
pub use discovery_workflow::DiscoveryWorkflow;
pub use repository_factory::Repositories;
pub use vote_ledger::VoteLedger;
