// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Shared wiring for the integration tests: in-memory repositories, a seeded
//! identity directory and the event bus as audit sink.

#![allow(dead_code)]

use std::sync::Arc;

use astrodex_core::application::{CommentService, DiscoveryWorkflow, Repositories, VoteLedger};
use astrodex_core::domain::discovery::{Discovery, DiscoveryId, NewDiscovery, ObjectType};
use astrodex_core::domain::repository::DiscoveryRepository;
use astrodex_core::domain::thread::OrphanPolicy;
use astrodex_core::domain::user::{Role, UserId};
use astrodex_core::domain::vote::ReviewPolicy;
use astrodex_core::infrastructure::{EventBus, InMemoryIdentityProvider};

/// Reply depth used by the harness comment service
pub const MAX_DEPTH: usize = 8;

pub struct Harness {
    pub repos: Repositories,
    pub bus: Arc<EventBus>,
    pub workflow: Arc<DiscoveryWorkflow>,
    pub ledger: Arc<VoteLedger>,
    pub comments: Arc<CommentService>,
    pub reporter: UserId,
    pub researcher: UserId,
    pub astronomer: UserId,
    pub admin: UserId,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_policy(ReviewPolicy::default())
    }

    pub fn with_policy(policy: ReviewPolicy) -> Self {
        Self::build(policy, Repositories::in_memory())
    }

    /// Same wiring, with the discovery store swapped for `discoveries`
    pub fn with_discoveries(discoveries: Arc<dyn DiscoveryRepository>) -> Self {
        let mut repos = Repositories::in_memory();
        repos.discoveries = discoveries;
        Self::build(ReviewPolicy::default(), repos)
    }

    fn build(policy: ReviewPolicy, repos: Repositories) -> Self {
        let reporter = UserId::new();
        let researcher = UserId::new();
        let astronomer = UserId::new();
        let admin = UserId::new();

        let bus = Arc::new(EventBus::with_default_capacity());
        let identity = Arc::new(InMemoryIdentityProvider::with_roles([
            (reporter, Role::Researcher),
            (researcher, Role::Researcher),
            (astronomer, Role::Astronomer),
            (admin, Role::Admin),
        ]));

        let ledger = Arc::new(VoteLedger::new(
            repos.discoveries.clone(),
            repos.votes.clone(),
            bus.clone(),
        ));
        let workflow = Arc::new(DiscoveryWorkflow::new(
            repos.discoveries.clone(),
            repos.votes.clone(),
            ledger.clone(),
            identity.clone(),
            bus.clone(),
            policy,
        ));
        let comments = Arc::new(CommentService::new(
            repos.comments.clone(),
            repos.discoveries.clone(),
            identity,
            bus.clone(),
            OrphanPolicy::Drop,
            2000,
            MAX_DEPTH,
        ));

        Self {
            repos,
            bus,
            workflow,
            ledger,
            comments,
            reporter,
            researcher,
            astronomer,
            admin,
        }
    }

    pub async fn submit(&self) -> Discovery {
        self.workflow
            .submit(new_discovery(self.reporter))
            .await
            .expect("valid discovery should be accepted")
    }

    /// Submitted and moved through community review by another researcher
    pub async fn submit_for_astronomers(&self) -> DiscoveryId {
        let discovery = self.submit().await;
        self.workflow
            .open_community_review(discovery.id, self.researcher)
            .await
            .unwrap();
        self.workflow
            .advance_to_astronomer_review(discovery.id, self.researcher)
            .await
            .unwrap();
        discovery.id
    }
}

pub fn new_discovery(reporter: UserId) -> NewDiscovery {
    NewDiscovery {
        reporter_id: reporter,
        object_type: ObjectType::Comet,
        suggested_name: "C/2026 Q1".to_string(),
        right_ascension: 187.25,
        declination: -12.5,
        description: "Faint fuzzy object moving against the background".to_string(),
        attachments: None,
    }
}
