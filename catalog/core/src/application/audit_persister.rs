// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Audit Persister Application Service
//!
//! Subscribes to the event bus and writes every audit event to the
//! `AuditLogRepository`. Runs as the only background task of the service.
//!
//! Failures are logged and skipped; nothing here can fail or slow down the
//! operation that emitted the event.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::events::AuditRecord;
use crate::domain::repository::AuditLogRepository;
use crate::infrastructure::event_bus::{EventBus, EventBusError};

pub struct AuditPersister {
    repository: Arc<dyn AuditLogRepository>,
    event_bus: Arc<EventBus>,
}

impl AuditPersister {
    pub fn new(repository: Arc<dyn AuditLogRepository>, event_bus: Arc<EventBus>) -> Self {
        Self {
            repository,
            event_bus,
        }
    }

    /// Spawn the persistence task.
    ///
    /// The subscription is taken before spawning, so every event published
    /// after `start` returns is seen. The task keeps only the receiver and
    /// ends once every `EventBus` handle is dropped.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!("Starting audit persister background task");
        let mut receiver = self.event_bus.subscribe();
        let repository = self.repository.clone();

        tokio::spawn(async move {
            let mut events_processed = 0u64;
            let mut errors_encountered = 0u64;

            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        events_processed += 1;
                        if events_processed % 100 == 0 {
                            debug!(
                                "Audit persister processed {} events ({} errors)",
                                events_processed, errors_encountered
                            );
                        }

                        let saved = match AuditRecord::from_event(&event) {
                            Ok(record) => repository.save(&record).await.map_err(|e| e.to_string()),
                            Err(e) => Err(e.to_string()),
                        };

                        if let Err(e) = saved {
                            errors_encountered += 1;
                            error!(
                                event_type = event.event_type(),
                                error = %e,
                                "Failed to persist audit event"
                            );
                            if errors_encountered % 10 == 0 {
                                warn!("Audit persistence has failed {} times", errors_encountered);
                            }
                        }
                    }
                    Err(EventBusError::Closed) => {
                        info!(
                            "Event bus closed, shutting down audit persister \
                             (processed {} events, {} errors)",
                            events_processed, errors_encountered
                        );
                        break;
                    }
                    Err(EventBusError::Lagged(n)) => {
                        warn!("Audit persister lagged by {} events, audit trail has gaps", n);
                    }
                    Err(e) => {
                        error!(error = ?e, "Unexpected error receiving audit event");
                    }
                }
            }
        })
    }
}
