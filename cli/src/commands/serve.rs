// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `astrodex serve`: run the moderation HTTP service
//!
//! Wires repositories, the audit event bus and persister, the identity
//! directory and the three application services behind the axum router,
//! then serves until Ctrl+C / SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use astrodex_core::{
    application::{AuditPersister, CatalogConfig, CommentService, DiscoveryWorkflow, Repositories, VoteLedger},
    domain::events::AuditSink,
    infrastructure::{EventBus, InMemoryIdentityProvider},
    presentation::api::{self, AppState},
};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// HTTP bind host (overrides server.host)
    #[arg(long, env = "ASTRODEX_HOST")]
    pub host: Option<String>,

    /// HTTP bind port (overrides server.port)
    #[arg(long, env = "ASTRODEX_PORT")]
    pub port: Option<u16>,
}

impl ServeArgs {
    pub fn apply(&self, config: &mut CatalogConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub async fn run(config: CatalogConfig) -> Result<()> {
    config
        .validate()
        .context("Configuration validation failed")?;

    if let Some(port) = config.observability.metrics_port {
        PrometheusBuilder::new()
            .with_http_listener(([0, 0, 0, 0], port))
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Prometheus metrics exposed on port {}", port);
    }

    let backend = config.storage.backend()?;
    let repos = Repositories::from_backend(&backend, config.storage.max_connections)
        .await
        .context("Failed to initialize repositories")?;

    let event_bus = Arc::new(EventBus::new(config.audit.channel_capacity));
    let persister = Arc::new(AuditPersister::new(repos.audit_log.clone(), event_bus.clone()));
    let persister_handle = persister.start();
    let audit: Arc<dyn AuditSink> = event_bus.clone();

    let identity = Arc::new(InMemoryIdentityProvider::with_roles(
        config.identity.roles.iter().map(|(user, role)| (*user, *role)),
    ));
    info!("Identity directory seeded with {} role assignments", config.identity.roles.len());

    let ledger = Arc::new(VoteLedger::new(
        repos.discoveries.clone(),
        repos.votes.clone(),
        audit.clone(),
    ));
    let workflow = Arc::new(DiscoveryWorkflow::new(
        repos.discoveries.clone(),
        repos.votes.clone(),
        ledger.clone(),
        identity.clone(),
        audit.clone(),
        config.review,
    ));
    let comments = Arc::new(CommentService::new(
        repos.comments.clone(),
        repos.discoveries.clone(),
        identity,
        audit.clone(),
        config.comments.orphan_policy,
        config.comments.max_length,
        config.comments.max_depth,
    ));

    let app = api::app(AppState {
        workflow,
        ledger,
        comments,
    });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("astrodex listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server stopped, draining audit events");

    // the router (and every service holding the sink) is gone; closing the
    // last handles lets the persister finish
    drop(audit);
    drop(event_bus);
    if tokio::time::timeout(Duration::from_secs(5), persister_handle)
        .await
        .is_err()
    {
        warn!("Audit persister did not finish within 5s");
    }

    info!("astrodex shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = CatalogConfig::default();
        let args = ServeArgs {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
        };
        args.apply(&mut config);

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let mut config = CatalogConfig::default();
        ServeArgs { host: None, port: None }.apply(&mut config);
        assert_eq!(config, CatalogConfig::default());
    }
}
