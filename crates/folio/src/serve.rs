// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `folio serve` command implementation.
//!
//! Opens the catalog database, starts the outbox dispatcher with an HTTP
//! notifier per configured kind, and runs until SIGINT or SIGTERM.

use std::sync::Arc;

use folio_config::model::FolioConfig;
use folio_core::FolioError;
use folio_outbox::{http_registry, DispatchSettings, KindRegistry, OutboxDispatcher};
use folio_storage::{Database, OutboxRepository};
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `folio serve` command.
pub async fn run_serve(config: FolioConfig) -> Result<(), FolioError> {
    let db = Database::from_config(&config.storage).await?;

    let registry = if config.outbox.enabled {
        http_registry(&config.outbox)?
    } else {
        warn!("outbox dispatcher disabled, messages will accumulate until enabled");
        KindRegistry::new()
    };

    let dispatcher = OutboxDispatcher::new(
        config.outbox.enabled,
        Arc::new(OutboxRepository::new(db.clone())),
        Arc::new(registry),
    );

    let cancel = shutdown::install_signal_handler();
    let handle = dispatcher.start(cancel.clone(), DispatchSettings::from(&config.outbox));
    info!(workers = handle.worker_count(), "folio serve running");

    cancel.cancelled().await;
    handle.join().await;
    info!("dispatcher stopped");

    db.close().await?;
    info!("folio serve shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Output goes to
/// stderr so catalog commands keep stdout for their JSON.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("folio={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
