// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background workers that drain the outbox.
//!
//! Each worker sleeps for the poll interval, claims a batch, delivers every
//! message through the handler resolved for its kind, then marks the
//! delivered keys processed in one call. Messages that fail resolution or
//! delivery stay `IN_PROGRESS` and are claimed again once their lease expires.

use std::sync::Arc;
use std::time::Duration;

use folio_config::model::OutboxConfig;
use folio_core::{KindResolver, OutboxMessage, OutboxStore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Polling parameters shared by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub worker_count: usize,
    pub batch_size: usize,
    pub poll_interval: Duration,
    pub lease_ttl: Duration,
}

impl From<&OutboxConfig> for DispatchSettings {
    fn from(config: &OutboxConfig) -> Self {
        Self {
            worker_count: config.workers,
            batch_size: config.batch_size,
            poll_interval: config.poll_interval(),
            lease_ttl: config.lease_ttl(),
        }
    }
}

/// Owns the store and resolver the workers share.
pub struct OutboxDispatcher {
    enabled: bool,
    store: Arc<dyn OutboxStore>,
    resolver: Arc<dyn KindResolver>,
}

impl OutboxDispatcher {
    pub fn new(enabled: bool, store: Arc<dyn OutboxStore>, resolver: Arc<dyn KindResolver>) -> Self {
        Self {
            enabled,
            store,
            resolver,
        }
    }

    /// Spawn the workers and return immediately.
    ///
    /// When the dispatcher is disabled nothing is spawned and neither the
    /// store nor the resolver is touched.
    pub fn start(&self, cancel: CancellationToken, settings: DispatchSettings) -> DispatcherHandle {
        if !self.enabled {
            info!("outbox dispatcher disabled");
            return DispatcherHandle {
                workers: Vec::new(),
            };
        }

        let workers = (0..settings.worker_count)
            .map(|id| {
                let worker = Worker {
                    id,
                    store: Arc::clone(&self.store),
                    resolver: Arc::clone(&self.resolver),
                    settings: settings.clone(),
                };
                tokio::spawn(worker.run(cancel.clone()))
            })
            .collect::<Vec<_>>();

        info!(
            workers = workers.len(),
            batch_size = settings.batch_size,
            poll_interval_ms = settings.poll_interval.as_millis() as u64,
            lease_ttl_ms = settings.lease_ttl.as_millis() as u64,
            "outbox dispatcher started"
        );
        DispatcherHandle { workers }
    }
}

/// Join handle for a started dispatcher.
pub struct DispatcherHandle {
    workers: Vec<JoinHandle<()>>,
}

impl DispatcherHandle {
    /// Number of workers that were spawned.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Wait for every worker to exit. Workers exit once the cancellation
    /// token fires and their current batch is finished.
    pub async fn join(self) {
        for handle in self.workers {
            if let Err(e) = handle.await {
                error!(error = %e, "outbox worker terminated abnormally");
            }
        }
    }
}

struct Worker {
    id: usize,
    store: Arc<dyn OutboxStore>,
    resolver: Arc<dyn KindResolver>,
    settings: DispatchSettings,
}

impl Worker {
    async fn run(self, cancel: CancellationToken) {
        debug!(worker = self.id, "outbox worker running");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
            self.process_batch().await;
        }
        debug!(worker = self.id, "outbox worker stopped");
    }

    async fn process_batch(&self) {
        let batch = match self
            .store
            .claim_batch(self.settings.batch_size, self.settings.lease_ttl)
            .await
        {
            Ok(batch) => batch,
            Err(e) => {
                error!(worker = self.id, error = %e, "failed to claim outbox batch");
                return;
            }
        };
        if batch.is_empty() {
            return;
        }
        debug!(worker = self.id, claimed = batch.len(), "claimed outbox batch");

        let mut delivered = Vec::with_capacity(batch.len());
        for message in batch {
            if self.deliver(&message).await {
                delivered.push(message.idempotency_key);
            }
        }

        let count = delivered.len();
        if let Err(e) = self.store.mark_processed(&delivered).await {
            error!(
                worker = self.id,
                count,
                error = %e,
                "failed to mark outbox messages processed"
            );
            return;
        }
        debug!(worker = self.id, count, "outbox messages processed");
    }

    async fn deliver(&self, message: &OutboxMessage) -> bool {
        let handler = match self.resolver.resolve(message.kind) {
            Ok(handler) => handler,
            Err(e) => {
                warn!(
                    worker = self.id,
                    key = %message.idempotency_key,
                    kind = message.kind,
                    error = %e,
                    "no handler for outbox message"
                );
                return false;
            }
        };

        match handler.deliver(&message.raw_data).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    worker = self.id,
                    key = %message.idempotency_key,
                    kind = message.kind,
                    error = %e,
                    "outbox delivery failed"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use folio_core::{FolioError, KindHandler, OutboxKind};
    use tracing_test::traced_test;

    use super::*;

    /// Store that hands out one batch and records what gets marked.
    #[derive(Default)]
    struct OneBatch {
        batch: std::sync::Mutex<Option<Vec<OutboxMessage>>>,
        marked: std::sync::Mutex<Vec<Vec<String>>>,
        claims: AtomicUsize,
        reject_marks: bool,
    }

    #[async_trait]
    impl OutboxStore for OneBatch {
        async fn enqueue(&self, _: &str, _: OutboxKind, _: &[u8]) -> Result<(), FolioError> {
            Ok(())
        }

        async fn claim_batch(
            &self,
            _: usize,
            _: Duration,
        ) -> Result<Vec<OutboxMessage>, FolioError> {
            self.claims.fetch_add(1, Ordering::SeqCst);
            Ok(self.batch.lock().unwrap().take().unwrap_or_default())
        }

        async fn mark_processed(&self, keys: &[String]) -> Result<(), FolioError> {
            self.marked.lock().unwrap().push(keys.to_vec());
            if self.reject_marks {
                return Err(FolioError::Storage {
                    source: "database is locked".into(),
                });
            }
            Ok(())
        }
    }

    struct Accept;

    #[async_trait]
    impl KindHandler for Accept {
        async fn deliver(&self, _: &[u8]) -> Result<(), FolioError> {
            Ok(())
        }
    }

    fn settings() -> DispatchSettings {
        DispatchSettings {
            worker_count: 1,
            batch_size: 10,
            poll_interval: Duration::from_millis(1),
            lease_ttl: Duration::from_secs(1),
        }
    }

    #[test]
    fn settings_follow_outbox_config() {
        let config = OutboxConfig {
            workers: 3,
            batch_size: 7,
            wait_time_ms: 20,
            in_progress_ttl_ms: 900,
            ..OutboxConfig::default()
        };
        let settings = DispatchSettings::from(&config);
        assert_eq!(settings.worker_count, 3);
        assert_eq!(settings.batch_size, 7);
        assert_eq!(settings.poll_interval, Duration::from_millis(20));
        assert_eq!(settings.lease_ttl, Duration::from_millis(900));
    }

    #[tokio::test]
    async fn process_batch_marks_only_resolved_messages() {
        let store = Arc::new(OneBatch::default());
        *store.batch.lock().unwrap() = Some(vec![
            OutboxMessage::new("book_1", OutboxKind::Book, b"{}".to_vec()),
            OutboxMessage {
                idempotency_key: "odd_2".into(),
                kind: 5,
                raw_data: Vec::new(),
            },
        ]);
        let resolver = |kind: i64| -> Result<Arc<dyn KindHandler>, FolioError> {
            match OutboxKind::try_from(kind)? {
                OutboxKind::Book => Ok(Arc::new(Accept)),
                OutboxKind::Author => Err(FolioError::UnsupportedKind { kind }),
            }
        };
        let worker = Worker {
            id: 0,
            store: store.clone(),
            resolver: Arc::new(resolver),
            settings: settings(),
        };

        worker.process_batch().await;
        assert_eq!(*store.marked.lock().unwrap(), vec![vec!["book_1".to_string()]]);

        // An empty claim does not reach mark_processed.
        worker.process_batch().await;
        assert_eq!(store.marked.lock().unwrap().len(), 1);
        assert_eq!(store.claims.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancelled_before_first_poll_claims_nothing() {
        let store = Arc::new(OneBatch::default());
        let dispatcher = OutboxDispatcher::new(
            true,
            store.clone(),
            Arc::new(|kind: i64| -> Result<Arc<dyn KindHandler>, FolioError> {
                Err(FolioError::UnsupportedKind { kind })
            }),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let handle = dispatcher.start(
            cancel,
            DispatchSettings {
                worker_count: 3,
                poll_interval: Duration::from_secs(60),
                ..settings()
            },
        );
        assert_eq!(handle.worker_count(), 3);
        handle.join().await;
        assert_eq!(store.claims.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn failures_are_logged_not_fatal() {
        let store = Arc::new(OneBatch {
            reject_marks: true,
            ..OneBatch::default()
        });
        *store.batch.lock().unwrap() = Some(vec![
            OutboxMessage::new("author_1", OutboxKind::Author, b"{}".to_vec()),
        ]);
        let worker = Worker {
            id: 4,
            store: store.clone(),
            resolver: Arc::new(|kind: i64| -> Result<Arc<dyn KindHandler>, FolioError> {
                Err(FolioError::UnsupportedKind { kind })
            }),
            settings: settings(),
        };

        worker.process_batch().await;

        // The batch had no deliverable message, yet it is still reconciled.
        assert_eq!(*store.marked.lock().unwrap(), vec![Vec::<String>::new()]);
        assert!(logs_contain("no handler for outbox message"));
        assert!(logs_contain("failed to mark outbox messages processed"));
    }
}
