// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory outbox store for deterministic dispatcher tests.
//!
//! `MockOutboxStore` hands out pre-scripted claim batches and records every
//! call so tests can assert on exactly what the dispatcher did.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use folio_core::{FolioError, OutboxKind, OutboxMessage, OutboxStore};

/// One scripted response to `claim_batch`.
enum Claim {
    Batch(Vec<OutboxMessage>),
    Fail(String),
}

/// A mock [`OutboxStore`].
///
/// Scripted claims are popped in order; once the script runs out every claim
/// returns an empty batch.
#[derive(Clone, Default)]
pub struct MockOutboxStore {
    claims: Arc<Mutex<VecDeque<Claim>>>,
    enqueued: Arc<Mutex<Vec<(String, OutboxKind, Vec<u8>)>>>,
    marked: Arc<Mutex<Vec<Vec<String>>>>,
    claim_calls: Arc<AtomicUsize>,
    fail_marks: Arc<Mutex<Option<String>>>,
}

impl MockOutboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose first claim returns `batch`.
    pub fn with_batch(batch: Vec<OutboxMessage>) -> Self {
        Self {
            claims: Arc::new(Mutex::new(VecDeque::from([Claim::Batch(batch)]))),
            ..Self::default()
        }
    }

    /// Queue a batch for a later claim.
    pub async fn push_batch(&self, batch: Vec<OutboxMessage>) {
        self.claims.lock().await.push_back(Claim::Batch(batch));
    }

    /// Queue a claim that fails with a storage error.
    pub async fn push_claim_error(&self, message: &str) {
        self.claims
            .lock()
            .await
            .push_back(Claim::Fail(message.to_string()));
    }

    /// Make every later `mark_processed` call fail.
    pub async fn fail_mark_processed(&self, message: &str) {
        *self.fail_marks.lock().await = Some(message.to_string());
    }

    /// Number of `claim_batch` calls so far.
    pub fn claim_calls(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }

    /// Key sets passed to `mark_processed`, in call order.
    pub async fn marked(&self) -> Vec<Vec<String>> {
        self.marked.lock().await.clone()
    }

    pub async fn enqueued(&self) -> Vec<(String, OutboxKind, Vec<u8>)> {
        self.enqueued.lock().await.clone()
    }

    /// True when the store saw no call of any kind.
    pub async fn untouched(&self) -> bool {
        self.claim_calls() == 0
            && self.marked.lock().await.is_empty()
            && self.enqueued.lock().await.is_empty()
    }

    /// Poll until `mark_processed` has been called `calls` times.
    pub async fn wait_for_marks(&self, calls: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.marked.lock().await.len() >= calls {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }
}

#[async_trait]
impl OutboxStore for MockOutboxStore {
    async fn enqueue(
        &self,
        idempotency_key: &str,
        kind: OutboxKind,
        payload: &[u8],
    ) -> Result<(), FolioError> {
        let mut enqueued = self.enqueued.lock().await;
        if !enqueued.iter().any(|(key, _, _)| key == idempotency_key) {
            enqueued.push((idempotency_key.to_string(), kind, payload.to_vec()));
        }
        Ok(())
    }

    async fn claim_batch(
        &self,
        batch_size: usize,
        _lease_ttl: Duration,
    ) -> Result<Vec<OutboxMessage>, FolioError> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        match self.claims.lock().await.pop_front() {
            Some(Claim::Batch(mut batch)) => {
                batch.truncate(batch_size);
                Ok(batch)
            }
            Some(Claim::Fail(message)) => Err(FolioError::Storage {
                source: message.into(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn mark_processed(&self, idempotency_keys: &[String]) -> Result<(), FolioError> {
        self.marked.lock().await.push(idempotency_keys.to_vec());
        match self.fail_marks.lock().await.as_ref() {
            Some(message) => Err(FolioError::Storage {
                source: message.clone().into(),
            }),
            None => Ok(()),
        }
    }
}
