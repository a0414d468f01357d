// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable outbox queue operations.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FolioError;
use crate::types::{OutboxKind, OutboxMessage};

/// Durable queue of side-effect messages awaiting delivery.
///
/// Implementations return backend errors unchanged (wrapped in
/// [`FolioError::Storage`]) and never retry internally; retry happens by
/// re-claiming after the lease expires.
#[async_trait]
pub trait OutboxStore: Send + Sync + 'static {
    /// Insert a `CREATED` row. An existing `idempotency_key` makes this a
    /// successful no-op.
    async fn enqueue(
        &self,
        idempotency_key: &str,
        kind: OutboxKind,
        payload: &[u8],
    ) -> Result<(), FolioError>;

    /// Claim up to `batch_size` rows that are `CREATED` or whose
    /// `IN_PROGRESS` lease is older than `lease_ttl`, oldest first.
    ///
    /// Claimed rows move to `IN_PROGRESS` with a fresh lease. Concurrent
    /// callers never receive the same row while its lease is live.
    async fn claim_batch(
        &self,
        batch_size: usize,
        lease_ttl: Duration,
    ) -> Result<Vec<OutboxMessage>, FolioError>;

    /// Mark the given keys `SUCCESS`. An empty slice is a no-op.
    async fn mark_processed(&self, idempotency_keys: &[String]) -> Result<(), FolioError>;
}
