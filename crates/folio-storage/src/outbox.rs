// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed outbox store.

use std::time::Duration;

use async_trait::async_trait;
use folio_core::{FolioError, OutboxKind, OutboxMessage, OutboxRecord, OutboxStats, OutboxStore};
use tracing::debug;

use crate::database::{map_tr_err, Database};
use crate::queries::{self, now_timestamp};
use crate::transactor::UnitOfWork;

/// The `outbox` table behind the [`OutboxStore`] trait.
///
/// Claims are exclusive because every claim is a `BEGIN IMMEDIATE`
/// transaction on the single writer thread; other processes sharing the file
/// queue on SQLite's write lock.
#[derive(Clone)]
pub struct OutboxRepository {
    db: Database,
}

impl OutboxRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Enqueue inside an open unit of work. The row commits or rolls back
    /// with the rest of the unit.
    pub fn enqueue_in(
        &self,
        uow: &UnitOfWork<'_>,
        key: &str,
        kind: OutboxKind,
        payload: &[u8],
    ) -> Result<(), FolioError> {
        let inserted =
            queries::outbox::insert(uow.connection(), key, kind.as_i64(), payload, &now_timestamp())
                .map_err(FolioError::storage)?;
        debug!(key, %kind, inserted, "outbox message enqueued in transaction");
        Ok(())
    }

    /// Full row for `key`, if present.
    pub async fn get(&self, key: &str) -> Result<Option<OutboxRecord>, FolioError> {
        let key = key.to_string();
        self.db
            .connection()
            .call(move |conn| queries::outbox::find(conn, &key))
            .await
            .map_err(map_tr_err)
    }

    pub async fn count_by_status(&self) -> Result<OutboxStats, FolioError> {
        self.db
            .connection()
            .call(|conn| queries::outbox::count_by_status(conn))
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl OutboxStore for OutboxRepository {
    async fn enqueue(&self, key: &str, kind: OutboxKind, payload: &[u8]) -> Result<(), FolioError> {
        let key = key.to_string();
        let payload = payload.to_vec();
        let inserted = self
            .db
            .connection()
            .call(move |conn| {
                queries::outbox::insert(conn, &key, kind.as_i64(), &payload, &now_timestamp())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(%kind, inserted, "outbox message enqueued");
        Ok(())
    }

    async fn claim_batch(
        &self,
        batch_size: usize,
        lease_ttl: Duration,
    ) -> Result<Vec<OutboxMessage>, FolioError> {
        self.db
            .connection()
            .call(move |conn| queries::outbox::claim(conn, batch_size, lease_ttl))
            .await
            .map_err(map_tr_err)
    }

    async fn mark_processed(&self, keys: &[String]) -> Result<(), FolioError> {
        if keys.is_empty() {
            return Ok(());
        }
        let keys = keys.to_vec();
        let updated = self
            .db
            .connection()
            .call(move |conn| queries::outbox::mark_success(conn, &keys, &now_timestamp()))
            .await
            .map_err(map_tr_err)?;
        debug!(updated, "outbox messages marked processed");
        Ok(())
    }
}
