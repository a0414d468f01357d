// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbox table statements.

use std::str::FromStr;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use folio_core::{OutboxMessage, OutboxRecord, OutboxStats, OutboxStatus};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};

use super::format_timestamp;

/// Keys per `UPDATE ... IN (...)` statement, well under SQLite's bound-parameter limit.
const MARK_CHUNK: usize = 500;

/// Insert a `CREATED` row. Returns `false` when the key already exists.
pub fn insert(
    conn: &Connection,
    key: &str,
    kind: i64,
    payload: &[u8],
    now: &str,
) -> rusqlite::Result<bool> {
    let inserted = conn.execute(
        "INSERT INTO outbox (idempotency_key, data, status, kind, created_at, updated_at)
         VALUES (?1, ?2, 'CREATED', ?3, ?4, ?4)
         ON CONFLICT(idempotency_key) DO NOTHING",
        params![key, payload, kind, now],
    )?;
    Ok(inserted == 1)
}

/// Claim up to `limit` rows that are `CREATED`, or `IN_PROGRESS` with a
/// lease older than `lease_ttl`, oldest first.
///
/// Selection and the move to `IN_PROGRESS` share one immediate transaction.
/// The lease clock is read once the write lock is held, so time spent queued
/// behind other writers never shortens the new lease. A TTL too large to
/// subtract from the current time claims fresh rows only.
pub fn claim(
    conn: &mut Connection,
    limit: usize,
    lease_ttl: Duration,
) -> rusqlite::Result<Vec<OutboxMessage>> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let now = Utc::now();
    let stale_before = TimeDelta::from_std(lease_ttl)
        .ok()
        .and_then(|ttl| now.checked_sub_signed(ttl))
        .map(format_timestamp);
    let now = format_timestamp(now);

    let messages = {
        let mut stmt = tx.prepare(
            "SELECT idempotency_key, kind, data
             FROM outbox
             WHERE status = 'CREATED'
                OR (status = 'IN_PROGRESS' AND updated_at < ?1)
             ORDER BY created_at ASC, rowid ASC
             LIMIT ?2",
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        stmt.query_map(params![stale_before, limit], |row| {
            Ok(OutboxMessage {
                idempotency_key: row.get(0)?,
                kind: row.get(1)?,
                raw_data: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?
    };

    {
        let mut stmt = tx.prepare(
            "UPDATE outbox SET status = 'IN_PROGRESS', updated_at = ?1
             WHERE idempotency_key = ?2",
        )?;
        for message in &messages {
            stmt.execute(params![now, message.idempotency_key])?;
        }
    }

    tx.commit()?;
    Ok(messages)
}

/// Move the given keys to `SUCCESS`. Returns the number of rows updated.
pub fn mark_success(conn: &mut Connection, keys: &[String], now: &str) -> rusqlite::Result<usize> {
    let tx = conn.transaction()?;
    let mut updated = 0;
    for chunk in keys.chunks(MARK_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!(
            "UPDATE outbox SET status = 'SUCCESS', updated_at = ?
             WHERE idempotency_key IN ({placeholders})"
        );
        let values = std::iter::once(now).chain(chunk.iter().map(String::as_str));
        updated += tx.execute(&sql, params_from_iter(values))?;
    }
    tx.commit()?;
    Ok(updated)
}

pub fn find(conn: &Connection, key: &str) -> rusqlite::Result<Option<OutboxRecord>> {
    conn.query_row(
        "SELECT idempotency_key, kind, data, status, created_at, updated_at
         FROM outbox WHERE idempotency_key = ?1",
        params![key],
        |row| {
            let status: String = row.get(3)?;
            Ok(OutboxRecord {
                idempotency_key: row.get(0)?,
                kind: row.get(1)?,
                raw_data: row.get(2)?,
                status: OutboxStatus::from_str(&status).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                })?,
                created_at: row.get(4)?,
                updated_at: row.get(5)?,
            })
        },
    )
    .optional()
}

pub fn count_by_status(conn: &Connection) -> rusqlite::Result<OutboxStats> {
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM outbox GROUP BY status")?;
    let mut rows = stmt.query([])?;
    let mut stats = OutboxStats::default();
    while let Some(row) = rows.next()? {
        let status: String = row.get(0)?;
        let count: i64 = row.get(1)?;
        let count = u64::try_from(count).unwrap_or_default();
        match OutboxStatus::from_str(&status) {
            Ok(OutboxStatus::Created) => stats.created = count,
            Ok(OutboxStatus::InProgress) => stats.in_progress = count,
            Ok(OutboxStatus::Success) => stats.success = count,
            Err(_) => tracing::warn!(status, "ignoring unknown outbox status"),
        }
    }
    Ok(stats)
}
