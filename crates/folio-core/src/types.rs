// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the catalog, storage, and outbox crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FolioError;

/// A registered author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
}

/// A book and the ids of its authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub author_ids: Vec<String>,
}

/// Semantic type of an outbox payload. Drives handler resolution.
///
/// Persisted as its integer discriminant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[repr(i64)]
pub enum OutboxKind {
    Book = 0,
    Author = 1,
}

impl OutboxKind {
    /// The integer stored in the `kind` column.
    pub const fn as_i64(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for OutboxKind {
    type Error = FolioError;

    fn try_from(kind: i64) -> Result<Self, Self::Error> {
        match kind {
            0 => Ok(OutboxKind::Book),
            1 => Ok(OutboxKind::Author),
            other => Err(FolioError::UnsupportedKind { kind: other }),
        }
    }
}

/// Build the conventional idempotency key `<kind>_<entity id>`.
pub fn idempotency_key(kind: OutboxKind, entity_id: &str) -> String {
    format!("{kind}_{entity_id}")
}

/// Lifecycle state of an outbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxStatus {
    Created,
    InProgress,
    Success,
}

/// A message handed to the dispatcher by a claim.
///
/// `kind` is kept raw so rows written by a newer build still surface here
/// and fail resolution instead of failing the whole claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxMessage {
    pub idempotency_key: String,
    pub kind: i64,
    pub raw_data: Vec<u8>,
}

impl OutboxMessage {
    pub fn new(idempotency_key: impl Into<String>, kind: OutboxKind, raw_data: Vec<u8>) -> Self {
        Self {
            idempotency_key: idempotency_key.into(),
            kind: kind.as_i64(),
            raw_data,
        }
    }
}

/// A full outbox row, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxRecord {
    pub idempotency_key: String,
    pub kind: i64,
    pub raw_data: Vec<u8>,
    pub status: OutboxStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Row counts per outbox status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutboxStats {
    pub created: u64,
    pub in_progress: u64,
    pub success: u64,
}

impl OutboxStats {
    /// Rows not yet delivered.
    pub fn pending(&self) -> u64 {
        self.created + self.in_progress
    }
}
