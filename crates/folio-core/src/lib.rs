// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Folio catalog service.
//!
//! This crate provides the error type, the catalog and outbox types, and the
//! trait seams ([`OutboxStore`], [`KindHandler`], [`KindResolver`]) that the
//! storage backend and the outbox dispatcher meet at.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::FolioError;
pub use traits::{KindHandler, KindResolver, OutboxStore};
pub use types::{
    idempotency_key, Author, Book, OutboxKind, OutboxMessage, OutboxRecord, OutboxStats,
    OutboxStatus,
};
