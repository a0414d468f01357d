// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Folio catalog service.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, units of work that span several
//! writes, and the transactional outbox table.

pub mod database;
pub mod migrations;
pub mod outbox;
pub mod queries;
pub mod transactor;

pub use database::Database;
pub use outbox::OutboxRepository;
pub use transactor::{Transactor, UnitOfWork};
