// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness backed by a throwaway SQLite file.
//!
//! `TestHarness` opens a migrated database in a temp directory and wires the
//! transactor, outbox repository, and library on top of it.

use folio_core::{FolioError, OutboxStats};
use folio_library::Library;
use folio_storage::{Database, OutboxRepository, Transactor};

/// A fully wired storage stack for one test.
pub struct TestHarness {
    pub db: Database,
    pub transactor: Transactor,
    pub outbox: OutboxRepository,
    pub library: Library,
    // Held so the database file outlives the test body.
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub async fn new() -> Result<Self, FolioError> {
        let temp_dir = tempfile::TempDir::new().map_err(FolioError::storage)?;
        let db_path = temp_dir.path().join("folio-test.db");
        let db = Database::open(&db_path.to_string_lossy()).await?;

        Ok(Self {
            transactor: Transactor::new(db.clone()),
            outbox: OutboxRepository::new(db.clone()),
            library: Library::new(db.clone()),
            db,
            temp_dir,
        })
    }

    /// Path of the database file.
    pub fn database_path(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("folio-test.db")
    }

    pub async fn outbox_stats(&self) -> Result<OutboxStats, FolioError> {
        self.outbox.count_by_status().await
    }

    /// Checkpoint and close the database.
    pub async fn shutdown(self) -> Result<(), FolioError> {
        self.db.close().await
    }
}
