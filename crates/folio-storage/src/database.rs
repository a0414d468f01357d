// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All work is serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use folio_config::model::StorageConfig;
use folio_core::FolioError;
use tracing::{debug, info};

use crate::migrations::run_migrations;

/// Milliseconds SQLite waits on a locked database before returning `SQLITE_BUSY`.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Handle to the catalog database.
///
/// Cloning is cheap; every clone talks to the same background writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) a database file in WAL mode and migrate it.
    pub async fn open(path: &str) -> Result<Self, FolioError> {
        Self::open_with(path, true).await
    }

    /// Open the database described by the `[storage]` config section.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, FolioError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    /// A private in-memory database, migrated and ready for use.
    pub async fn open_in_memory() -> Result<Self, FolioError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(FolioError::storage)?;
        Self::prepare(conn, false).await
    }

    async fn open_with(path: &str, wal_mode: bool) -> Result<Self, FolioError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(FolioError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(FolioError::storage)?;
        let db = Self::prepare(conn, wal_mode).await?;
        info!(path, wal_mode, "database opened");
        Ok(db)
    }

    async fn prepare(conn: tokio_rusqlite::Connection, wal_mode: bool) -> Result<Self, FolioError> {
        let mut pragmas = format!("PRAGMA busy_timeout={BUSY_TIMEOUT_MS}; PRAGMA foreign_keys=ON;");
        if wal_mode {
            pragmas.push_str(" PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;");
        }

        conn.call(move |conn| conn.execute_batch(&pragmas))
            .await
            .map_err(map_tr_err)?;

        conn.call(|conn| run_migrations(conn))
            .await
            .map_err(map_call_err)?;
        debug!("migrations applied");

        Ok(Self { conn })
    }

    /// The shared tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    ///
    /// Other clones of this handle fail with a storage error afterwards.
    pub async fn close(self) -> Result<(), FolioError> {
        self.conn
            .call(|conn| conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);"))
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        self.conn.close().await.map_err(map_tr_err)?;
        Ok(())
    }
}

/// Convert a tokio-rusqlite error wrapping a rusqlite error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> FolioError {
    FolioError::storage(e)
}

/// Unwrap a `FolioError` returned from inside a `call` closure; connection
/// failures become storage errors.
pub(crate) fn map_call_err(e: tokio_rusqlite::Error<FolioError>) -> FolioError {
    match e {
        tokio_rusqlite::Error::Error(inner) => inner,
        other => FolioError::storage(other),
    }
}
