// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Units of work spanning several writes.
//!
//! [`Transactor::with_tx`] opens an immediate transaction on the database
//! writer and hands a [`UnitOfWork`] to a synchronous closure. Anything that
//! accepts `&UnitOfWork` writes through that transaction, so the closure's
//! writes commit or roll back together. Code that is already inside a unit
//! calls [`UnitOfWork::with_tx`] and stays on the same transaction.

use folio_core::FolioError;
use rusqlite::TransactionBehavior;
use tracing::{debug, error};

use crate::database::{map_call_err, Database};

/// Runs closures inside a single database transaction.
#[derive(Clone)]
pub struct Transactor {
    db: Database,
}

impl Transactor {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run `unit` in a fresh transaction.
    ///
    /// Commits when `unit` returns `Ok`, rolls back when it returns `Err`.
    /// A failed rollback is logged and the error from `unit` is returned.
    pub async fn with_tx<T, F>(&self, unit: F) -> Result<T, FolioError>
    where
        F: FnOnce(&UnitOfWork<'_>) -> Result<T, FolioError> + Send + 'static,
        T: Send + 'static,
    {
        self.db
            .connection()
            .call(move |conn| {
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(FolioError::storage)?;

                let outcome = unit(&UnitOfWork { conn: &tx });
                match outcome {
                    Ok(value) => {
                        tx.commit().map_err(|e| {
                            error!(error = %e, "transaction commit failed");
                            FolioError::storage(e)
                        })?;
                        Ok(value)
                    }
                    Err(err) => {
                        debug!(error = %err, "unit of work failed, rolling back");
                        if let Err(rollback) = tx.rollback() {
                            error!(error = %rollback, "transaction rollback failed");
                        }
                        Err(err)
                    }
                }
            })
            .await
            .map_err(map_call_err)
    }
}

/// An open transaction. Writes issued through it join the enclosing unit.
pub struct UnitOfWork<'a> {
    conn: &'a rusqlite::Connection,
}

impl UnitOfWork<'_> {
    /// The transaction's connection.
    pub fn connection(&self) -> &rusqlite::Connection {
        self.conn
    }

    /// Run `unit` inside this transaction. No savepoint is opened: an error
    /// from `unit` aborts the whole enclosing unit once it propagates.
    pub fn with_tx<T>(
        &self,
        unit: impl FnOnce(&UnitOfWork<'_>) -> Result<T, FolioError>,
    ) -> Result<T, FolioError> {
        unit(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (Database, Transactor) {
        let db = Database::open_in_memory().await.unwrap();
        let tx = Transactor::new(db.clone());
        (db, tx)
    }

    fn insert_author(uow: &UnitOfWork<'_>, id: &str) -> Result<(), FolioError> {
        uow.connection()
            .execute(
                "INSERT INTO author (id, name, created_at, updated_at)
                 VALUES (?1, 'n', '2026-01-01T00:00:00.000Z', '2026-01-01T00:00:00.000Z')",
                [id],
            )
            .map_err(FolioError::storage)?;
        Ok(())
    }

    async fn author_count(db: &Database) -> i64 {
        db.connection()
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM author", [], |row| row.get(0)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn commits_on_success() {
        let (db, tx) = setup().await;
        let value = tx
            .with_tx(|uow| {
                insert_author(uow, "a-1")?;
                insert_author(uow, "a-2")?;
                Ok(7)
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(author_count(&db).await, 2);
    }

    #[tokio::test]
    async fn rolls_back_on_error_and_returns_it() {
        let (db, tx) = setup().await;
        let err = tx
            .with_tx(|uow| -> Result<(), FolioError> {
                insert_author(uow, "a-1")?;
                Err(FolioError::InvalidInput("boom".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, FolioError::InvalidInput(ref m) if m == "boom"));
        assert_eq!(author_count(&db).await, 0);
    }

    #[tokio::test]
    async fn nested_units_share_the_outer_transaction() {
        let (db, tx) = setup().await;
        let result = tx
            .with_tx(|uow| -> Result<(), FolioError> {
                uow.with_tx(|inner| insert_author(inner, "a-1"))?;
                uow.with_tx(|inner| insert_author(inner, "a-1"))
            })
            .await;
        // The duplicate primary key fails the second nested unit, which
        // discards the first nested insert too.
        assert!(matches!(result, Err(FolioError::Storage { .. })));
        assert_eq!(author_count(&db).await, 0);
    }

    #[tokio::test]
    async fn sequential_units_are_independent() {
        let (db, tx) = setup().await;
        tx.with_tx(|uow| insert_author(uow, "a-1")).await.unwrap();
        let _ = tx
            .with_tx(|uow| -> Result<(), FolioError> {
                insert_author(uow, "a-2")?;
                Err(FolioError::Internal("abort".into()))
            })
            .await;
        assert_eq!(author_count(&db).await, 1);
    }
}
