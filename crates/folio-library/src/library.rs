// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Author and book operations.

use folio_core::{idempotency_key, Author, Book, FolioError, OutboxKind};
use folio_storage::queries::{self, format_timestamp};
use folio_storage::{Database, OutboxRepository, Transactor, UnitOfWork};
use tracing::{debug, info};

/// Catalog operations over one database.
#[derive(Clone)]
pub struct Library {
    db: Database,
    transactor: Transactor,
    outbox: OutboxRepository,
}

impl Library {
    pub fn new(db: Database) -> Self {
        Self {
            transactor: Transactor::new(db.clone()),
            outbox: OutboxRepository::new(db.clone()),
            db,
        }
    }

    /// The outbox this library enqueues into.
    pub fn outbox(&self) -> &OutboxRepository {
        &self.outbox
    }

    /// Create an author and enqueue an `author_<id>` notification with it.
    pub async fn register_author(&self, name: &str) -> Result<Author, FolioError> {
        let author = Author {
            id: new_id(),
            name: required_name(name)?,
        };

        let outbox = self.outbox.clone();
        let stored = author.clone();
        self.transactor
            .with_tx(move |uow| {
                queries::authors::insert(uow.connection(), &stored, &now())
                    .map_err(FolioError::storage)?;
                enqueue_snapshot(&outbox, uow, OutboxKind::Author, &stored.id, &stored)
            })
            .await?;

        info!(author_id = %author.id, "author registered");
        Ok(author)
    }

    pub async fn get_author(&self, id: &str) -> Result<Author, FolioError> {
        let lookup = id.to_string();
        self.run(move |conn| queries::authors::find(conn, &lookup))
            .await?
            .ok_or_else(|| not_found("author", id))
    }

    /// Rename an author. No notification is sent.
    pub async fn change_author(&self, id: &str, name: &str) -> Result<(), FolioError> {
        let name = required_name(name)?;
        let lookup = id.to_string();
        let renamed = self
            .run(move |conn| queries::authors::rename(conn, &lookup, &name, &now()))
            .await?;
        if !renamed {
            return Err(not_found("author", id));
        }
        debug!(author_id = %id, "author renamed");
        Ok(())
    }

    /// Create a book linked to existing authors and enqueue a `book_<id>`
    /// notification with it.
    pub async fn add_book(&self, name: &str, author_ids: &[String]) -> Result<Book, FolioError> {
        let book = Book {
            id: new_id(),
            name: required_name(name)?,
            author_ids: dedup(author_ids),
        };

        let outbox = self.outbox.clone();
        let stored = book.clone();
        self.transactor
            .with_tx(move |uow| {
                ensure_authors_exist(uow, &stored.author_ids)?;
                queries::books::insert(uow.connection(), &stored, &now())
                    .map_err(FolioError::storage)?;
                enqueue_snapshot(&outbox, uow, OutboxKind::Book, &stored.id, &stored)
            })
            .await?;

        info!(book_id = %book.id, authors = book.author_ids.len(), "book added");
        Ok(book)
    }

    pub async fn get_book(&self, id: &str) -> Result<Book, FolioError> {
        let lookup = id.to_string();
        self.run(move |conn| queries::books::find(conn, &lookup))
            .await?
            .ok_or_else(|| not_found("book", id))
    }

    /// Replace a book's name and author links in one transaction.
    pub async fn update_book(
        &self,
        id: &str,
        name: &str,
        author_ids: &[String],
    ) -> Result<(), FolioError> {
        let name = required_name(name)?;
        let author_ids = dedup(author_ids);
        let book_id = id.to_string();

        self.transactor
            .with_tx(move |uow| {
                ensure_authors_exist(uow, &author_ids)?;
                let updated =
                    queries::books::update(uow.connection(), &book_id, &name, &author_ids, &now())
                        .map_err(FolioError::storage)?;
                if updated {
                    Ok(())
                } else {
                    Err(not_found("book", &book_id))
                }
            })
            .await?;

        debug!(book_id = %id, "book updated");
        Ok(())
    }

    /// Books linked to an author. An unknown author has no books.
    pub async fn get_author_books(&self, author_id: &str) -> Result<Vec<Book>, FolioError> {
        let author_id = author_id.to_string();
        self.run(move |conn| queries::books::by_author(conn, &author_id))
            .await
    }

    async fn run<T, F>(&self, query: F) -> Result<T, FolioError>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.db
            .connection()
            .call(move |conn| query(conn))
            .await
            .map_err(folio_storage::database::map_tr_err)
    }
}

fn enqueue_snapshot<T: serde::Serialize>(
    outbox: &OutboxRepository,
    uow: &UnitOfWork<'_>,
    kind: OutboxKind,
    id: &str,
    entity: &T,
) -> Result<(), FolioError> {
    let payload = serde_json::to_vec(entity)?;
    outbox.enqueue_in(uow, &idempotency_key(kind, id), kind, &payload)
}

fn ensure_authors_exist(uow: &UnitOfWork<'_>, author_ids: &[String]) -> Result<(), FolioError> {
    match queries::authors::first_missing(uow.connection(), author_ids)
        .map_err(FolioError::storage)?
    {
        Some(missing) => Err(not_found("author", &missing)),
        None => Ok(()),
    }
}

fn required_name(name: &str) -> Result<String, FolioError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FolioError::InvalidInput("name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn dedup(ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn not_found(entity: &'static str, id: &str) -> FolioError {
    FolioError::NotFound {
        entity,
        id: id.to_string(),
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> String {
    format_timestamp(chrono::Utc::now())
}
