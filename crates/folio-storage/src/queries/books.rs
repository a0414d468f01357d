// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Book and author_book statements.

use folio_core::Book;
use rusqlite::{params, Connection, OptionalExtension};

/// Insert the book row and its author links.
pub fn insert(conn: &Connection, book: &Book, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO book (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![book.id, book.name, now],
    )?;
    link_authors(conn, &book.id, &book.author_ids)
}

pub fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<Book>> {
    let name: Option<String> = conn
        .query_row("SELECT name FROM book WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    match name {
        Some(name) => Ok(Some(Book {
            id: id.to_string(),
            name,
            author_ids: author_ids(conn, id)?,
        })),
        None => Ok(None),
    }
}

/// Rename the book and replace its author links. Returns `false` when no
/// book has this id.
pub fn update(
    conn: &Connection,
    id: &str,
    name: &str,
    author_ids: &[String],
    now: &str,
) -> rusqlite::Result<bool> {
    let updated = conn.execute(
        "UPDATE book SET name = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, name, now],
    )?;
    if updated == 0 {
        return Ok(false);
    }
    conn.execute("DELETE FROM author_book WHERE book_id = ?1", params![id])?;
    link_authors(conn, id, author_ids)?;
    Ok(true)
}

/// Books linked to `author_id`, ordered by name.
pub fn by_author(conn: &Connection, author_id: &str) -> rusqlite::Result<Vec<Book>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.name
         FROM book b
         JOIN author_book ab ON ab.book_id = b.id
         WHERE ab.author_id = ?1
         ORDER BY b.name ASC, b.id ASC",
    )?;
    let heads = stmt
        .query_map(params![author_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    heads
        .into_iter()
        .map(|(id, name)| {
            let author_ids = author_ids(conn, &id)?;
            Ok(Book {
                id,
                name,
                author_ids,
            })
        })
        .collect()
}

fn author_ids(conn: &Connection, book_id: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT author_id FROM author_book WHERE book_id = ?1 ORDER BY rowid ASC",
    )?;
    stmt.query_map(params![book_id], |row| row.get(0))?
        .collect()
}

fn link_authors(conn: &Connection, book_id: &str, author_ids: &[String]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO author_book (author_id, book_id) VALUES (?1, ?2)",
    )?;
    for author_id in author_ids {
        stmt.execute(params![author_id, book_id])?;
    }
    Ok(())
}
