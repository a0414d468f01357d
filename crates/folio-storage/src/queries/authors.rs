// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Author table statements.

use folio_core::Author;
use rusqlite::{params, Connection, OptionalExtension};

pub fn insert(conn: &Connection, author: &Author, now: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO author (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![author.id, author.name, now],
    )?;
    Ok(())
}

pub fn find(conn: &Connection, id: &str) -> rusqlite::Result<Option<Author>> {
    conn.query_row(
        "SELECT id, name FROM author WHERE id = ?1",
        params![id],
        |row| {
            Ok(Author {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Returns `false` when no author has this id.
pub fn rename(conn: &Connection, id: &str, name: &str, now: &str) -> rusqlite::Result<bool> {
    let updated = conn.execute(
        "UPDATE author SET name = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, name, now],
    )?;
    Ok(updated == 1)
}

/// The first id in `ids` that has no author row, if any.
pub fn first_missing(conn: &Connection, ids: &[String]) -> rusqlite::Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT 1 FROM author WHERE id = ?1")?;
    for id in ids {
        if !stmt.exists(params![id])? {
            return Ok(Some(id.clone()));
        }
    }
    Ok(None)
}
