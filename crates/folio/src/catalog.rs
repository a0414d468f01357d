// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `folio author`, `folio book` and `folio outbox` command implementations.
//!
//! Each command renders its result as a string; `main` prints it.

use folio_core::{FolioError, OutboxStats};
use folio_library::Library;
use serde::Serialize;

use crate::{AuthorCommand, BookCommand, OutboxCommand};

pub(crate) async fn run_author(library: &Library, command: AuthorCommand) -> Result<String, FolioError> {
    match command {
        AuthorCommand::Register { name } => to_json(&library.register_author(&name).await?),
        AuthorCommand::Show { id } => to_json(&library.get_author(&id).await?),
        AuthorCommand::Rename { id, name } => {
            library.change_author(&id, &name).await?;
            to_json(&library.get_author(&id).await?)
        }
        AuthorCommand::Books { id } => to_json(&library.get_author_books(&id).await?),
    }
}

pub(crate) async fn run_book(library: &Library, command: BookCommand) -> Result<String, FolioError> {
    match command {
        BookCommand::Add { name, authors } => to_json(&library.add_book(&name, &authors).await?),
        BookCommand::Show { id } => to_json(&library.get_book(&id).await?),
        BookCommand::Update { id, name, authors } => {
            library.update_book(&id, &name, &authors).await?;
            to_json(&library.get_book(&id).await?)
        }
    }
}

pub(crate) async fn run_outbox(library: &Library, command: OutboxCommand) -> Result<String, FolioError> {
    match command {
        OutboxCommand::Stats { json } => {
            let stats = library.outbox().count_by_status().await?;
            if json {
                to_json(&serde_json::json!({
                    "created": stats.created,
                    "in_progress": stats.in_progress,
                    "success": stats.success,
                    "pending": stats.pending(),
                }))
            } else {
                Ok(render_stats(&stats))
            }
        }
    }
}

fn render_stats(stats: &OutboxStats) -> String {
    format!(
        "created:     {}\nin_progress: {}\nsuccess:     {}\npending:     {}",
        stats.created,
        stats.in_progress,
        stats.success,
        stats.pending()
    )
}

fn to_json<T: Serialize>(value: &T) -> Result<String, FolioError> {
    Ok(serde_json::to_string_pretty(value)?)
}
