// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed SQL for each table.
//!
//! Functions take a plain `rusqlite::Connection` so they run equally inside a
//! [`UnitOfWork`](crate::UnitOfWork) or a one-off `call` on the writer.

pub mod authors;
pub mod books;
pub mod outbox;

use chrono::{DateTime, Utc};

/// Render a timestamp the way every table stores it. Fixed width, so text
/// comparison orders the same as time.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
