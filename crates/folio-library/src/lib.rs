// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog use cases for the Folio catalog service.
//!
//! Writes that downstream systems must hear about (registering an author,
//! adding a book) commit their outbox message in the same transaction as the
//! entity itself.

pub mod library;

pub use library::Library;
