// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbox delivery for the Folio catalog service.
//!
//! [`OutboxDispatcher`] runs the polling workers, [`KindRegistry`] picks a
//! handler per message kind, and [`HttpNotifier`] is the shipped handler.

pub mod dispatcher;
pub mod http;
pub mod registry;

use std::sync::Arc;

use folio_config::model::OutboxConfig;
use folio_core::{FolioError, OutboxKind};

pub use dispatcher::{DispatchSettings, DispatcherHandle, OutboxDispatcher};
pub use http::{build_client, HttpNotifier};
pub use registry::KindRegistry;

/// Registry with an [`HttpNotifier`] for every configured send URL.
///
/// Kinds without a URL stay unregistered, so their messages are claimed and
/// left for lease expiry.
pub fn http_registry(config: &OutboxConfig) -> Result<KindRegistry, FolioError> {
    let client = build_client(config.request_timeout())?;
    let mut registry = KindRegistry::new();
    for (kind, url) in [
        (OutboxKind::Book, &config.book_send_url),
        (OutboxKind::Author, &config.author_send_url),
    ] {
        if let Some(url) = url {
            registry.register(kind, Arc::new(HttpNotifier::new(kind, url.clone(), client.clone())));
        }
    }
    Ok(registry)
}
