// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery handlers and their per-kind resolution.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FolioError;

/// Delivers one kind of outbox payload to a downstream system.
///
/// Handlers own payload decoding and must bound their own I/O; the
/// dispatcher applies no timeout. Delivery is at-least-once, so the
/// receiving side has to tolerate duplicates.
#[async_trait]
pub trait KindHandler: Send + Sync + 'static {
    async fn deliver(&self, payload: &[u8]) -> Result<(), FolioError>;
}

/// Maps a raw outbox kind to its delivery handler.
///
/// Unknown kinds must yield [`FolioError::UnsupportedKind`].
pub trait KindResolver: Send + Sync + 'static {
    fn resolve(&self, kind: i64) -> Result<Arc<dyn KindHandler>, FolioError>;
}

impl<F> KindResolver for F
where
    F: Fn(i64) -> Result<Arc<dyn KindHandler>, FolioError> + Send + Sync + 'static,
{
    fn resolve(&self, kind: i64) -> Result<Arc<dyn KindHandler>, FolioError> {
        self(kind)
    }
}
