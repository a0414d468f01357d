// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kind-to-handler registry built at startup.

use std::collections::HashMap;
use std::sync::Arc;

use folio_core::{FolioError, KindHandler, KindResolver, OutboxKind};

/// Maps each [`OutboxKind`] to the handler that delivers it.
#[derive(Default, Clone)]
pub struct KindRegistry {
    handlers: HashMap<OutboxKind, Arc<dyn KindHandler>>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`, replacing any earlier registration.
    pub fn register(&mut self, kind: OutboxKind, handler: Arc<dyn KindHandler>) -> &mut Self {
        self.handlers.insert(kind, handler);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, kind: OutboxKind, handler: Arc<dyn KindHandler>) -> Self {
        self.register(kind, handler);
        self
    }

    pub fn contains(&self, kind: OutboxKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl KindResolver for KindRegistry {
    fn resolve(&self, kind: i64) -> Result<Arc<dyn KindHandler>, FolioError> {
        let known = OutboxKind::try_from(kind)?;
        self.handlers
            .get(&known)
            .cloned()
            .ok_or(FolioError::UnsupportedKind { kind })
    }
}

impl std::fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.handlers.keys().map(|k| k.to_string()).collect();
        kinds.sort();
        f.debug_struct("KindRegistry").field("kinds", &kinds).finish()
    }
}
