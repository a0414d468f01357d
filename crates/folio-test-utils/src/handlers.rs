// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recording delivery handlers and a call-counting resolver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use folio_core::{FolioError, KindHandler, KindResolver, OutboxKind};

/// Handler that records every payload it is given.
///
/// A failing handler still records the payload before returning its error.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    payloads: Arc<Mutex<Vec<Vec<u8>>>>,
    failure: Option<String>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler whose every delivery fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub async fn deliveries(&self) -> Vec<Vec<u8>> {
        self.payloads.lock().await.clone()
    }

    pub async fn delivery_count(&self) -> usize {
        self.payloads.lock().await.len()
    }

    /// Poll until at least `count` deliveries were recorded.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.delivery_count().await >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        self.delivery_count().await >= count
    }
}

#[async_trait]
impl KindHandler for RecordingHandler {
    async fn deliver(&self, payload: &[u8]) -> Result<(), FolioError> {
        self.payloads.lock().await.push(payload.to_vec());
        match &self.failure {
            Some(message) => Err(FolioError::Delivery {
                message: message.clone(),
                source: None,
            }),
            None => Ok(()),
        }
    }
}

/// Resolver over a fixed kind map that counts how often it is asked.
#[derive(Clone, Default)]
pub struct CountingResolver {
    handlers: HashMap<i64, Arc<dyn KindHandler>>,
    calls: Arc<AtomicUsize>,
}

impl CountingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: OutboxKind, handler: Arc<dyn KindHandler>) -> Self {
        self.handlers.insert(kind.as_i64(), handler);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KindResolver for CountingResolver {
    fn resolve(&self, kind: i64) -> Result<Arc<dyn KindHandler>, FolioError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.handlers
            .get(&kind)
            .cloned()
            .ok_or(FolioError::UnsupportedKind { kind })
    }
}
