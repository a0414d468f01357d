// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP notification handler.
//!
//! POSTs the id of the entity carried by an outbox payload to a fixed URL.
//! The body is the bare id with `Content-Type: application/json`; consumers
//! are expected to fetch the entity themselves.

use std::time::Duration;

use async_trait::async_trait;
use folio_core::{Author, Book, FolioError, KindHandler, OutboxKind};
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const POOL_MAX_IDLE_PER_HOST: usize = 100;
const TCP_KEEPALIVE: Duration = Duration::from_secs(180);

/// Build the client shared by every notifier.
pub fn build_client(request_timeout: Duration) -> Result<reqwest::Client, FolioError> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(request_timeout))
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .tcp_keepalive(TCP_KEEPALIVE)
        .build()
        .map_err(|e| FolioError::Delivery {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Delivers one [`OutboxKind`] by POSTing the entity id.
pub struct HttpNotifier {
    kind: OutboxKind,
    url: String,
    client: reqwest::Client,
}

impl HttpNotifier {
    pub fn new(kind: OutboxKind, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            kind,
            url: url.into(),
            client,
        }
    }

    fn entity_id(&self, payload: &[u8]) -> Result<String, FolioError> {
        let id = match self.kind {
            OutboxKind::Book => serde_json::from_slice::<Book>(payload)?.id,
            OutboxKind::Author => serde_json::from_slice::<Author>(payload)?.id,
        };
        Ok(id)
    }
}

#[async_trait]
impl KindHandler for HttpNotifier {
    async fn deliver(&self, payload: &[u8]) -> Result<(), FolioError> {
        let id = self.entity_id(payload)?;

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(id.clone())
            .send()
            .await
            .map_err(|e| FolioError::Delivery {
                message: format!("{} notification for {id} failed: {e}", self.kind),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FolioError::Delivery {
                message: format!("{} notification for {id} returned {status}", self.kind),
                source: None,
            });
        }

        debug!(kind = %self.kind, id = %id, status = status.as_u16(), "notification delivered");
        Ok(())
    }
}

impl std::fmt::Debug for HttpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNotifier")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
