// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog writes flowing through the SQLite outbox to delivery handlers.

use std::sync::Arc;
use std::time::Duration;

use folio_core::{Author, OutboxKind, OutboxStatus, OutboxStore};
use folio_outbox::{DispatchSettings, KindRegistry, OutboxDispatcher};
use folio_test_utils::{RecordingHandler, TestHarness};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

async fn wait_until_processed(harness: &TestHarness, expected: u64) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if harness.outbox_stats().await.unwrap().success >= expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

fn settings(lease_ttl: Duration) -> DispatchSettings {
    DispatchSettings {
        worker_count: 2,
        batch_size: 10,
        poll_interval: Duration::from_millis(5),
        lease_ttl,
    }
}

#[tokio::test]
async fn registered_author_is_delivered_once_and_marked() {
    let harness = TestHarness::new().await.unwrap();
    let author = harness.library.register_author("Ann Leckie").await.unwrap();

    let handler = RecordingHandler::new();
    let registry = KindRegistry::new().with(OutboxKind::Author, Arc::new(handler.clone()));
    let dispatcher = OutboxDispatcher::new(
        true,
        Arc::new(harness.outbox.clone()),
        Arc::new(registry),
    );
    let cancel = CancellationToken::new();
    let handle = dispatcher.start(cancel.clone(), settings(Duration::from_secs(30)));

    assert!(wait_until_processed(&harness, 1).await);
    cancel.cancel();
    handle.join().await;

    let deliveries = handler.deliveries().await;
    assert_eq!(deliveries.len(), 1);
    let delivered: Author = serde_json::from_slice(&deliveries[0]).unwrap();
    assert_eq!(delivered, author);

    let record = harness
        .outbox
        .get(&format!("author_{}", author.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, OutboxStatus::Success);
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn unhandled_kind_is_redelivered_after_lease_expiry() {
    let harness = TestHarness::new().await.unwrap();
    let author = harness.library.register_author("Gene Wolfe").await.unwrap();
    harness
        .library
        .add_book("Shadow of the Torturer", &[author.id.clone()])
        .await
        .unwrap();

    // Only books have a handler; the author message stays in flight.
    let books = RecordingHandler::new();
    let registry = KindRegistry::new().with(OutboxKind::Book, Arc::new(books.clone()));
    let dispatcher = OutboxDispatcher::new(true, Arc::new(harness.outbox.clone()), Arc::new(registry));
    let cancel = CancellationToken::new();
    let handle = dispatcher.start(cancel.clone(), settings(Duration::from_secs(30)));

    assert!(wait_until_processed(&harness, 1).await);
    cancel.cancel();
    handle.join().await;

    let stats = harness.outbox_stats().await.unwrap();
    assert_eq!(stats.success, 1);
    assert_eq!(stats.in_progress, 1);

    // Once the lease is over, a dispatcher that knows authors picks it up.
    tokio::time::sleep(Duration::from_millis(60)).await;
    let authors = RecordingHandler::new();
    let registry = KindRegistry::new().with(OutboxKind::Author, Arc::new(authors.clone()));
    let dispatcher = OutboxDispatcher::new(true, Arc::new(harness.outbox.clone()), Arc::new(registry));
    let cancel = CancellationToken::new();
    let handle = dispatcher.start(
        cancel.clone(),
        DispatchSettings {
            worker_count: 1,
            ..settings(Duration::from_millis(50))
        },
    );

    assert!(wait_until_processed(&harness, 2).await);
    cancel.cancel();
    handle.join().await;

    assert_eq!(authors.delivery_count().await, 1);
    assert_eq!(books.delivery_count().await, 1);
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn processed_rows_are_not_claimed_again() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .outbox
        .enqueue("book_42", OutboxKind::Book, br#"{"id":"42","name":"n"}"#)
        .await
        .unwrap();

    let handler = RecordingHandler::new();
    let registry = KindRegistry::new().with(OutboxKind::Book, Arc::new(handler.clone()));
    let dispatcher = OutboxDispatcher::new(true, Arc::new(harness.outbox.clone()), Arc::new(registry));
    let cancel = CancellationToken::new();
    // A single worker, so the zero lease cannot race a second claimer.
    let handle = dispatcher.start(
        cancel.clone(),
        DispatchSettings {
            worker_count: 1,
            ..settings(Duration::ZERO)
        },
    );

    assert!(wait_until_processed(&harness, 1).await);
    // Give the workers many more polls with a zero lease.
    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    handle.join().await;

    assert_eq!(handler.delivery_count().await, 1);
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn http_notifier_end_to_end() {
    let server = MockServer::start().await;
    let harness = TestHarness::new().await.unwrap();
    let author = harness.library.register_author("Becky Chambers").await.unwrap();

    Mock::given(method("POST"))
        .and(path("/authors"))
        .and(body_string(author.id.clone()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = folio_config::model::OutboxConfig {
        enabled: true,
        author_send_url: Some(format!("{}/authors", server.uri())),
        book_send_url: Some(format!("{}/books", server.uri())),
        ..Default::default()
    };
    let registry = folio_outbox::http_registry(&config).unwrap();
    let dispatcher = OutboxDispatcher::new(true, Arc::new(harness.outbox.clone()), Arc::new(registry));
    let cancel = CancellationToken::new();
    let handle = dispatcher.start(cancel.clone(), settings(Duration::from_secs(30)));

    assert!(wait_until_processed(&harness, 1).await);
    cancel.cancel();
    handle.join().await;
    harness.shutdown().await.unwrap();
}
