// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog use cases against a real SQLite file.

use std::time::Duration;

use folio_core::{Author, Book, FolioError, OutboxKind, OutboxStatus, OutboxStore};
use folio_test_utils::TestHarness;

#[tokio::test]
async fn register_author_persists_author_and_outbox_row() {
    let harness = TestHarness::new().await.unwrap();
    let author = harness.library.register_author("Ursula K. Le Guin").await.unwrap();

    assert_eq!(harness.library.get_author(&author.id).await.unwrap(), author);

    let record = harness
        .outbox
        .get(&format!("author_{}", author.id))
        .await
        .unwrap()
        .expect("outbox row written with the author");
    assert_eq!(record.status, OutboxStatus::Created);
    assert_eq!(record.kind, OutboxKind::Author.as_i64());
    let snapshot: Author = serde_json::from_slice(&record.raw_data).unwrap();
    assert_eq!(snapshot, author);

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn add_book_links_authors_and_enqueues_snapshot() {
    let harness = TestHarness::new().await.unwrap();
    let first = harness.library.register_author("Terry").await.unwrap();
    let second = harness.library.register_author("Neil").await.unwrap();

    let book = harness
        .library
        .add_book("Good Omens", &[first.id.clone(), second.id.clone()])
        .await
        .unwrap();
    assert_eq!(book.author_ids, vec![first.id.clone(), second.id.clone()]);
    assert_eq!(harness.library.get_book(&book.id).await.unwrap(), book);

    let record = harness
        .outbox
        .get(&format!("book_{}", book.id))
        .await
        .unwrap()
        .unwrap();
    let snapshot: Book = serde_json::from_slice(&record.raw_data).unwrap();
    assert_eq!(snapshot, book);

    let stats = harness.outbox_stats().await.unwrap();
    assert_eq!(stats.created, 3);

    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn add_book_with_unknown_author_writes_nothing() {
    let harness = TestHarness::new().await.unwrap();
    let err = harness
        .library
        .add_book("Orphan", &["missing-author".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FolioError::NotFound { entity: "author", ref id } if id == "missing-author"
    ));
    assert_eq!(harness.outbox_stats().await.unwrap().pending(), 0);
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn missing_entities_are_not_found() {
    let harness = TestHarness::new().await.unwrap();
    assert!(matches!(
        harness.library.get_author("nope").await,
        Err(FolioError::NotFound { entity: "author", .. })
    ));
    assert!(matches!(
        harness.library.get_book("nope").await,
        Err(FolioError::NotFound { entity: "book", .. })
    ));
    assert!(matches!(
        harness.library.change_author("nope", "Name").await,
        Err(FolioError::NotFound { entity: "author", .. })
    ));
    assert!(matches!(
        harness.library.update_book("nope", "Name", &[]).await,
        Err(FolioError::NotFound { entity: "book", .. })
    ));
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn change_author_renames_without_notification() {
    let harness = TestHarness::new().await.unwrap();
    let author = harness.library.register_author("Iain Banks").await.unwrap();
    harness
        .library
        .change_author(&author.id, "Iain M. Banks")
        .await
        .unwrap();

    assert_eq!(
        harness.library.get_author(&author.id).await.unwrap().name,
        "Iain M. Banks"
    );
    assert_eq!(harness.outbox_stats().await.unwrap().created, 1);
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn update_book_replaces_links() {
    let harness = TestHarness::new().await.unwrap();
    let a = harness.library.register_author("A").await.unwrap();
    let b = harness.library.register_author("B").await.unwrap();
    let book = harness
        .library
        .add_book("Draft", &[a.id.clone()])
        .await
        .unwrap();

    harness
        .library
        .update_book(&book.id, "Final", &[b.id.clone()])
        .await
        .unwrap();

    let updated = harness.library.get_book(&book.id).await.unwrap();
    assert_eq!(updated.name, "Final");
    assert_eq!(updated.author_ids, vec![b.id.clone()]);
    assert!(harness.library.get_author_books(&a.id).await.unwrap().is_empty());
    assert_eq!(harness.library.get_author_books(&b.id).await.unwrap(), vec![updated]);
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn failed_update_keeps_previous_links() {
    let harness = TestHarness::new().await.unwrap();
    let a = harness.library.register_author("A").await.unwrap();
    let book = harness.library.add_book("Kept", &[a.id.clone()]).await.unwrap();

    let result = harness
        .library
        .update_book(&book.id, "Changed", &["ghost".to_string()])
        .await;
    assert!(result.is_err());
    assert_eq!(harness.library.get_book(&book.id).await.unwrap(), book);
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn author_books_are_ordered_by_name() {
    let harness = TestHarness::new().await.unwrap();
    let author = harness.library.register_author("Prolific").await.unwrap();
    for name in ["Zebra", "Apple", "Mango"] {
        harness
            .library
            .add_book(name, &[author.id.clone()])
            .await
            .unwrap();
    }

    let names: Vec<_> = harness
        .library
        .get_author_books(&author.id)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(names, ["Apple", "Mango", "Zebra"]);
    harness.shutdown().await.unwrap();
}

#[tokio::test]
async fn registered_messages_are_claimable_in_order() {
    let harness = TestHarness::new().await.unwrap();
    let author = harness.library.register_author("First").await.unwrap();
    let book = harness
        .library
        .add_book("Second", &[author.id.clone()])
        .await
        .unwrap();

    let claimed = harness
        .outbox
        .claim_batch(10, Duration::from_secs(30))
        .await
        .unwrap();
    let keys: Vec<_> = claimed.into_iter().map(|m| m.idempotency_key).collect();
    assert_eq!(
        keys,
        vec![format!("author_{}", author.id), format!("book_{}", book.id)]
    );
    harness.shutdown().await.unwrap();
}
