// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A domain row and its outbox row persist together or not at all.

use folio_core::{idempotency_key, Author, FolioError, OutboxKind, OutboxStore};
use folio_storage::queries::{authors, format_timestamp};
use folio_storage::{Database, OutboxRepository, Transactor};
use tempfile::tempdir;

fn author(name: &str) -> Author {
    Author {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
    }
}

async fn author_exists(db: &Database, id: &str) -> bool {
    let id = id.to_string();
    db.connection()
        .call(move |conn| authors::find(conn, &id))
        .await
        .unwrap()
        .is_some()
}

async fn setup() -> (tempfile::TempDir, Database, Transactor, OutboxRepository) {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("folio.db").to_str().unwrap())
        .await
        .unwrap();
    let transactor = Transactor::new(db.clone());
    let outbox = OutboxRepository::new(db.clone());
    (dir, db, transactor, outbox)
}

#[tokio::test]
async fn domain_failure_after_enqueue_discards_both() {
    let (_dir, db, transactor, outbox) = setup().await;
    let existing = author("Ursula");
    let now = format_timestamp(chrono::Utc::now());
    {
        let existing = existing.clone();
        transactor
            .with_tx(move |uow| {
                authors::insert(uow.connection(), &existing, &now).map_err(FolioError::storage)
            })
            .await
            .unwrap();
    }

    // Enqueue first, then hit a primary key conflict on the author insert.
    let store = outbox.clone();
    let duplicate = existing.clone();
    let key = idempotency_key(OutboxKind::Author, &duplicate.id);
    let key_in_tx = key.clone();
    let err = transactor
        .with_tx(move |uow| {
            store.enqueue_in(uow, &key_in_tx, OutboxKind::Author, b"{}")?;
            authors::insert(uow.connection(), &duplicate, "2026-01-01T00:00:00.000Z")
                .map_err(FolioError::storage)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FolioError::Storage { .. }));
    assert!(outbox.get(&key).await.unwrap().is_none());

    db.close().await.unwrap();
}

#[tokio::test]
async fn enqueue_failure_discards_domain_row() {
    let (_dir, db, transactor, outbox) = setup().await;
    let fresh = author("Octavia");
    let id = fresh.id.clone();

    let store = outbox.clone();
    let result = transactor
        .with_tx(move |uow| {
            authors::insert(uow.connection(), &fresh, "2026-01-01T00:00:00.000Z")
                .map_err(FolioError::storage)?;
            store.enqueue_in(uow, "author_x", OutboxKind::Author, b"{}")?;
            Err::<(), _>(FolioError::Serialization {
                source: "payload could not be encoded".into(),
            })
        })
        .await;
    assert!(result.is_err());
    assert!(!author_exists(&db, &id).await);
    assert!(outbox.get("author_x").await.unwrap().is_none());

    db.close().await.unwrap();
}

#[tokio::test]
async fn committed_unit_is_visible_to_the_dispatcher_side() {
    let (_dir, db, transactor, outbox) = setup().await;
    let fresh = author("Iain");
    let id = fresh.id.clone();
    let key = idempotency_key(OutboxKind::Author, &id);
    let payload = serde_json::to_vec(&fresh).unwrap();

    let store = outbox.clone();
    let key_in_tx = key.clone();
    transactor
        .with_tx(move |uow| {
            authors::insert(uow.connection(), &fresh, "2026-01-01T00:00:00.000Z")
                .map_err(FolioError::storage)?;
            store.enqueue_in(uow, &key_in_tx, OutboxKind::Author, &payload)
        })
        .await
        .unwrap();

    assert!(author_exists(&db, &id).await);
    let claimed = outbox
        .claim_batch(10, std::time::Duration::from_secs(30))
        .await
        .unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].idempotency_key, key);
    let decoded: Author = serde_json::from_slice(&claimed[0].raw_data).unwrap();
    assert_eq!(decoded.name, "Iain");

    db.close().await.unwrap();
}
