//! PostgreSQL repository integration tests.
//!
//! These talk to a live database and are ignored by default. Run with:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/strata_test cargo test -p strata-db -- --ignored
//! ```

use chrono::Utc;
use uuid::Uuid;

use strata_db::{
    ChunkRepository, ContextInjection, Database, DocumentRepository, InjectionRepository,
    MemoryChunk, MemoryDocument, MemoryTier, SourceKind, VisibilityLayer,
};

async fn connect() -> Database {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/strata_test".to_string());
    Database::connect(&url).await.expect("database connection")
}

fn test_document(agent_id: Uuid) -> MemoryDocument {
    MemoryDocument {
        id: strata_db::new_v7(),
        agent_id,
        source: SourceKind::Manual,
        path: None,
        tier: MemoryTier::Hot,
        visibility: VisibilityLayer::Private,
        total_tokens: 12,
        content_hash: "sha256:0000".to_string(),
        access_count: 0,
        last_accessed_at: None,
        created_at_utc: Utc::now(),
    }
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_document_insert_get_roundtrip() {
    let db = connect().await;
    let doc = test_document(strata_db::new_v7());

    db.documents.insert(&doc).await.unwrap();
    let fetched = db.documents.get(doc.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, doc.id);
    assert_eq!(fetched.tier, MemoryTier::Hot);
    assert_eq!(fetched.content_hash, doc.content_hash);
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_tier_cas_guard() {
    let db = connect().await;
    let doc = test_document(strata_db::new_v7());
    db.documents.insert(&doc).await.unwrap();

    assert!(db
        .documents
        .set_tier_if(doc.id, MemoryTier::Hot, MemoryTier::Warm)
        .await
        .unwrap());
    assert!(!db
        .documents
        .set_tier_if(doc.id, MemoryTier::Hot, MemoryTier::Warm)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_chunk_listing_preserves_position_order() {
    let db = connect().await;
    let doc = test_document(strata_db::new_v7());
    db.documents.insert(&doc).await.unwrap();

    for position in 0..3 {
        let chunk = MemoryChunk {
            id: strata_db::new_v7(),
            document_id: doc.id,
            visibility: VisibilityLayer::Private,
            position,
            content: format!("chunk {position}"),
            summary: Some(format!("summary {position}")),
            tags: vec![],
            keywords: vec![],
            content_tokens: 3,
            summary_tokens: Some(3),
            created_at_utc: Utc::now(),
        };
        db.chunks.insert(&chunk).await.unwrap();
    }

    let chunks = db.chunks.list_for_document(doc.id).await.unwrap();
    let positions: Vec<i32> = chunks.iter().map(|c| c.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
#[ignore] // Requires database connection
async fn test_injection_deactivate() {
    let db = connect().await;
    let injection = ContextInjection {
        id: strata_db::new_v7(),
        agent_id: strata_db::new_v7(),
        context_type: "directive".to_string(),
        content: "integration test directive".to_string(),
        active: true,
        supersedes: None,
        source_extract_id: None,
        created_at_utc: Utc::now(),
    };
    db.injections.insert(&injection).await.unwrap();

    assert!(db.injections.deactivate(injection.id).await.unwrap());
    assert!(!db.injections.deactivate(injection.id).await.unwrap());
}
