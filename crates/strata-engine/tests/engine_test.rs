//! End-to-end engine tests over the in-memory store.
//!
//! Everything here runs hermetically; no database required.

use std::sync::Arc;

use chrono::{Duration, Utc};

use strata_core::{
    new_v7, ContextStrategy, ExtractiveSummarizer, MemoryTier, SourceKind, VisibilityLayer,
};
use strata_db::MemStore;
use strata_engine::{
    CompressionPolicy, ContextRequest, EngineConfig, IndexRequest, InjectContextRequest,
    MemoryEngine, SearchRequest, StoreExtractRequest,
};

fn engine_over(store: &MemStore) -> MemoryEngine {
    MemoryEngine::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(ExtractiveSummarizer),
        EngineConfig::default(),
    )
}

// ─── Indexing & retrieval ──────────────────────────────────────────────────

#[tokio::test]
async fn test_index_retrieve_round_trip() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let text = "The morning shift went smoothly. We completed the reactor checks. Everyone left on time.";

    let outcome = engine
        .index(IndexRequest::new(new_v7(), SourceKind::DiaryEntry, text))
        .await
        .unwrap();
    assert_eq!(outcome.chunk_count, 1);

    let retrieved = engine.retrieve(outcome.document_id).await.unwrap().unwrap();
    // Single chunk: content is the sentences re-joined with single spaces.
    assert_eq!(retrieved.full_content, text);
    assert_eq!(retrieved.token_count, retrieved.chunks[0].content_tokens);
}

#[tokio::test]
async fn test_chunk_positions_are_contiguous() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let sentence = "Every sentence in this block is padded to roughly one hundred characters to force chunk splits. ";
    let mut req = IndexRequest::new(new_v7(), SourceKind::Thought, sentence.repeat(12));
    req.chunk_size_tokens = Some(50);

    let outcome = engine.index(req).await.unwrap();
    assert!(outcome.chunk_count > 1);

    let chunks = store.chunks_of(outcome.document_id);
    assert_eq!(chunks.len(), outcome.chunk_count);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.position, i as i32);
    }
}

#[tokio::test]
async fn test_three_sentence_diary_entry_counts() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    // ~120 characters across three sentences.
    let text = "Fixed the broken deploy script today. Tests pass again on the main branch. Tomorrow we tackle the cache layer.";
    assert!((100..=130).contains(&text.len()));

    let outcome = engine
        .index(IndexRequest::new(new_v7(), SourceKind::DiaryEntry, text))
        .await
        .unwrap();

    assert_eq!(outcome.chunk_count, 1);
    assert!((25..=35).contains(&outcome.total_tokens));
}

#[tokio::test]
async fn test_index_degenerate_input_falls_back_to_raw_chunk() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    // Too short for the segmenter; still must produce one chunk.
    let outcome = engine
        .index(IndexRequest::new(new_v7(), SourceKind::Manual, "ok then"))
        .await
        .unwrap();

    assert_eq!(outcome.chunk_count, 1);
    let chunks = store.chunks_of(outcome.document_id);
    assert_eq!(chunks[0].content, "ok then");
}

#[tokio::test]
async fn test_index_sets_content_hash_and_hot_tier() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let outcome = engine
        .index(IndexRequest::new(
            new_v7(),
            SourceKind::Handoff,
            "Handing off the long-running migration task to the night crew.",
        ))
        .await
        .unwrap();

    let doc = store.document(outcome.document_id).unwrap();
    assert_eq!(doc.tier, MemoryTier::Hot);
    assert!(doc.content_hash.starts_with("sha256:"));
    assert_eq!(doc.access_count, 0);
}

#[tokio::test]
async fn test_index_partial_chunk_failure_propagates() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    store.fail_chunk_inserts_after(0);

    let result = engine
        .index(IndexRequest::new(
            new_v7(),
            SourceKind::DiaryEntry,
            "This document will not make it past the header insert stage.",
        ))
        .await;

    assert!(result.is_err());
    // Header exists, chunks do not: the documented partial-persistence state.
    let stats = engine_over(&store).stats(None).await.unwrap();
    assert_eq!(stats.total_docs, 1);
    assert_eq!(stats.total_chunks, 0);
}

#[tokio::test]
async fn test_retrieve_unknown_id_is_none() {
    let engine = engine_over(&MemStore::new());
    assert!(engine.retrieve(new_v7()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_retrieve_updates_access_telemetry() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let outcome = engine
        .index(IndexRequest::new(
            new_v7(),
            SourceKind::Thought,
            "A single retrievable thought about access counting semantics.",
        ))
        .await
        .unwrap();

    engine.retrieve(outcome.document_id).await.unwrap();
    engine.retrieve(outcome.document_id).await.unwrap();

    let doc = store.document(outcome.document_id).unwrap();
    assert_eq!(doc.access_count, 2);
    assert!(doc.last_accessed_at.is_some());
}

// ─── Search ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_scores_distinct_terms() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let agent = new_v7();

    // Single-sentence documents keep their summaries verbatim, so the
    // summaries are fully controlled here.
    engine
        .index(IndexRequest::new(
            agent,
            SourceKind::TaskComplete,
            "Deploy scripts now provision staging infrastructure automatically.",
        ))
        .await
        .unwrap();
    engine
        .index(IndexRequest::new(
            agent,
            SourceKind::TaskComplete,
            "Deploy scripts were linted and reformatted for readability.",
        ))
        .await
        .unwrap();

    let hits = engine
        .search(SearchRequest::new("deploy infrastructure"))
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].score, 2);
    assert_eq!(hits[1].score, 1);
    assert!(hits[0].summary.contains("infrastructure"));
}

#[tokio::test]
async fn test_search_empty_query_returns_empty() {
    let engine = engine_over(&MemStore::new());
    assert!(engine.search(SearchRequest::new("")).await.unwrap().is_empty());
    // All tokens too short to be usable terms.
    assert!(engine.search(SearchRequest::new("a to of")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_scopes_to_agent() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let alice = new_v7();
    let bob = new_v7();

    engine
        .index(IndexRequest::new(
            alice,
            SourceKind::DiaryEntry,
            "Calibrated the telescope mount before the observation window.",
        ))
        .await
        .unwrap();
    engine
        .index(IndexRequest::new(
            bob,
            SourceKind::DiaryEntry,
            "Borrowed the telescope for an unrelated maintenance check.",
        ))
        .await
        .unwrap();

    let mut req = SearchRequest::new("telescope");
    req.agent_id = Some(alice);
    let hits = engine.search(req).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].summary.contains("Calibrated"));
}

// ─── Context assembly ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_context_budget_invariant() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let agent = new_v7();

    engine
        .inject_context(InjectContextRequest {
            agent_id: agent,
            context_type: "directive".into(),
            content: "Always double-check coolant pressure before opening valves.".into(),
            supersedes: None,
            source_extract_id: None,
        })
        .await
        .unwrap();
    engine
        .index(IndexRequest::new(
            agent,
            SourceKind::DiaryEntry,
            "Coolant pressure dipped briefly during the valve inspection.",
        ))
        .await
        .unwrap();

    for budget in [0usize, 1, 5, 20, 50, 200, 5000] {
        let assembled = engine
            .get_context(ContextRequest::new(agent, "coolant pressure", budget))
            .await
            .unwrap();
        assert!(
            assembled.tokens_used <= budget,
            "budget {budget} exceeded: used {}",
            assembled.tokens_used
        );
    }
}

#[tokio::test]
async fn test_injection_reservation_can_exclude_everything() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let agent = new_v7();

    // Three injections, each costing ~20 tokens once formatted. With a
    // budget of 50 the injection stage caps at 15 tokens, so none fit.
    for i in 0..3 {
        engine
            .inject_context(InjectContextRequest {
                agent_id: agent,
                context_type: format!("rule_{i}"),
                content: "Keep the airlock sealed whenever the outer sensors report dust."
                    .into(),
                supersedes: None,
                source_extract_id: None,
            })
            .await
            .unwrap();
    }

    let assembled = engine
        .get_context(ContextRequest::new(agent, "anything relevant", 50))
        .await
        .unwrap();

    assert!(!assembled.context.contains("airlock"));
    assert!(assembled.tokens_used <= 15);
}

#[tokio::test]
async fn test_context_escalates_to_full_retrieval() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let agent = new_v7();

    engine
        .index(IndexRequest::new(
            agent,
            SourceKind::Anomaly,
            "Vibration anomaly detected near the intake manifold housing.",
        ))
        .await
        .unwrap();

    let assembled = engine
        .get_context(ContextRequest::new(agent, "vibration anomaly", 10_000))
        .await
        .unwrap();

    assert_eq!(assembled.strategy, ContextStrategy::FullRetrieval);
    assert!(assembled.context.contains("=== anomaly (full) ==="));
    assert!(assembled.context.contains("intake manifold"));
    assert_eq!(assembled.docs_accessed, 1);
}

#[tokio::test]
async fn test_context_summaries_only_when_budget_is_tight() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let agent = new_v7();

    engine
        .index(IndexRequest::new(
            agent,
            SourceKind::DiaryEntry,
            "Greenhouse sensors recalibrated after the humidity drift event.",
        ))
        .await
        .unwrap();

    // The ~20-token summary fits under the 70% line (21 tokens) and pushes
    // usage past the 50% escalation floor (15 tokens), so no escalation is
    // attempted.
    let assembled = engine
        .get_context(ContextRequest::new(agent, "greenhouse humidity", 30))
        .await
        .unwrap();

    assert_eq!(assembled.strategy, ContextStrategy::SummariesOnly);
    assert!(assembled.context.contains("Greenhouse"));
    assert!(!assembled.context.contains("(full)"));
}

#[tokio::test]
async fn test_context_include_shared_admits_other_agents_shared_docs() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let alice = new_v7();
    let bob = new_v7();

    let mut handoff = IndexRequest::new(
        bob,
        SourceKind::Handoff,
        "Shared handoff covering the reactor maintenance schedule.",
    );
    handoff.visibility = VisibilityLayer::Shared;
    engine.index(handoff).await.unwrap();

    // Bob's private documents stay invisible to alice either way.
    engine
        .index(IndexRequest::new(
            bob,
            SourceKind::DiaryEntry,
            "Private note about the reactor inspection rota.",
        ))
        .await
        .unwrap();

    let widened = engine
        .get_context(ContextRequest::new(alice, "reactor maintenance", 10_000))
        .await
        .unwrap();
    assert!(widened.context.contains("maintenance schedule"));
    assert!(!widened.context.contains("inspection rota"));
    assert_eq!(widened.docs_accessed, 1);

    let mut scoped = ContextRequest::new(alice, "reactor maintenance", 10_000);
    scoped.include_shared = false;
    let narrowed = engine.get_context(scoped).await.unwrap();
    assert!(!narrowed.context.contains("maintenance schedule"));
    assert_eq!(narrowed.docs_accessed, 0);
}

// ─── Injections & extracts ─────────────────────────────────────────────────

#[tokio::test]
async fn test_inject_context_supersede_deactivates_prior() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let agent = new_v7();

    let first = engine
        .inject_context(InjectContextRequest {
            agent_id: agent,
            context_type: "mission".into(),
            content: "Survey the northern ridge.".into(),
            supersedes: None,
            source_extract_id: None,
        })
        .await
        .unwrap();

    let second = engine
        .inject_context(InjectContextRequest {
            agent_id: agent,
            context_type: "mission".into(),
            content: "Survey the southern basin instead.".into(),
            supersedes: Some(first.id),
            source_extract_id: None,
        })
        .await
        .unwrap();

    let assembled = engine
        .get_context(ContextRequest::new(agent, "irrelevant", 1000))
        .await
        .unwrap();
    assert!(assembled.context.contains("southern basin"));
    assert!(!assembled.context.contains("northern ridge"));

    let stats = engine.stats(Some(agent)).await.unwrap();
    assert_eq!(stats.active_context_entries, 1);
    assert_eq!(second.supersedes, Some(first.id));
}

#[tokio::test]
async fn test_store_and_list_extracts_newest_first() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let agent = new_v7();

    for label in ["first", "second", "third"] {
        engine
            .store_extract(StoreExtractRequest {
                agent_id: agent,
                source_document_id: None,
                extract_type: "lesson".into(),
                content: serde_json::json!({ "label": label }),
                summary: format!("{label} lesson"),
                domains: vec!["ops".into()],
                channels: vec![],
                priority: Default::default(),
                reusability: 0.7,
                action_required: false,
            })
            .await
            .unwrap();
    }

    let extracts = engine.list_extracts(agent, 2).await.unwrap();
    assert_eq!(extracts.len(), 2);
    assert_eq!(extracts[0].summary, "third lesson");
    assert_eq!(extracts[1].summary, "second lesson");
}

// ─── Compaction ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_compaction_hot_to_warm_preserves_content() {
    let store = MemStore::new();
    let engine = engine_over(&store);

    let outcome = engine
        .index(IndexRequest::new(
            new_v7(),
            SourceKind::DiaryEntry,
            "Ran the full diagnostics suite today. Two sensors needed swapping. The spares cabinet is now empty.",
        ))
        .await
        .unwrap();
    let before = store.chunks_of(outcome.document_id);

    // Simulate a chunk indexed without a summary; pass 1 must backfill it.
    store.clear_chunk_summary(before[0].id);
    store.backdate_document(outcome.document_id, Utc::now() - Duration::hours(2));

    let report = engine.compress(CompressionPolicy::default()).await.unwrap();
    assert_eq!(report.hot_to_warm, 1);
    assert_eq!(report.warm_to_cold, 0);
    assert_eq!(report.tokens_reclaimed, 0);

    let doc = store.document(outcome.document_id).unwrap();
    assert_eq!(doc.tier, MemoryTier::Warm);

    let after = store.chunks_of(outcome.document_id);
    for (old, new) in before.iter().zip(after.iter()) {
        assert_eq!(old.content, new.content, "hot→warm must not touch content");
        let summary = new.summary.as_deref().unwrap();
        assert!(!summary.is_empty());
    }
}

#[tokio::test]
async fn test_compaction_warm_to_cold_elides_content() {
    let store = MemStore::new();
    let engine = engine_over(&store);

    let outcome = engine
        .index(IndexRequest::new(
            new_v7(),
            SourceKind::Synthesis,
            "The irrigation experiment concluded this week with clear results. \
             We learned that the drip pattern outperforms flood cycles in every plot. \
             Water consumption dropped by a third across the monitored beds. \
             The next phase will extend the same pattern to the outer greenhouse.",
        ))
        .await
        .unwrap();
    store.backdate_document(outcome.document_id, Utc::now() - Duration::hours(48));

    // Old enough for both passes: hot→warm→cold in one run.
    let report = engine.compress(CompressionPolicy::default()).await.unwrap();
    assert_eq!(report.hot_to_warm, 1);
    assert_eq!(report.warm_to_cold, 1);

    let before = store.chunks_of(outcome.document_id);
    let expected_reclaimed: i64 = {
        // After elision content_tokens == summary_tokens, so reconstruct the
        // expectation from the outcome's aggregate counts.
        outcome.total_tokens - outcome.summary_tokens
    };
    // Reclaimed accounting uses per-chunk content estimates, which can
    // differ from the whole-document estimate by rounding at boundaries.
    assert!((report.tokens_reclaimed - expected_reclaimed).abs() <= 2);

    let doc = store.document(outcome.document_id).unwrap();
    assert_eq!(doc.tier, MemoryTier::Cold);
    for chunk in &before {
        let summary = chunk.summary.as_deref().unwrap();
        assert_eq!(chunk.content, summary, "cold content equals its summary");
        assert_eq!(chunk.content_tokens, chunk.summary_tokens.unwrap());
    }
}

#[tokio::test]
async fn test_compaction_is_idempotent() {
    let store = MemStore::new();
    let engine = engine_over(&store);

    let outcome = engine
        .index(IndexRequest::new(
            new_v7(),
            SourceKind::DiaryEntry,
            "Spent the afternoon reorganizing the toolchain documentation pages.",
        ))
        .await
        .unwrap();
    store.backdate_document(outcome.document_id, Utc::now() - Duration::hours(48));

    let first = engine.compress(CompressionPolicy::default()).await.unwrap();
    assert_eq!(first.hot_to_warm, 1);
    assert_eq!(first.warm_to_cold, 1);

    let second = engine.compress(CompressionPolicy::default()).await.unwrap();
    assert_eq!(second.hot_to_warm, 0);
    assert_eq!(second.warm_to_cold, 0);
    assert_eq!(second.tokens_reclaimed, 0);
}

#[tokio::test]
async fn test_tier_progression_is_monotonic() {
    let store = MemStore::new();
    let engine = engine_over(&store);

    let outcome = engine
        .index(IndexRequest::new(
            new_v7(),
            SourceKind::RoomTransition,
            "Moved operations from the workshop into the main control room.",
        ))
        .await
        .unwrap();

    let mut observed = vec![store.document(outcome.document_id).unwrap().tier];

    store.backdate_document(outcome.document_id, Utc::now() - Duration::hours(2));
    engine.compress(CompressionPolicy::default()).await.unwrap();
    observed.push(store.document(outcome.document_id).unwrap().tier);

    store.backdate_document(outcome.document_id, Utc::now() - Duration::hours(48));
    engine.compress(CompressionPolicy::default()).await.unwrap();
    observed.push(store.document(outcome.document_id).unwrap().tier);

    assert_eq!(
        observed,
        vec![MemoryTier::Hot, MemoryTier::Warm, MemoryTier::Cold]
    );
    let ranks: Vec<u8> = observed.iter().map(|t| t.rank()).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

// ─── Stats ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stats_empty_store() {
    let engine = engine_over(&MemStore::new());
    let stats = engine.stats(None).await.unwrap();
    assert_eq!(stats.total_docs, 0);
    assert_eq!(stats.total_chunks, 0);
    assert_eq!(stats.compression_ratio, 0.0);
}

#[tokio::test]
async fn test_stats_aggregates_per_agent() {
    let store = MemStore::new();
    let engine = engine_over(&store);
    let alice = new_v7();
    let bob = new_v7();

    engine
        .index(IndexRequest::new(
            alice,
            SourceKind::DiaryEntry,
            "Alice wrote down the greenhouse watering schedule for the week.",
        ))
        .await
        .unwrap();
    engine
        .index(IndexRequest::new(
            bob,
            SourceKind::DiaryEntry,
            "Bob catalogued the spare parts left over from the last repair.",
        ))
        .await
        .unwrap();

    let all = engine.stats(None).await.unwrap();
    assert_eq!(all.total_docs, 2);
    assert_eq!(all.by_tier.hot, 2);

    let alice_only = engine.stats(Some(alice)).await.unwrap();
    assert_eq!(alice_only.total_docs, 1);
    assert_eq!(alice_only.total_chunks, 1);
    assert!(alice_only.compression_ratio > 0.0);
    assert!(alice_only.compression_ratio <= 1.0);
}
