//! In-memory store for deterministic testing.
//!
//! Implements every repository trait over plain collections so the engine
//! can be exercised without Postgres. Matching/ordering semantics mirror
//! the SQL implementations: candidate search is a case-insensitive OR-match
//! over summaries and keyword sets, ordered by document recency.
//!
//! Always compiled (not `#[cfg(test)]`) so downstream crates' integration
//! tests can use it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use strata_core::{
    ChunkCandidate, ChunkRepository, ChunkTotals, ContextInjection, DocumentRepository, Error,
    ExtractRepository, InjectionRepository, MemoryChunk, MemoryDocument, MemoryExtract,
    MemoryTier, Result, SearchFilter, TierCounts,
};

#[derive(Default)]
struct MemState {
    documents: HashMap<Uuid, MemoryDocument>,
    chunks: Vec<MemoryChunk>,
    extracts: Vec<MemoryExtract>,
    injections: Vec<ContextInjection>,
    /// When set, chunk inserts fail once this many chunks exist.
    chunk_insert_cap: Option<usize>,
}

/// Shared in-memory store implementing all strata repository traits.
#[derive(Clone, Default)]
pub struct MemStore {
    state: Arc<Mutex<MemState>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make chunk inserts fail once `cap` chunks are stored. Used to test
    /// the partial-persistence path of indexing.
    pub fn fail_chunk_inserts_after(&self, cap: usize) {
        self.state.lock().unwrap().chunk_insert_cap = Some(cap);
    }

    /// Backdate a document's creation timestamp so compaction age
    /// thresholds can be tested without sleeping.
    pub fn backdate_document(&self, id: Uuid, created_at: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        if let Some(doc) = state.documents.get_mut(&id) {
            doc.created_at_utc = created_at;
        }
    }

    /// Drop a chunk's summary, simulating a chunk indexed before a
    /// summarizer was available.
    pub fn clear_chunk_summary(&self, chunk_id: Uuid) {
        let mut state = self.state.lock().unwrap();
        if let Some(chunk) = state.chunks.iter_mut().find(|c| c.id == chunk_id) {
            chunk.summary = None;
            chunk.summary_tokens = None;
        }
    }

    /// Snapshot a document header (test assertions).
    pub fn document(&self, id: Uuid) -> Option<MemoryDocument> {
        self.state.lock().unwrap().documents.get(&id).cloned()
    }

    /// Snapshot a document's chunks ordered by position (test assertions).
    pub fn chunks_of(&self, document_id: Uuid) -> Vec<MemoryChunk> {
        let state = self.state.lock().unwrap();
        let mut chunks: Vec<MemoryChunk> = state
            .chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect();
        chunks.sort_by_key(|c| c.position);
        chunks
    }
}

#[async_trait]
impl DocumentRepository for MemStore {
    async fn insert(&self, doc: &MemoryDocument) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.documents.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemoryDocument>> {
        Ok(self.state.lock().unwrap().documents.get(&id).cloned())
    }

    async fn touch_access(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(doc) = state.documents.get_mut(&id) {
            doc.access_count += 1;
            doc.last_accessed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn set_tier_if(&self, id: Uuid, from: MemoryTier, to: MemoryTier) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.documents.get_mut(&id) {
            Some(doc) if doc.tier == from => {
                doc.tier = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_tier_older_than(
        &self,
        tier: MemoryTier,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<MemoryDocument>> {
        let state = self.state.lock().unwrap();
        let mut docs: Vec<MemoryDocument> = state
            .documents
            .values()
            .filter(|d| d.tier == tier && d.created_at_utc < cutoff)
            .cloned()
            .collect();
        docs.sort_by_key(|d| d.created_at_utc);
        Ok(docs)
    }

    async fn count_by_tier(&self, agent_id: Option<Uuid>) -> Result<TierCounts> {
        let state = self.state.lock().unwrap();
        let mut counts = TierCounts::default();
        for doc in state.documents.values() {
            if agent_id.is_some_and(|a| a != doc.agent_id) {
                continue;
            }
            match doc.tier {
                MemoryTier::Hot => counts.hot += 1,
                MemoryTier::Warm => counts.warm += 1,
                MemoryTier::Cold => counts.cold += 1,
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl ChunkRepository for MemStore {
    async fn insert(&self, chunk: &MemoryChunk) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(cap) = state.chunk_insert_cap {
            if state.chunks.len() >= cap {
                return Err(Error::Internal("simulated chunk insert failure".into()));
            }
        }
        state.chunks.push(chunk.clone());
        Ok(())
    }

    async fn list_for_document(&self, document_id: Uuid) -> Result<Vec<MemoryChunk>> {
        Ok(self.chunks_of(document_id))
    }

    async fn set_summary(&self, id: Uuid, summary: &str, summary_tokens: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(chunk) = state.chunks.iter_mut().find(|c| c.id == id) {
            chunk.summary = Some(summary.to_string());
            chunk.summary_tokens = Some(summary_tokens);
        }
        Ok(())
    }

    async fn replace_content(&self, id: Uuid, content: &str, content_tokens: i64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(chunk) = state.chunks.iter_mut().find(|c| c.id == id) {
            chunk.content = content.to_string();
            chunk.content_tokens = content_tokens;
        }
        Ok(())
    }

    async fn search_candidates(
        &self,
        filter: &SearchFilter,
        terms: &[String],
        limit: i64,
    ) -> Result<Vec<ChunkCandidate>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let lowered: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();

        let state = self.state.lock().unwrap();
        let mut candidates: Vec<ChunkCandidate> = state
            .chunks
            .iter()
            .filter_map(|chunk| {
                let summary = chunk.summary.as_deref()?;
                let doc = state.documents.get(&chunk.document_id)?;

                if let Some(agent_id) = filter.agent_id {
                    let owned = doc.agent_id == agent_id;
                    let shared = filter.include_shared
                        && chunk.visibility == strata_core::VisibilityLayer::Shared;
                    if !owned && !shared {
                        return None;
                    }
                }
                if filter.visibility.is_some_and(|v| v != chunk.visibility) {
                    return None;
                }
                if filter.tier.is_some_and(|t| t != doc.tier) {
                    return None;
                }

                let summary_lower = summary.to_lowercase();
                let matched = lowered.iter().any(|term| {
                    summary_lower.contains(term) || chunk.keywords.iter().any(|k| k == term)
                });
                if !matched {
                    return None;
                }

                Some(ChunkCandidate {
                    chunk_id: chunk.id,
                    document_id: chunk.document_id,
                    summary: summary.to_string(),
                    tags: chunk.tags.clone(),
                    keywords: chunk.keywords.clone(),
                    tier: doc.tier,
                    source: doc.source,
                    document_created_at: doc.created_at_utc,
                })
            })
            .collect();

        candidates.sort_by(|a, b| b.document_created_at.cmp(&a.document_created_at));
        candidates.truncate(limit.max(0) as usize);
        Ok(candidates)
    }

    async fn totals(&self, agent_id: Option<Uuid>) -> Result<ChunkTotals> {
        let state = self.state.lock().unwrap();
        let mut totals = ChunkTotals::default();
        for chunk in &state.chunks {
            if let Some(agent_id) = agent_id {
                match state.documents.get(&chunk.document_id) {
                    Some(doc) if doc.agent_id == agent_id => {}
                    _ => continue,
                }
            }
            totals.chunks += 1;
            totals.content_tokens += chunk.content_tokens;
            totals.summary_tokens += chunk.summary_tokens.unwrap_or(0);
        }
        Ok(totals)
    }
}

#[async_trait]
impl ExtractRepository for MemStore {
    async fn insert(&self, extract: &MemoryExtract) -> Result<()> {
        self.state.lock().unwrap().extracts.push(extract.clone());
        Ok(())
    }

    async fn list_for_agent(&self, agent_id: Uuid, limit: i64) -> Result<Vec<MemoryExtract>> {
        let state = self.state.lock().unwrap();
        let mut extracts: Vec<MemoryExtract> = state
            .extracts
            .iter()
            .filter(|e| e.agent_id == agent_id)
            .cloned()
            .collect();
        extracts.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc));
        extracts.truncate(limit.max(0) as usize);
        Ok(extracts)
    }

    async fn count(&self, agent_id: Option<Uuid>) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .extracts
            .iter()
            .filter(|e| agent_id.is_none_or(|a| a == e.agent_id))
            .count() as i64)
    }
}

#[async_trait]
impl InjectionRepository for MemStore {
    async fn insert(&self, injection: &ContextInjection) -> Result<()> {
        self.state.lock().unwrap().injections.push(injection.clone());
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.injections.iter_mut().find(|i| i.id == id && i.active) {
            Some(injection) => {
                injection.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_active(&self, agent_id: Uuid) -> Result<Vec<ContextInjection>> {
        let state = self.state.lock().unwrap();
        let mut active: Vec<ContextInjection> = state
            .injections
            .iter()
            .filter(|i| i.agent_id == agent_id && i.active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc));
        Ok(active)
    }

    async fn count_active(&self, agent_id: Option<Uuid>) -> Result<i64> {
        let state = self.state.lock().unwrap();
        Ok(state
            .injections
            .iter()
            .filter(|i| i.active && agent_id.is_none_or(|a| a == i.agent_id))
            .count() as i64)
    }
}
