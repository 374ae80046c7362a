//! The memory engine service object.
//!
//! One instance is constructed at process start with its repositories and
//! summarizer injected; every operation may run concurrently with any other.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use strata_core::{
    estimate_tokens, new_v7, segment, signals, ChunkRepository, ContextInjection,
    DocumentRepository, ExtractRepository, InjectionRepository, MemoryChunk, MemoryDocument,
    MemoryExtract, MemoryStats, MemoryTier, Result, RetrievedDocument, Summarizer,
};

use crate::config::EngineConfig;
use crate::requests::{IndexOutcome, IndexRequest, InjectContextRequest, StoreExtractRequest};

/// Tiered agent memory engine.
pub struct MemoryEngine {
    pub(crate) documents: Arc<dyn DocumentRepository>,
    pub(crate) chunks: Arc<dyn ChunkRepository>,
    pub(crate) extracts: Arc<dyn ExtractRepository>,
    pub(crate) injections: Arc<dyn InjectionRepository>,
    pub(crate) summarizer: Arc<dyn Summarizer>,
    pub(crate) config: EngineConfig,
}

impl MemoryEngine {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        chunks: Arc<dyn ChunkRepository>,
        extracts: Arc<dyn ExtractRepository>,
        injections: Arc<dyn InjectionRepository>,
        summarizer: Arc<dyn Summarizer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            documents,
            chunks,
            extracts,
            injections,
            summarizer,
            config,
        }
    }

    /// Ingest one artifact: create the document header, then its chunks in
    /// position order, each with an eagerly generated summary.
    ///
    /// If a chunk write fails after the header exists, the error propagates
    /// and the document is left with a partial chunk sequence; a periodic
    /// verification job is expected to detect documents with missing chunks.
    pub async fn index(&self, req: IndexRequest) -> Result<IndexOutcome> {
        let start = Instant::now();
        let chunk_size = req.chunk_size_tokens.unwrap_or(self.config.chunk_size_tokens);
        let total_tokens = estimate_tokens(&req.content) as i64;

        let document = MemoryDocument {
            id: new_v7(),
            agent_id: req.agent_id,
            source: req.source,
            path: req.path.clone(),
            tier: MemoryTier::Hot,
            visibility: req.visibility,
            total_tokens,
            content_hash: content_hash(&req.content),
            access_count: 0,
            last_accessed_at: None,
            created_at_utc: Utc::now(),
        };
        self.documents.insert(&document).await?;

        let chunk_texts = pack_chunks(&req.content, chunk_size);
        let mut summary_tokens_total: i64 = 0;

        for (position, text) in chunk_texts.iter().enumerate() {
            let summary = self
                .summarizer
                .summarize(text, self.config.summary_max_tokens)
                .await?;
            let summary_tokens = estimate_tokens(&summary) as i64;
            summary_tokens_total += summary_tokens;

            let chunk = MemoryChunk {
                id: new_v7(),
                document_id: document.id,
                visibility: req.visibility,
                position: position as i32,
                content: text.clone(),
                summary: Some(summary),
                tags: signals::tags(text, self.config.chunk_tags),
                keywords: signals::keywords(text, self.config.chunk_keywords),
                content_tokens: estimate_tokens(text) as i64,
                summary_tokens: Some(summary_tokens),
                created_at_utc: Utc::now(),
            };
            trace!(
                subsystem = "engine",
                component = "indexer",
                document_id = %document.id,
                position = chunk.position,
                content_tokens = chunk.content_tokens,
                "Persisting chunk"
            );
            self.chunks.insert(&chunk).await?;
        }

        info!(
            subsystem = "engine",
            component = "indexer",
            op = "index",
            document_id = %document.id,
            agent_id = %req.agent_id,
            source = %req.source,
            chunk_count = chunk_texts.len(),
            total_tokens,
            duration_ms = start.elapsed().as_millis() as u64,
            "Indexed document"
        );

        Ok(IndexOutcome {
            document_id: document.id,
            chunk_count: chunk_texts.len(),
            total_tokens,
            summary_tokens: summary_tokens_total,
        })
    }

    /// Load a document with its full chunk sequence, recording the access.
    ///
    /// Returns `Ok(None)` for unknown ids; callers branch on this routinely.
    pub async fn retrieve(&self, document_id: Uuid) -> Result<Option<RetrievedDocument>> {
        let Some(document) = self.documents.get(document_id).await? else {
            debug!(
                subsystem = "engine",
                component = "retriever",
                op = "retrieve",
                document_id = %document_id,
                "Document not found"
            );
            return Ok(None);
        };

        let chunks = self.chunks.list_for_document(document_id).await?;
        let full_content = chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let token_count: i64 = chunks.iter().map(|c| c.content_tokens).sum();

        self.documents.touch_access(document_id).await?;

        debug!(
            subsystem = "engine",
            component = "retriever",
            op = "retrieve",
            document_id = %document_id,
            tier = %document.tier,
            chunk_count = chunks.len(),
            "Retrieved document"
        );

        Ok(Some(RetrievedDocument {
            document,
            chunks,
            full_content,
            token_count,
        }))
    }

    /// Register a standing injection, deactivating the superseded one first.
    pub async fn inject_context(&self, req: InjectContextRequest) -> Result<ContextInjection> {
        if let Some(prior) = req.supersedes {
            let deactivated = self.injections.deactivate(prior).await?;
            if !deactivated {
                // Superseding a vanished or already-inactive record is not
                // an error; the new injection still goes in.
                warn!(
                    subsystem = "engine",
                    component = "context",
                    op = "inject_context",
                    agent_id = %req.agent_id,
                    superseded_id = %prior,
                    "Superseded injection was not active"
                );
            }
        }

        let injection = ContextInjection {
            id: new_v7(),
            agent_id: req.agent_id,
            context_type: req.context_type,
            content: req.content,
            active: true,
            supersedes: req.supersedes,
            source_extract_id: req.source_extract_id,
            created_at_utc: Utc::now(),
        };
        self.injections.insert(&injection).await?;

        info!(
            subsystem = "engine",
            component = "context",
            op = "inject_context",
            agent_id = %injection.agent_id,
            injection_id = %injection.id,
            context_type = %injection.context_type,
            "Context injection registered"
        );
        Ok(injection)
    }

    /// Store an externally produced extract. Immutable once stored.
    pub async fn store_extract(&self, req: StoreExtractRequest) -> Result<MemoryExtract> {
        let extract = MemoryExtract {
            id: new_v7(),
            agent_id: req.agent_id,
            source_document_id: req.source_document_id,
            extract_type: req.extract_type,
            content: req.content,
            summary: req.summary,
            domains: req.domains,
            channels: req.channels,
            priority: req.priority,
            reusability: req.reusability,
            action_required: req.action_required,
            created_at_utc: Utc::now(),
        };
        self.extracts.insert(&extract).await?;

        info!(
            subsystem = "engine",
            component = "extracts",
            op = "store_extract",
            agent_id = %extract.agent_id,
            extract_id = %extract.id,
            extract_type = %extract.extract_type,
            "Extract stored"
        );
        Ok(extract)
    }

    /// An agent's stored extracts, newest first.
    pub async fn list_extracts(&self, agent_id: Uuid, limit: i64) -> Result<Vec<MemoryExtract>> {
        self.extracts.list_for_agent(agent_id, limit).await
    }

    /// Read-only aggregation over the store.
    pub async fn stats(&self, agent_id: Option<Uuid>) -> Result<MemoryStats> {
        let by_tier = self.documents.count_by_tier(agent_id).await?;
        let totals = self.chunks.totals(agent_id).await?;
        let total_extracts = self.extracts.count(agent_id).await?;
        let active_context_entries = self.injections.count_active(agent_id).await?;

        let compression_ratio = if totals.content_tokens > 0 {
            totals.summary_tokens as f64 / totals.content_tokens as f64
        } else {
            0.0
        };

        Ok(MemoryStats {
            total_docs: by_tier.total(),
            by_tier,
            total_chunks: totals.chunks,
            total_extracts,
            total_tokens_stored: totals.content_tokens,
            total_summary_tokens: totals.summary_tokens,
            compression_ratio,
            active_context_entries,
        })
    }
}

/// SHA-256 of the original content, `sha256:` prefixed.
pub(crate) fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("sha256:{}", hex::encode(digest))
}

/// Greedily pack sentences into chunks of at most `chunk_size` estimated
/// tokens. A chunk always holds at least one sentence, even when that
/// sentence alone exceeds the cap; degenerate input falls back to a single
/// chunk carrying the raw content so no document ends up chunkless.
pub(crate) fn pack_chunks(content: &str, chunk_size: usize) -> Vec<String> {
    let sentences = segment(content);
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        if current.is_empty() {
            current = sentence;
            continue;
        }
        let candidate_tokens = estimate_tokens(&current) + estimate_tokens(&sentence) + 1;
        if candidate_tokens > chunk_size {
            chunks.push(std::mem::take(&mut current));
            current = sentence;
        } else {
            current.push(' ');
            current.push_str(&sentence);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    if chunks.is_empty() {
        chunks.push(content.to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_prefixed_and_stable() {
        let a = content_hash("hello world");
        let b = content_hash("hello world");
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
        assert_eq!(a.len(), "sha256:".len() + 64);
    }

    #[test]
    fn test_pack_chunks_single_chunk_for_short_text() {
        let text = "The reactor hummed along nicely. Output held steady all shift. Nothing unusual to report today.";
        let chunks = pack_chunks(text, 500);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_pack_chunks_splits_at_cap() {
        // Each sentence is ~25 estimated tokens; a 30-token cap forces one
        // sentence per chunk.
        let sentence = "This sentence is deliberately padded out to around one hundred characters so it estimates high. ";
        let text = sentence.repeat(4);
        let chunks = pack_chunks(&text, 30);
        assert_eq!(chunks.len(), 4);
    }

    #[test]
    fn test_pack_chunks_never_empty() {
        let chunks = pack_chunks("short", 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], "short");
    }

    #[test]
    fn test_pack_chunks_oversized_sentence_kept_whole() {
        let long = format!("{} end of the line.", "word ".repeat(300));
        let chunks = pack_chunks(&long, 10);
        // The giant sentence exceeds the cap on its own but still lands in
        // exactly one chunk.
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }
    }
}
