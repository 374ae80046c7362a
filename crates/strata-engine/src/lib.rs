//! # strata-engine
//!
//! Tiered agent memory engine: ingestion with eager summarization, keyword
//! search over summaries, budgeted context assembly with staged escalation,
//! and age-driven hot/warm/cold compaction.
//!
//! The engine is a library consumed in-process. Construct one
//! [`MemoryEngine`] at startup with repositories and a summarizer injected:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_core::ExtractiveSummarizer;
//! use strata_db::Database;
//! use strata_engine::{EngineConfig, MemoryEngine};
//!
//! let db = Database::connect("postgres://localhost/strata").await?;
//! let engine = MemoryEngine::new(
//!     Arc::new(db.documents.clone()),
//!     Arc::new(db.chunks.clone()),
//!     Arc::new(db.extracts.clone()),
//!     Arc::new(db.injections.clone()),
//!     Arc::new(ExtractiveSummarizer),
//!     EngineConfig::default(),
//! );
//! ```

pub mod compress;
pub mod config;
pub mod context;
pub mod engine;
pub mod requests;
pub mod search;

pub use config::{CompressionPolicy, EngineConfig};
pub use engine::MemoryEngine;
pub use requests::{
    ContextRequest, IndexOutcome, IndexRequest, InjectContextRequest, SearchRequest,
    StoreExtractRequest,
};

// Re-export core types callers need alongside the engine.
pub use strata_core::{
    AssembledContext, CompressionReport, ContextStrategy, MemoryStats, SearchHit, Summarizer,
};
