//! # strata-core
//!
//! Core types, traits, and text analysis for the strata memory engine.
//!
//! This crate provides the domain models, the storage-boundary repository
//! traits, and the pure text pipeline (token estimation, sentence
//! segmentation, keyword/tag extraction, extractive summarization) that the
//! other strata crates build on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod segment;
pub mod signals;
pub mod summarize;
pub mod tokens;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use segment::segment;
pub use signals::{keywords, tags};
pub use summarize::{ExtractiveSummarizer, Summarizer};
pub use tokens::{estimate_tokens, fits_within};
pub use traits::*;
pub use uuid_utils::new_v7;
