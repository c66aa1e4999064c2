//! In-memory full-text search engine with TF-IDF ranking.
//!
//! Documents are indexed into an inverted index; queries are ranked either on
//! the calling thread or across the rayon pool, with identical results.

pub mod batch;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod index;
pub mod ranking;
pub mod relevance;
pub mod server;
pub mod tokenizer;

use serde::Serialize;

pub use batch::{process_queries, process_queries_joined};
pub use config::SearchConfig;
pub use error::{Error, Result};
pub use index::{DocId, DocumentStatus, Term};
pub use server::{MatchedDocument, SearchServer};

/// One ranked search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

/// How a query or removal is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    /// Everything on the calling thread.
    #[default]
    Sequential,
    /// Per-term work fanned out over the rayon pool.
    Parallel,
}
