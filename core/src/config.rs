use serde::{Deserialize, Serialize};

pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;
pub const RELEVANCE_EPSILON: f64 = 1e-6;
pub const DEFAULT_BUCKET_COUNT: usize = 100;

/// Tunables for ranking and parallel aggregation.
///
/// Deserializes from partial JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Result cap applied after ranking.
    pub max_results: usize,
    /// Relevance values closer than this are ranked by rating instead.
    pub relevance_epsilon: f64,
    /// Shard count of the accumulator used by parallel queries.
    pub bucket_count: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULT_DOCUMENT_COUNT,
            relevance_epsilon: RELEVANCE_EPSILON,
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}
