use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::index::{DocId, DocumentStatus, InvertedIndex, Term};
use crate::ranking::rank;
use crate::relevance::find_all_documents;
use crate::tokenizer::{parse_query, ParseMode, StopWords};
use crate::{Document, ExecutionPolicy};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Plus-terms of a query found in one document, or none if a minus-term hit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedDocument {
    pub terms: Vec<Term>,
    pub status: DocumentStatus,
}

/// Thread-safe search engine.
///
/// The index is shared copy-on-write. A query clones the current `Arc` under
/// the read lock and releases it before doing any work, so it always scores
/// one whole index version. Writers mutate under the write lock, cloning the
/// index first if a query still holds the old version.
///
/// No lock is held while work runs on the rayon pool. Parallel removal erases
/// the id from copied posting lists outside the lock and commits them only if
/// no other write landed in between.
pub struct SearchServer {
    stop_words: StopWords,
    config: SearchConfig,
    index: RwLock<Arc<InvertedIndex>>,
}

impl SearchServer {
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(stop_words, SearchConfig::default())
    }

    pub fn with_config<I, S>(stop_words: I, config: SearchConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::from_parts(StopWords::new(stop_words)?, config))
    }

    /// Stop words given as one space-delimited string.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Ok(Self::from_parts(StopWords::from_text(text)?, SearchConfig::default()))
    }

    pub fn from_parts(stop_words: StopWords, config: SearchConfig) -> Self {
        Self { stop_words, config, index: RwLock::new(Arc::new(InvertedIndex::new())) }
    }

    /// The current index version.
    fn snapshot(&self) -> Arc<InvertedIndex> {
        Arc::clone(&self.index.read())
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn add_document(&self, id: DocId, text: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        let mut index = self.index.write();
        Arc::make_mut(&mut index).add_document(id, text, status, ratings, &self.stop_words)
    }

    /// Top documents with status `Actual`, computed sequentially.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, DocumentStatus::Actual)
    }

    /// Top documents with status `Actual`, computed on the rayon pool.
    pub fn par_find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionPolicy::Parallel, raw_query, |_, status, _| {
            status == DocumentStatus::Actual
        })
    }

    pub fn find_top_documents_by_status(&self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, move |_, doc_status, _| {
            doc_status == status
        })
    }

    pub fn par_find_top_documents_by_status(&self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionPolicy::Parallel, raw_query, move |_, doc_status, _| {
            doc_status == status
        })
    }

    pub fn find_top_documents_with<P>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        predicate: P,
    ) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let query = parse_query(raw_query, &self.stop_words, ParseMode::Deduplicated)?;
        let index = self.snapshot();
        let matched = find_all_documents(&index, &query, policy, self.config.bucket_count, &predicate);
        Ok(rank(matched, policy, &self.config))
    }

    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<MatchedDocument> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, id)
    }

    pub fn match_document_with(&self, policy: ExecutionPolicy, raw_query: &str, id: DocId) -> Result<MatchedDocument> {
        let snapshot = self.snapshot();
        let index: &InvertedIndex = &snapshot;
        let status = index
            .document(id)
            .map(|data| data.status)
            .ok_or_else(|| Error::out_of_range(format!("document {id} not found")))?;

        let hit = |word: &str| -> Option<Term> {
            index
                .posting_entry(word)
                .filter(|(_, docs)| docs.contains_key(&id))
                .map(|(term, _)| Arc::clone(term))
        };

        let terms = match policy {
            ExecutionPolicy::Sequential => {
                let query = parse_query(raw_query, &self.stop_words, ParseMode::Deduplicated)?;
                if query.minus_words.iter().any(|word| hit(*word).is_some()) {
                    Vec::new()
                } else {
                    query.plus_words.iter().filter_map(|word| hit(*word)).collect()
                }
            }
            ExecutionPolicy::Parallel => {
                let query = parse_query(raw_query, &self.stop_words, ParseMode::Raw)?;
                if query.minus_words.par_iter().any(|word| hit(*word).is_some()) {
                    Vec::new()
                } else {
                    let mut terms: Vec<Term> = query.plus_words.par_iter().filter_map(|word| hit(*word)).collect();
                    terms.sort_unstable();
                    terms.dedup();
                    terms
                }
            }
        };
        Ok(MatchedDocument { terms, status })
    }

    /// Removes `id` from the index; unknown ids are ignored.
    pub fn remove_document(&self, id: DocId) {
        self.remove_document_with(ExecutionPolicy::Sequential, id);
    }

    pub fn remove_document_with(&self, policy: ExecutionPolicy, id: DocId) {
        match policy {
            ExecutionPolicy::Sequential => {
                let mut index = self.index.write();
                if index.contains(id) {
                    Arc::make_mut(&mut index).remove_document(id);
                }
            }
            ExecutionPolicy::Parallel => loop {
                let Some(mut plan) = self.snapshot().plan_removal(id) else {
                    return;
                };
                plan.par_erase();

                let mut index = self.index.write();
                if index.generation() == plan.generation() {
                    Arc::make_mut(&mut index).apply_removal(plan);
                    return;
                }
                tracing::trace!(id, "index changed during parallel removal, retrying");
            },
        }
    }

    /// Term frequencies of one document; empty if the id is unknown.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<Term, f64> {
        self.index.read().word_frequencies(id).cloned().unwrap_or_default()
    }

    pub fn document_count(&self) -> usize {
        self.index.read().document_count()
    }

    /// Live ids in ascending order, as of the call.
    pub fn document_ids(&self) -> Vec<DocId> {
        self.index.read().document_ids().collect()
    }

    pub fn iter(&self) -> std::vec::IntoIter<DocId> {
        self.document_ids().into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocId;
    type IntoIter = std::vec::IntoIter<DocId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
