use crate::error::{Error, Result};
use crate::tokenizer::{split_into_words_no_stop, StopWords};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub type DocId = i32;

/// Index term. One allocation per distinct word, shared by the postings table
/// and every per-document map that mentions it.
pub type Term = Arc<str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentData {
    pub rating: i32,
    pub status: DocumentStatus,
}

/// Inverted index plus the per-document mirror used for removal.
///
/// `postings` and `doc_terms` always hold the same (term, doc, freq) triples.
/// `doc_terms`, `docs` and `doc_ids` always share a key set. A term with no
/// remaining postings is dropped from `postings`.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: BTreeMap<Term, BTreeMap<DocId, f64>>, // term -> doc -> tf
    doc_terms: BTreeMap<DocId, BTreeMap<Term, f64>>,
    docs: BTreeMap<DocId, DocumentData>,
    doc_ids: BTreeSet<DocId>,
    generation: u64, // bumped by every mutation
}

// Contents only; two indexes with the same documents are equal whatever their history.
impl PartialEq for InvertedIndex {
    fn eq(&self, other: &Self) -> bool {
        self.postings == other.postings
            && self.doc_terms == other.doc_terms
            && self.docs == other.docs
            && self.doc_ids == other.doc_ids
    }
}

/// Posting lists of one document, copied out of an index so the id can be
/// erased from them without holding the index.
///
/// Built by [`InvertedIndex::plan_removal`], committed by
/// [`InvertedIndex::apply_removal`].
#[derive(Debug, Clone)]
pub struct RemovalPlan {
    id: DocId,
    generation: u64,
    lists: Vec<(Term, BTreeMap<DocId, f64>)>,
}

impl RemovalPlan {
    pub fn id(&self) -> DocId {
        self.id
    }

    /// Generation of the index the lists were copied from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Erases the id from every copied list on the rayon pool.
    pub fn par_erase(&mut self) {
        let id = self.id;
        self.lists.par_iter_mut().for_each(|(_, list)| {
            list.remove(&id);
        });
    }
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
        stop_words: &StopWords,
    ) -> Result<()> {
        if id < 0 {
            return Err(Error::invalid(format!("document id {id} is negative")));
        }
        if self.doc_ids.contains(&id) {
            return Err(Error::invalid(format!("document id {id} already exists")));
        }
        // validates every token before anything below mutates the index
        let words = split_into_words_no_stop(text, stop_words)?;

        let inv_word_count = 1.0 / words.len() as f64;
        let mut counted: BTreeMap<&str, f64> = BTreeMap::new();
        for &word in &words {
            *counted.entry(word).or_insert(0.0) += inv_word_count;
        }

        let mut freqs = BTreeMap::new();
        for (word, tf) in counted {
            let term = self.canonical_term(word);
            self.postings.entry(Arc::clone(&term)).or_default().insert(id, tf);
            freqs.insert(term, tf);
        }

        tracing::debug!(id, tokens = words.len(), terms = freqs.len(), "added document");
        self.doc_terms.insert(id, freqs);
        self.docs.insert(id, DocumentData { rating: average_rating(ratings), status });
        self.doc_ids.insert(id);
        self.generation += 1;
        Ok(())
    }

    fn canonical_term(&self, word: &str) -> Term {
        match self.postings.get_key_value(word) {
            Some((term, _)) => Arc::clone(term),
            None => Arc::from(word),
        }
    }

    /// Retracts a document from every structure. Returns false if `id` was not live.
    pub fn remove_document(&mut self, id: DocId) -> bool {
        let Some(terms) = self.doc_terms.remove(&id) else {
            return false;
        };
        for term in terms.keys() {
            if let Some(list) = self.postings.get_mut(term) {
                list.remove(&id);
                if list.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
        self.forget(id, terms.len());
        true
    }

    /// Same end state as [`remove_document`](Self::remove_document), but the
    /// per-term erasure runs on the rayon pool.
    pub fn par_remove_document(&mut self, id: DocId) -> bool {
        let Some(mut plan) = self.plan_removal(id) else {
            return false;
        };
        plan.par_erase();
        self.apply_removal(plan)
    }

    /// Copies the posting lists of every term `id` mentions. `None` if `id`
    /// is not live.
    pub fn plan_removal(&self, id: DocId) -> Option<RemovalPlan> {
        let terms = self.doc_terms.get(&id)?;
        let lists = terms
            .keys()
            .filter_map(|term| self.postings.get_key_value(term))
            .map(|(term, list)| (Arc::clone(term), list.clone()))
            .collect();
        Some(RemovalPlan { id, generation: self.generation, lists })
    }

    /// Installs the erased lists of `plan` and retracts its document.
    ///
    /// Returns false and leaves the index untouched if anything changed since
    /// the plan was taken.
    pub fn apply_removal(&mut self, plan: RemovalPlan) -> bool {
        if plan.generation != self.generation {
            return false;
        }
        let Some(terms) = self.doc_terms.remove(&plan.id) else {
            return false;
        };
        for (term, list) in plan.lists {
            if list.is_empty() {
                self.postings.remove(&term);
            } else {
                self.postings.insert(term, list);
            }
        }
        self.forget(plan.id, terms.len());
        true
    }

    fn forget(&mut self, id: DocId, terms: usize) {
        self.docs.remove(&id);
        self.doc_ids.remove(&id);
        self.generation += 1;
        tracing::debug!(id, terms, "removed document");
    }

    pub fn postings(&self, term: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.postings.get(term)
    }

    /// The canonical term for `word` together with its posting list.
    pub fn posting_entry(&self, word: &str) -> Option<(&Term, &BTreeMap<DocId, f64>)> {
        self.postings.get_key_value(word)
    }

    pub fn word_frequencies(&self, id: DocId) -> Option<&BTreeMap<Term, f64>> {
        self.doc_terms.get(&id)
    }

    pub fn document(&self, id: DocId) -> Option<&DocumentData> {
        self.docs.get(&id)
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.doc_ids.contains(&id)
    }

    pub fn document_count(&self) -> usize {
        self.doc_ids.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Live ids in ascending order.
    pub fn document_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.doc_ids.iter().copied()
    }
}

/// Mean of `ratings`, truncated toward zero; 0 for an empty list.
pub fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as i32
}
