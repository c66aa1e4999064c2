//! TF-IDF scoring of candidate documents.
//!
//! The per-term work is written once against [`RelevanceSink`]; the execution
//! policy only decides who drives the term loops and which sink collects the
//! scores.

use crate::concurrent::ShardedMap;
use crate::index::{DocId, DocumentStatus, InvertedIndex};
use crate::tokenizer::Query;
use crate::{Document, ExecutionPolicy};
use rayon::prelude::*;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Destination for relevance contributions.
pub trait RelevanceSink {
    fn accumulate(&self, id: DocId, delta: f64);
    fn discard(&self, id: DocId);
    fn into_relevance(self) -> BTreeMap<DocId, f64>;
}

/// Single-threaded sink over a plain map.
#[derive(Debug, Default)]
pub struct LocalSink(RefCell<BTreeMap<DocId, f64>>);

impl RelevanceSink for LocalSink {
    fn accumulate(&self, id: DocId, delta: f64) {
        *self.0.borrow_mut().entry(id).or_insert(0.0) += delta;
    }

    fn discard(&self, id: DocId) {
        self.0.borrow_mut().remove(&id);
    }

    fn into_relevance(self) -> BTreeMap<DocId, f64> {
        self.0.into_inner()
    }
}

impl RelevanceSink for ShardedMap<DocId, f64> {
    fn accumulate(&self, id: DocId, delta: f64) {
        *self.access(id) += delta;
    }

    fn discard(&self, id: DocId) {
        self.erase(id);
    }

    fn into_relevance(self) -> BTreeMap<DocId, f64> {
        self.into_map()
    }
}

/// ln(N / df), or 0.0 when either count is zero.
pub fn inverse_document_frequency(document_count: usize, containing: usize) -> f64 {
    if document_count == 0 || containing == 0 {
        return 0.0;
    }
    (document_count as f64 / containing as f64).ln()
}

fn contribute<S, P>(index: &InvertedIndex, term: &str, sink: &S, predicate: &P)
where
    S: RelevanceSink,
    P: Fn(DocId, DocumentStatus, i32) -> bool,
{
    let Some(postings) = index.postings(term) else {
        return;
    };
    let idf = inverse_document_frequency(index.document_count(), postings.len());
    for (&id, &tf) in postings {
        let Some(data) = index.document(id) else {
            continue;
        };
        if predicate(id, data.status, data.rating) {
            sink.accumulate(id, tf * idf);
        }
    }
}

fn exclude<S: RelevanceSink>(index: &InvertedIndex, term: &str, sink: &S) {
    if let Some(postings) = index.postings(term) {
        for &id in postings.keys() {
            sink.discard(id);
        }
    }
}

/// Scores every document matching `query` and accepted by `predicate`.
///
/// Output is ordered by id; ranking happens afterwards.
pub fn find_all_documents<P>(
    index: &InvertedIndex,
    query: &Query<'_>,
    policy: ExecutionPolicy,
    bucket_count: usize,
    predicate: &P,
) -> Vec<Document>
where
    P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
{
    let relevance = match policy {
        ExecutionPolicy::Sequential => {
            let sink = LocalSink::default();
            for term in &query.plus_words {
                contribute(index, term, &sink, predicate);
            }
            for term in &query.minus_words {
                exclude(index, term, &sink);
            }
            sink.into_relevance()
        }
        ExecutionPolicy::Parallel => {
            let sink: ShardedMap<DocId, f64> = ShardedMap::new(bucket_count);
            query
                .plus_words
                .par_iter()
                .for_each(|term| contribute(index, term, &sink, predicate));
            query
                .minus_words
                .par_iter()
                .for_each(|term| exclude(index, term, &sink));
            sink.into_relevance()
        }
    };
    tracing::trace!(?policy, candidates = relevance.len(), "scored documents");

    relevance
        .into_iter()
        .filter_map(|(id, relevance)| {
            index
                .document(id)
                .map(|data| Document { id, relevance, rating: data.rating })
        })
        .collect()
}
