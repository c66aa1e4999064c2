use crate::config::SearchConfig;
use crate::{Document, ExecutionPolicy};
use rayon::prelude::*;
use std::cmp::Ordering;

fn by_relevance_desc(a: &Document, b: &Document) -> Ordering {
    b.relevance.total_cmp(&a.relevance).then(a.id.cmp(&b.id))
}

fn by_rating_desc(a: &Document, b: &Document) -> Ordering {
    b.rating.cmp(&a.rating).then(a.id.cmp(&b.id))
}

/// Orders candidates best first and keeps at most `config.max_results`.
///
/// Relevance decides the order unless two documents fall into the same tie
/// group, in which case the higher rating wins and the lower id breaks any
/// remaining tie. A group starts at the most relevant remaining document and
/// takes every document less than `relevance_epsilon` below it, so members of
/// a group are pairwise within epsilon and members of different groups are
/// strictly ordered by relevance.
pub fn rank(mut documents: Vec<Document>, policy: ExecutionPolicy, config: &SearchConfig) -> Vec<Document> {
    match policy {
        ExecutionPolicy::Sequential => documents.sort_by(by_relevance_desc),
        ExecutionPolicy::Parallel => documents.par_sort_by(by_relevance_desc),
    }

    let mut start = 0;
    while start < documents.len() && start < config.max_results {
        let head = documents[start].relevance;
        let end = documents[start..]
            .iter()
            .position(|d| head - d.relevance >= config.relevance_epsilon)
            .map_or(documents.len(), |offset| start + offset);
        documents[start..end].sort_by(by_rating_desc);
        start = end;
    }

    documents.truncate(config.max_results);
    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i32, relevance: f64, rating: i32) -> Document {
        Document { id, relevance, rating }
    }

    fn ids(docs: &[Document]) -> Vec<i32> {
        docs.iter().map(|d| d.id).collect()
    }

    #[test]
    fn higher_relevance_first() {
        let ranked = rank(
            vec![doc(1, 0.1, 9), doc(2, 0.5, 1), doc(3, 0.3, 5)],
            ExecutionPolicy::Sequential,
            &SearchConfig::default(),
        );
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn near_ties_fall_back_to_rating() {
        let ranked = rank(
            vec![doc(1, 0.5, 1), doc(2, 0.5 + 1e-7, -3), doc(3, 0.5 - 1e-7, 8), doc(4, 0.2, 10)],
            ExecutionPolicy::Parallel,
            &SearchConfig::default(),
        );
        assert_eq!(ids(&ranked), vec![3, 1, 2, 4]);
    }

    #[test]
    fn exact_ties_are_deterministic() {
        let input = vec![doc(5, 1.0, 2), doc(3, 1.0, 2), doc(4, 1.0, 2)];
        let seq = rank(input.clone(), ExecutionPolicy::Sequential, &SearchConfig::default());
        let par = rank(input, ExecutionPolicy::Parallel, &SearchConfig::default());
        assert_eq!(ids(&seq), vec![3, 4, 5]);
        assert_eq!(seq, par);
    }

    #[test]
    fn truncates_to_configured_cap() {
        let input: Vec<_> = (0..20).map(|i| doc(i, f64::from(i), 0)).collect();
        let ranked = rank(input.clone(), ExecutionPolicy::Sequential, &SearchConfig::default());
        assert_eq!(ids(&ranked), vec![19, 18, 17, 16, 15]);

        let cfg = SearchConfig { max_results: 2, ..SearchConfig::default() };
        assert_eq!(rank(input, ExecutionPolicy::Parallel, &cfg).len(), 2);
    }
}
