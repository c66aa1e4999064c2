//! Running many independent queries against one server.

use crate::error::Result;
use crate::server::SearchServer;
use crate::Document;
use rayon::prelude::*;

/// Runs every query on the rayon pool; results keep the order of `queries`.
/// The first malformed query fails the whole batch.
pub fn process_queries<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    let results = queries
        .par_iter()
        .map(|query| server.find_top_documents(query.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(queries = queries.len(), "processed query batch");
    Ok(results)
}

/// Like [`process_queries`], with the per-query lists concatenated in order.
pub fn process_queries_joined<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(server, queries)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::DocumentStatus;

    fn server() -> SearchServer {
        let server = SearchServer::from_stop_words_text("and with").unwrap();
        let texts = [
            "funny pet and nasty rat",
            "funny pet with curly hair",
            "funny pet and not very nasty rat",
            "pet with rat and rat and rat",
            "nasty rat with curly hair",
        ];
        for (id, text) in texts.iter().enumerate() {
            server.add_document(id as i32 + 1, text, DocumentStatus::Actual, &[1, 2]).unwrap();
        }
        server
    }

    #[test]
    fn per_query_lists_follow_query_order() {
        let server = server();
        let queries = ["nasty rat -not", "not very funny nasty pet", "curly hair"];
        let lists = process_queries(&server, &queries).unwrap();
        assert_eq!(lists.len(), 3);
        for (query, list) in queries.iter().zip(&lists) {
            assert_eq!(list, &server.find_top_documents(query).unwrap());
        }
        assert_eq!(lists[0].len(), 3);
        assert_eq!(lists[1].len(), 5);
        assert_eq!(lists[2].len(), 2);
    }

    #[test]
    fn joined_is_concatenation() {
        let server = server();
        let queries = vec!["curly hair".to_string(), "nasty rat -not".to_string()];
        let lists = process_queries(&server, &queries).unwrap();
        let joined = process_queries_joined(&server, &queries).unwrap();
        assert_eq!(joined, lists.concat());
        assert_eq!(joined.len(), 5);
    }

    #[test]
    fn malformed_query_fails_batch() {
        let server = server();
        let err = process_queries(&server, &["rat", "--rat"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
