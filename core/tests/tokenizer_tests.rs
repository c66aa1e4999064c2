use search_core::tokenizer::{parse_query, split_into_words_no_stop, ParseMode, StopWords};
use search_core::Error;

#[test]
fn it_drops_stop_words_from_documents_and_queries() {
    let stops = StopWords::new(vec!["in".to_string(), "the".to_string()]).unwrap();
    let words = split_into_words_no_stop("the cat in the city", &stops).unwrap();
    assert_eq!(words, vec!["cat", "city"]);

    let query = parse_query("cat -in the -city", &stops, ParseMode::Raw).unwrap();
    assert_eq!(query.plus_words, vec!["cat"]);
    assert_eq!(query.minus_words, vec!["city"]);
}

#[test]
fn it_keeps_inner_hyphens() {
    let query = parse_query("well-groomed -half-bred", &StopWords::default(), ParseMode::Raw).unwrap();
    assert_eq!(query.plus_words, vec!["well-groomed"]);
    assert_eq!(query.minus_words, vec!["half-bred"]);
}

#[test]
fn it_rejects_bare_and_double_minus() {
    for raw in ["cat -", "--cat", "cat ---dog"] {
        let err = parse_query(raw, &StopWords::default(), ParseMode::Deduplicated).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "{raw:?}");
    }
}
