use criterion::{criterion_group, criterion_main, Criterion};
use search_core::{process_queries, DocumentStatus, ExecutionPolicy, SearchServer};

const WORDS: &[&str] = &[
    "cat", "dog", "fluffy", "tail", "collar", "white", "black", "groomed", "eyes", "funny", "pet", "rat",
    "nasty", "curly", "hair", "parrot", "sparrow", "big", "small", "city",
];

fn corpus(docs: i32) -> SearchServer {
    let server = SearchServer::from_stop_words_text("and with in").unwrap();
    for id in 0..docs {
        let text: Vec<&str> = (0..8).map(|k| WORDS[((id * 7 + k * 13) as usize) % WORDS.len()]).collect();
        server.add_document(id, &text.join(" "), DocumentStatus::Actual, &[id % 10]).unwrap();
    }
    server
}

fn bench_queries(c: &mut Criterion) {
    let server = corpus(10_000);
    let query = "fluffy cat curly hair -rat parrot city big";
    c.bench_function("find_top_sequential", |b| {
        b.iter(|| server.find_top_documents_with(ExecutionPolicy::Sequential, query, |_, _, _| true))
    });
    c.bench_function("find_top_parallel", |b| {
        b.iter(|| server.find_top_documents_with(ExecutionPolicy::Parallel, query, |_, _, _| true))
    });
    let queries: Vec<String> = WORDS.windows(3).map(|w| w.join(" ")).collect();
    c.bench_function("process_queries", |b| b.iter(|| process_queries(&server, &queries)));
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
