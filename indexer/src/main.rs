use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use search_core::{
    process_queries_joined, Document, DocumentStatus, ExecutionPolicy, SearchConfig, SearchServer,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: i32,
    text: String,
    #[serde(default = "default_status")]
    status: DocumentStatus,
    #[serde(default)]
    ratings: Vec<i32>,
}

fn default_status() -> DocumentStatus {
    DocumentStatus::Actual
}

#[derive(Parser)]
#[command(name = "search-indexer")]
#[command(about = "Index documents in memory and run TF-IDF queries against them", long_about = None)]
struct Cli {
    /// Input path (JSON/JSONL file or a directory of them)
    #[arg(long)]
    input: String,
    /// Space-delimited stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// JSON file with engine settings
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the result cap
    #[arg(long)]
    max_results: Option<usize>,
    /// Run queries on the thread pool
    #[arg(long, default_value_t = false)]
    parallel: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the top documents for each query
    Search { queries: Vec<String> },
    /// Print the matched terms of every document for one query
    Match { query: String },
    /// Run all queries as one batch and print the joined results
    Batch { queries: Vec<String> },
}

#[derive(Serialize)]
struct QueryReport<'a> {
    query: &'a str,
    results: Vec<Document>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.max_results)?;
    let server = SearchServer::with_config(cli.stop_words.split(' '), config)?;
    let policy = if cli.parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential };

    let added = ingest(&server, Path::new(&cli.input))?;
    tracing::info!(added, live = server.document_count(), "ingested documents");

    match cli.command {
        Commands::Search { queries } => {
            for query in &queries {
                match server.find_top_documents_with(policy, query, |_, status, _| status == DocumentStatus::Actual) {
                    Ok(results) => println!("{}", serde_json::to_string(&QueryReport { query, results })?),
                    Err(err) => tracing::warn!(%query, %err, "search failed"),
                }
            }
        }
        Commands::Match { query } => {
            for id in &server {
                match server.match_document_with(policy, &query, id) {
                    Ok(matched) => println!("{}", serde_json::json!({ "id": id, "terms": matched.terms, "status": matched.status })),
                    Err(err) => {
                        tracing::warn!(%query, %err, "match failed");
                        break;
                    }
                }
            }
        }
        Commands::Batch { queries } => {
            let results = process_queries_joined(&server, &queries)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>, max_results: Option<usize>) -> Result<SearchConfig> {
    let mut config = match path {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
            serde_json::from_reader(BufReader::new(f))?
        }
        None => SearchConfig::default(),
    };
    if let Some(max) = max_results {
        config.max_results = max;
    }
    Ok(config)
}

fn is_document_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|s| s.to_str()), Some("json" | "jsonl"))
}

/// The input file itself, or every `.json`/`.jsonl` file under a directory in name order.
fn collect_files(input_path: &Path) -> Vec<PathBuf> {
    if input_path.is_file() {
        return vec![input_path.to_path_buf()];
    }
    WalkDir::new(input_path)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_document_file(e.path()))
        .map(|e| e.into_path())
        .collect()
}

/// Adds every document found under `input`. Documents the engine rejects are
/// logged and skipped; I/O and JSON errors abort. Returns the number added.
fn ingest(server: &SearchServer, input: &Path) -> Result<usize> {
    let mut docs = Vec::new();
    for file in collect_files(input) {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }

    let mut added = 0;
    for doc in docs {
        match server.add_document(doc.id, &doc.text, doc.status, &doc.ratings) {
            Ok(()) => added += 1,
            Err(err) => tracing::warn!(id = doc.id, %err, "skipping document"),
        }
    }
    Ok(added)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        docs.push(serde_json::from_str(&line).with_context(|| format!("parsing {}", file.display()))?);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let text = fs::read_to_string(file)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => {}
    }
    Ok(())
}
