use anyhow::Result;
use clap::Parser;
use engine::{process_query, Analyzer, DocId, IndexBuilder, Indexes, QueryResult, StopwordSet};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "shell")]
#[command(about = "Boolean and proximity search over a folder of documents", long_about = None)]
struct Cli {
    /// Folder containing the documents to index
    #[arg(long, default_value = "./documents")]
    corpus: PathBuf,
    /// Flat stopword list, one word per line; missing file disables filtering
    #[arg(long, default_value = "./Stopword-List.txt")]
    stopwords: PathBuf,
    /// Run a single query and exit instead of starting the prompt
    #[arg(long)]
    query: Option<String>,
    /// Print query results as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let stopwords = StopwordSet::load(&cli.stopwords);
    let analyzer = Analyzer::english(stopwords);

    let mut builder = IndexBuilder::new(&analyzer);
    ingest_corpus(&cli.corpus, &mut builder)?;
    let indexes = builder.build();
    tracing::info!(
        num_docs = indexes.num_docs(),
        num_terms = indexes.num_terms(),
        "indexes built"
    );

    if let Some(query) = cli.query {
        run_query(&query, &indexes, &analyzer, cli.json);
        return Ok(());
    }
    repl(&indexes, &analyzer, cli.json)
}

/// Read every file at the top of the corpus folder into the builder.
/// Unreadable entries are skipped, not fatal; a missing folder is created
/// and yields an empty corpus.
fn ingest_corpus(dir: &Path, builder: &mut IndexBuilder<'_>) -> Result<()> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "corpus folder not found, creating it");
        std::fs::create_dir_all(dir)?;
        return Ok(());
    }
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match std::fs::read(path) {
            Ok(bytes) => {
                // Corpus files are not guaranteed UTF-8; replace rather
                // than reject.
                let text = String::from_utf8_lossy(&bytes);
                builder.add_document(DocId::from_file_name(&name), &text);
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), %err, "skipping unreadable document");
            }
        }
    }
    Ok(())
}

fn repl(indexes: &Indexes, analyzer: &Analyzer, mut json: bool) -> Result<()> {
    println!("enter a boolean query (cat AND sat), a proximity query (cat sat / 2),");
    println!(":postings <term>, :positions <term>, :json, or :quit");
    prompt()?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }
        if input == ":quit" || input == ":q" {
            break;
        }
        if input == ":json" {
            json = !json;
            println!("json output {}", if json { "on" } else { "off" });
        } else if let Some(word) = input.strip_prefix(":postings ") {
            show_postings(word.trim(), indexes, analyzer);
        } else if let Some(word) = input.strip_prefix(":positions ") {
            show_positions(word.trim(), indexes, analyzer);
        } else {
            run_query(input, indexes, analyzer, json);
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("> ");
    io::stdout().flush()?;
    Ok(())
}

fn run_query(raw: &str, indexes: &Indexes, analyzer: &Analyzer, json: bool) {
    match process_query(raw, indexes, analyzer) {
        Ok(result) => {
            if json {
                println!("{}", to_json(&result));
            } else {
                print_result(&result);
            }
        }
        Err(err) => println!("no matching documents ({err})"),
    }
}

fn print_result(result: &QueryResult) {
    if result.docs.is_empty() {
        println!("no matching documents");
        return;
    }
    let ids: Vec<String> = result.docs.iter().map(ToString::to_string).collect();
    println!("docs: {}", ids.join(", "));
    for (doc, by_term) in &result.matched {
        for (term, positions) in by_term {
            let positions: Vec<String> = positions.iter().map(ToString::to_string).collect();
            println!("  doc {doc}: {term} @ [{}]", positions.join(", "));
        }
    }
}

fn to_json(result: &QueryResult) -> serde_json::Value {
    // JSON object keys must be strings, so DocId keys go through Display.
    let matched: serde_json::Map<String, serde_json::Value> = result
        .matched
        .iter()
        .map(|(doc, by_term)| {
            let by_term: serde_json::Map<String, serde_json::Value> = by_term
                .iter()
                .map(|(term, positions)| (term.clone(), serde_json::json!(positions)))
                .collect();
            (doc.to_string(), serde_json::Value::Object(by_term))
        })
        .collect();
    serde_json::json!({ "docs": result.docs, "matched": matched })
}

fn show_postings(word: &str, indexes: &Indexes, analyzer: &Analyzer) {
    let term = analyzer.stem_term(word);
    let docs = indexes.postings(&term);
    if docs.is_empty() {
        println!("{term}: no postings");
        return;
    }
    let ids: Vec<String> = docs.iter().map(ToString::to_string).collect();
    println!("{term} -> [{}]", ids.join(", "));
}

fn show_positions(word: &str, indexes: &Indexes, analyzer: &Analyzer) {
    let term = analyzer.stem_term(word);
    match indexes.positions(&term) {
        None => println!("{term}: no postings"),
        Some(map) => {
            for (doc, positions) in map {
                let positions: Vec<String> =
                    positions.iter().map(ToString::to_string).collect();
                println!("{term} doc {doc}: [{}]", positions.join(", "));
            }
        }
    }
}
