use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use recall_cache::ResponseCache;
use recall_cli::{init_tracing, load_settings};
use recall_core::data_processor::DataProcessor;
use recall_embed::EmbeddingProvider;
use recall_search::{Service, SummarizeRequest};
use recall_vector::IndexStore;

#[derive(Parser)]
#[command(name = "recall", version, about = "Semantic search and summarization over a local corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk every .txt/.pdf under DIR and rebuild the index.
    Ingest {
        /// Corpus directory (defaults to paths.data_dir).
        dir: Option<PathBuf>,
    },
    /// Answer a query against the index.
    Query { text: String },
    /// Summarize text directly.
    Summarize {
        text: String,
        #[arg(short, long, default_value = "medium")]
        length: String,
    },
    /// Show index and cache status.
    Status,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings().context("loading configuration")?;

    match cli.command {
        Command::Ingest { dir } => {
            let data_dir = dir.unwrap_or_else(|| settings.paths.data_dir());
            println!("Ingesting from {}", data_dir.display());
            let report = DataProcessor::new().process_directory(&data_dir)?;
            for doc in &report.documents {
                println!("  {} -> {} chunks ({} chars)", doc.path.display(), doc.chunks, doc.chars);
            }
            for (path, reason) in &report.skipped {
                println!("  skipped {}: {}", path.display(), reason);
            }
            let provider = EmbeddingProvider::from_settings(&settings)?;
            let store = IndexStore::new(settings.paths.index_path());
            let built = store.build(&report.chunks, &provider)?;
            println!(
                "✅ Indexed {} chunks (dim={}, dropped {}) -> {}",
                built.accepted,
                built.dim,
                built.dropped,
                built.path.display()
            );
        }
        Command::Query { text } => {
            let service = Service::from_settings(&settings)?;
            match service.query(Some(&text)) {
                Ok(resp) => println!("{}", serde_json::to_string_pretty(&resp)?),
                Err(e) => bail!("query failed ({}): {}", e.status_code(), e),
            }
        }
        Command::Summarize { text, length } => {
            let service = Service::from_settings(&settings)?;
            let request = SummarizeRequest { text: Some(text), length: Some(length) };
            match service.summarize(request) {
                Ok(resp) => println!("{}", serde_json::to_string_pretty(&resp)?),
                Err(e) => bail!("summarize failed ({}): {}", e.status_code(), e),
            }
        }
        Command::Status => {
            println!("similarity: {}", settings.similarity);
            println!("embedding:  {} ({})", settings.embedding.backend, settings.embedding.model);
            println!("llm:        {}", settings.llm.backend);
            let store = IndexStore::new(settings.paths.index_path());
            match store.status() {
                Ok(s) => println!(
                    "index:      {} entries, dim={}, mode={}, built {} ({})",
                    s.entries,
                    s.dim,
                    s.mode,
                    s.built_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    store.path().display()
                ),
                Err(e) => println!("index:      unavailable ({e})"),
            }
            match ResponseCache::open(settings.paths.cache_db_path()).and_then(|c| c.len()) {
                Ok(n) => println!("cache:      {} entries", n),
                Err(e) => println!("cache:      unavailable ({e})"),
            }
            info!("status complete");
        }
    }
    Ok(())
}
