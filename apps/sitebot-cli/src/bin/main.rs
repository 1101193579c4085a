use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use sitebot_cli::{ask, build_engine, build_prompt, ingest_documents, render_hits, render_hits_json, Engine};
use sitebot_core::config::{Config, Settings};
use sitebot_core::data_processor::DocumentLoader;
use sitebot_vector::MemoryVectorStore;

#[derive(Parser)]
#[command(name = "sitebot", about = "Offline question answering over site documents", version)]
struct Cli {
    /// Collection to ingest into (default: retrieval.collection)
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Only ingest the first N files
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Hide the ingest progress bar
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a directory of .txt files, then answer one question
    IngestQuery {
        data_dir: PathBuf,
        question: String,
        /// Number of chunks to return (default: retrieval.top_k)
        #[arg(short, long)]
        k: Option<usize>,
        /// Print hits as JSON
        #[arg(long)]
        json: bool,
        /// Print the answer prompt built from the hits instead of the hits
        #[arg(long, conflicts_with = "json")]
        prompt: bool,
    },
    /// Ingest a directory of .txt files, then answer questions read from stdin
    Repl {
        data_dir: PathBuf,
        #[arg(short, long)]
        k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let collection = cli.collection.clone().unwrap_or_else(|| settings.retrieval.collection.clone());
    let store = MemoryVectorStore::new();
    let engine = build_engine(&store, &settings, &collection)?;

    match cli.command {
        Command::IngestQuery { data_dir, question, k, json, prompt } => {
            ingest_dir(&engine, &data_dir, cli.limit, !cli.quiet && !json).await?;
            let hits = ask(Arc::clone(&engine), question.clone(), k.unwrap_or(settings.retrieval.top_k)).await?;
            if json {
                println!("{}", render_hits_json(&hits)?);
            } else if prompt {
                let texts: Vec<String> = hits.into_iter().map(|h| h.chunk.text).collect();
                println!("{}", build_prompt(&question, &texts));
            } else {
                print!("{}", render_hits(&hits));
            }
        }
        Command::Repl { data_dir, k } => {
            ingest_dir(&engine, &data_dir, cli.limit, !cli.quiet).await?;
            repl(engine, &settings, k).await?;
        }
    }
    Ok(())
}

async fn ingest_dir(engine: &Arc<Engine>, data_dir: &Path, limit: Option<usize>, progress: bool) -> Result<()> {
    let loader = limit.map(DocumentLoader::with_limit).unwrap_or_default();
    let documents = loader.load_directory(data_dir)?;
    println!("Ingesting {} files from {}", documents.len(), data_dir.display());
    let summary = ingest_documents(Arc::clone(engine), documents, progress).await?;
    println!("✅ Ingested {} documents ({} chunks)", summary.documents, summary.chunks);
    if !summary.failed.is_empty() {
        println!("⚠️  Skipped {} documents: {}", summary.failed.len(), summary.failed.join(", "));
    }
    Ok(())
}

async fn repl(engine: Arc<Engine>, settings: &Settings, k: Option<usize>) -> Result<()> {
    let k = k.unwrap_or(settings.retrieval.top_k);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"? ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else { break };
        let question = line.trim();
        if question.is_empty() { continue; }
        if question == "exit" || question == "quit" { break; }
        match ask(Arc::clone(&engine), question.to_string(), k).await {
            Ok(hits) => print!("{}", render_hits(&hits)),
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }
    Ok(())
}
