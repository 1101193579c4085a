//! Host-side glue for the `sitebot` binary: engine construction from settings,
//! concurrent directory ingestion and result rendering.

use anyhow::{Context, Result};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::{info, warn};

use sitebot_core::config::Settings;
use sitebot_core::data_processor::SourceDocument;
use sitebot_core::types::{IngestReport, QueryHit};
use sitebot_embed::embedder_from_settings;
use sitebot_retrieval::RetrievalEngine;
use sitebot_vector::{MemoryCollection, MemoryVectorStore};

pub type Engine = RetrievalEngine<MemoryCollection>;

/// Build an engine over collection `collection` of `store`, creating it if needed.
pub fn build_engine(store: &MemoryVectorStore, settings: &Settings, collection: &str) -> Result<Arc<Engine>> {
    let embedder = embedder_from_settings(&settings.embedder).context("building embedder")?;
    let engine = RetrievalEngine::in_store(store, collection, embedder, settings.chunking)
        .with_context(|| format!("opening collection '{collection}'"))?;
    Ok(Arc::new(engine))
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub documents: usize,
    pub chunks: usize,
    pub failed: Vec<String>,
}

/// Ingest every document on the blocking pool, one task per document.
///
/// A document that fails to ingest is logged and listed in the summary; the
/// others are still stored.
pub async fn ingest_documents(engine: Arc<Engine>, documents: Vec<SourceDocument>, progress: bool) -> Result<IngestSummary> {
    let pb = if progress { ProgressBar::new(documents.len() as u64) } else { ProgressBar::hidden() };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
            .context("progress template")?
            .progress_chars("#>-"),
    );

    let tasks = documents.into_iter().map(|doc| {
        let engine = Arc::clone(&engine);
        let pb = pb.clone();
        tokio::task::spawn_blocking(move || {
            let result = engine.ingest(&doc.text, &doc.source_id);
            pb.inc(1);
            (doc.source_id, result)
        })
    });
    let results = join_all(tasks).await;
    pb.finish_and_clear();

    let mut summary = IngestSummary::default();
    for joined in results {
        let (source_id, result) = joined.context("ingest task failed to complete")?;
        match result {
            Ok(IngestReport { chunks, .. }) => {
                summary.documents += 1;
                summary.chunks += chunks;
            }
            Err(e) => {
                warn!(source_id = %source_id, error = %e, "document not ingested");
                summary.failed.push(source_id);
            }
        }
    }
    summary.failed.sort();
    info!(documents = summary.documents, chunks = summary.chunks, failed = summary.failed.len(), "ingest finished");
    Ok(summary)
}

/// Ask `question` on the blocking pool.
pub async fn ask(engine: Arc<Engine>, question: String, k: usize) -> Result<Vec<QueryHit>> {
    let hits = tokio::task::spawn_blocking(move || engine.query_hits(&question, k))
        .await
        .context("query task failed to complete")??;
    Ok(hits)
}

/// Plain-text rendering of ranked hits, one block per hit.
pub fn render_hits(hits: &[QueryHit]) -> String {
    if hits.is_empty() {
        return "No results.\n".to_string();
    }
    let mut out = String::new();
    for (rank, hit) in hits.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{:.4}] {} #{}\n{}\n\n",
            rank + 1,
            hit.score,
            hit.chunk.source_id,
            hit.chunk.sequence_index,
            hit.chunk.text.trim()
        ));
    }
    out
}

pub fn render_hits_json(hits: &[QueryHit]) -> Result<String> {
    serde_json::to_string_pretty(hits).context("serialising hits")
}

/// Retrieved chunk texts joined into one context block, best first.
pub fn build_context(chunks: &[String]) -> String {
    chunks.join("\n")
}

/// Prompt for a downstream answer service: the question framed by its
/// retrieved context, or the bare question when nothing was retrieved.
pub fn build_prompt(question: &str, chunks: &[String]) -> String {
    if chunks.is_empty() {
        return question.to_string();
    }
    format!(
        "You are an AI assistant for engineering documents.\n\n\
         Context from uploaded documents:\n{}\n\n\
         User question: {}\n\n\
         Please answer based on the provided context.",
        build_context(chunks),
        question
    )
}
