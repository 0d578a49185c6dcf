//! Batch embedding across fixed-size chunks.

use super::client::EmbeddingClient;
use super::types::EmbeddingOutcome;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Stand-in submitted for empty/whitespace-only texts so batch indices stay
/// aligned with candidates. Never dropped, never an error.
pub const EMPTY_TEXT_PLACEHOLDER: &str = "empty text";

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Texts per provider call.
    pub chunk_size: usize,
    /// Delay between successive chunk submissions, beyond rate limiting.
    /// Skipped after the final chunk.
    pub pacing: Duration,
    /// Upper bound on chunk calls in flight at once.
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 20,
            pacing: Duration::from_secs(1),
            max_concurrency: 4,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

/// Splits a list of texts into fixed-size chunks and embeds each chunk in one
/// provider call, isolating per-chunk failures.
pub struct BatchEmbedder {
    client: Arc<EmbeddingClient>,
    config: BatchConfig,
}

impl BatchEmbedder {
    pub fn new(client: Arc<EmbeddingClient>) -> Self {
        Self::with_config(client, BatchConfig::default())
    }

    pub fn with_config(client: Arc<EmbeddingClient>, config: BatchConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Embed every text, preserving input length and order.
    ///
    /// Each returned entry is either a vector or [`EmbeddingOutcome::Failed`];
    /// a failed chunk marks all of its indices failed while later chunks
    /// still proceed. Chunk calls run concurrently up to the configured bound;
    /// results land in a pre-sized, index-addressed buffer, so output order
    /// never depends on completion order.
    pub async fn embed_batch(&self, texts: &[String]) -> Vec<EmbeddingOutcome> {
        if texts.is_empty() {
            return Vec::new();
        }
        let chunk_size = self.config.chunk_size.max(1);
        let max_concurrency = self.config.max_concurrency.max(1);
        let prepared = substitute_placeholders(texts);

        let mut outcomes = vec![EmbeddingOutcome::Failed; texts.len()];
        let chunks: Vec<(usize, Vec<String>)> = prepared
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| (i * chunk_size, chunk.to_vec()))
            .collect();
        let total_chunks = chunks.len();

        let mut inflight = JoinSet::new();
        for (submitted, (offset, chunk)) in chunks.into_iter().enumerate() {
            while inflight.len() >= max_concurrency {
                if let Some(joined) = inflight.join_next().await {
                    place(&mut outcomes, joined);
                }
            }
            debug!(
                chunk = submitted + 1,
                total_chunks,
                len = chunk.len(),
                "submitting chunk"
            );
            let client = Arc::clone(&self.client);
            inflight.spawn(async move { (offset, client.embed_many(&chunk).await) });
            if submitted + 1 < total_chunks && !self.config.pacing.is_zero() {
                tokio::time::sleep(self.config.pacing).await;
            }
        }
        while let Some(joined) = inflight.join_next().await {
            place(&mut outcomes, joined);
        }
        outcomes
    }
}

fn place(
    outcomes: &mut [EmbeddingOutcome],
    joined: std::result::Result<(usize, Vec<EmbeddingOutcome>), tokio::task::JoinError>,
) {
    match joined {
        Ok((offset, chunk_outcomes)) => {
            for (i, outcome) in chunk_outcomes.into_iter().enumerate() {
                if let Some(slot) = outcomes.get_mut(offset + i) {
                    *slot = outcome;
                }
            }
        }
        Err(err) => {
            error!(error = %err, "chunk task aborted; its items stay failed");
        }
    }
}

fn substitute_placeholders(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .map(|t| {
            if t.trim().is_empty() {
                EMPTY_TEXT_PLACEHOLDER.to_string()
            } else {
                t.clone()
            }
        })
        .collect()
}
