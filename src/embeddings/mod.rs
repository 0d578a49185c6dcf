//! Embedding acquisition.
//!
//! This module provides:
//! - The provider client with rate limiting, truncation, and retries
//! - Batch embedding over fixed-size chunks with failure isolation
//! - Wire types for embedding requests and responses

mod batch;
mod client;
mod types;

pub use batch::{BatchConfig, BatchEmbedder, EMPTY_TEXT_PLACEHOLDER};
pub use client::{EmbeddingClient, EmbeddingClientBuilder};
pub use types::{
    Embedding, EmbeddingInput, EmbeddingModel, EmbeddingOutcome, EmbeddingRequest,
    EmbeddingResponse, EmbeddingUsage,
};
