//! # jobmatch
//!
//! Embedding-based resume-to-job matching. The crate turns a resume and a set
//! of job postings into a ranked list of best matches by acquiring embedding
//! vectors from a remote provider and scoring them with cosine similarity.
//!
//! ## Overview
//!
//! The core is a fixed two-stage pipeline: embed, then rank. Embedding
//! acquisition goes through a rate-limited, retry-capable provider client with
//! batching and truncation policies; ranking pairs every candidate with a
//! bounded similarity score and keeps the top N under well-defined tie-break
//! rules. Everything around that core (where resumes and postings come from,
//! how text is cleaned, how results are filtered) enters through trait seams
//! so callers can swap implementations.
//!
//! ## Key Features
//!
//! - **Provider client**: [`embeddings::EmbeddingClient`] enforces a
//!   per-instance request-rate ceiling, truncates oversized inputs, and
//!   retries transient failures with exponential backoff
//! - **Batching**: [`embeddings::BatchEmbedder`] chunks large inputs and
//!   isolates per-chunk failures so one bad chunk never aborts the run
//! - **Scoring**: [`similarity`] computes cosine similarity clamped to
//!   `[0, 1]` with explicit zero-vector and dimension-mismatch rules
//! - **Ranking**: [`ranking::top_n`] produces stable, 1-based-ranked
//!   [`Recommendation`]s
//! - **Orchestration**: [`pipeline::RecommendationPipeline`] sequences the
//!   stages and defines the failure contract for each one
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jobmatch::embeddings::EmbeddingClient;
//! use jobmatch::pipeline::{RecommendationPipeline, RecommendationRequest};
//! use jobmatch::resume::PlainTextResume;
//! use jobmatch::sources::AdzunaSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> jobmatch::Result<()> {
//!     let client = Arc::new(
//!         EmbeddingClient::builder()
//!             .model("text-embedding-3-small")
//!             .build()?,
//!     );
//!     let pipeline = RecommendationPipeline::builder()
//!         .client(client)
//!         .source(Arc::new(AdzunaSource::builder().build()?))
//!         .resume(Arc::new(PlainTextResume))
//!         .build()?;
//!
//!     let request = RecommendationRequest::new("resume.txt")
//!         .with_keywords("software engineer")
//!         .with_top_n(10);
//!     let recommendations = pipeline.run(&request).await?;
//!     for rec in &recommendations {
//!         println!("#{} {:?} ({:.3})", rec.rank, rec.job.title, rec.similarity);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`embeddings`] | Provider client, wire types, batch embedder |
//! | [`similarity`] | Cosine similarity over embedding vectors |
//! | [`ranking`] | Top-N selection and recommendation assembly |
//! | [`pipeline`] | Pipeline orchestrator and collaborator traits |
//! | [`resilience`] | Rate gating and retry/backoff primitives |
//! | [`sources`] | Job posting sources (Adzuna search API) |
//! | [`resume`] | Resume text extraction |
//! | [`text`] | Text cleaning and composition |
//! | [`filter`] | Post-fetch filtering by salary/experience/type/skills |
//! | [`types`] | Job posting and recommendation records |

pub mod embeddings;
pub mod filter;
pub mod pipeline;
pub mod ranking;
pub mod resilience;
pub mod resume;
pub mod similarity;
pub mod sources;
pub mod text;
pub mod types;

// Re-export main types for convenience
pub use embeddings::{BatchConfig, BatchEmbedder, EmbeddingClient, EmbeddingClientBuilder, EmbeddingOutcome};
pub use pipeline::{RecommendationPipeline, RecommendationRequest, Stage};
pub use types::{JobPosting, Recommendation};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
