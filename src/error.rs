use crate::pipeline::Stage;
use thiserror::Error;

/// Unified error type for the matching core.
///
/// Structural and precondition errors (`DimensionMismatch`, `LengthMismatch`,
/// `EmptyReference`) always escalate immediately: they indicate mismatched
/// pipeline wiring, not transient conditions. Transient provider errors are
/// retried inside [`crate::embeddings::EmbeddingClient`] and only surface here
/// as [`Error::ProviderExhausted`] once every attempt has failed.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or whitespace-only text submitted for embedding.
    /// Caller-correctable, never retried.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Every retry attempt for a single embedding call failed. Carries the
    /// last underlying error as its source.
    #[error("embedding provider exhausted after {attempts} attempts")]
    ProviderExhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("vector dimensions must match: {left} != {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("candidate count {candidates} does not match score count {scores}")]
    LengthMismatch { candidates: usize, scores: usize },

    #[error("reference vector is empty")]
    EmptyReference,

    #[error("resume produced no usable text")]
    EmptyResume,

    #[error("job source returned no postings")]
    NoJobsFound,

    #[error("no postings left after filtering ({total} fetched)")]
    NoJobsMatchFilters { total: usize },

    /// Every vector in the batch came back failed (total provider outage).
    /// Partial failures do not raise this; they score 0.0 and rank last.
    #[error("embedding failed for all {total} postings")]
    EmbeddingFailed { total: usize },

    #[error("run cancelled during {stage}")]
    Cancelled { stage: Stage },

    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network transport error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            message: message.into(),
        }
    }

    /// The stage a pipeline-level failure was raised from, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::EmptyResume => Some(Stage::ResumeExtraction),
            Error::NoJobsFound => Some(Stage::JobFetch),
            Error::NoJobsMatchFilters { .. } => Some(Stage::JobFiltering),
            Error::EmbeddingFailed { .. } => Some(Stage::JobEmbedding),
            Error::Cancelled { stage } => Some(*stage),
            _ => None,
        }
    }
}
