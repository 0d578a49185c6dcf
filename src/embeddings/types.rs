//! Embedding types and data structures.

use serde::{Deserialize, Serialize};

/// Outcome of embedding a single text within a batch.
///
/// Per-item provider failures are isolated, not escalated: a chunk that fails
/// marks each of its items [`EmbeddingOutcome::Failed`] and the rest of the
/// batch proceeds. Downstream scoring must handle both variants explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingOutcome {
    Embedded(Vec<f32>),
    Failed,
}

impl EmbeddingOutcome {
    pub fn vector(&self) -> Option<&[f32]> {
        match self {
            EmbeddingOutcome::Embedded(v) => Some(v),
            EmbeddingOutcome::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EmbeddingOutcome::Failed)
    }
}

/// A single embedding vector with its position in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub index: usize,
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(index: usize, vector: Vec<f32>) -> Self {
        Self { index, vector }
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }
}

/// Request for generating embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    pub input: EmbeddingInput,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<String>),
}

impl EmbeddingRequest {
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            input: EmbeddingInput::Single(text.into()),
            model: model.into(),
            dimensions: None,
            encoding_format: Some("float".to_string()),
        }
    }

    pub fn batch(model: impl Into<String>, texts: Vec<String>) -> Self {
        Self {
            input: EmbeddingInput::Batch(texts),
            model: model.into(),
            dimensions: None,
            encoding_format: Some("float".to_string()),
        }
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    pub embeddings: Vec<Embedding>,
    pub model: String,
    pub usage: EmbeddingUsage,
}

impl EmbeddingResponse {
    pub fn first(&self) -> Option<&Embedding> {
        self.embeddings.first()
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Parse the OpenAI-compatible response body.
    pub fn from_provider_json(data: &serde_json::Value) -> crate::Result<Self> {
        let embeddings = data["data"]
            .as_array()
            .ok_or_else(|| crate::Error::api(200, "missing 'data' array in embedding response"))?
            .iter()
            .map(|item| {
                let index = item["index"].as_u64().unwrap_or(0) as usize;
                let vector: Vec<f32> = item["embedding"]
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|v| v.as_f64().map(|f| f as f32))
                            .collect()
                    })
                    .unwrap_or_default();
                Embedding::new(index, vector)
            })
            .collect();
        let model = data["model"].as_str().unwrap_or("unknown").to_string();
        let usage = EmbeddingUsage {
            prompt_tokens: data["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            total_tokens: data["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32,
        };
        Ok(Self {
            embeddings,
            model,
            usage,
        })
    }
}

/// Known provider models and their limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModel {
    pub id: String,
    pub max_input_tokens: u32,
    pub dimensions: usize,
}

impl EmbeddingModel {
    pub fn text_embedding_3_small() -> Self {
        Self {
            id: "text-embedding-3-small".into(),
            max_input_tokens: 8191,
            dimensions: 1536,
        }
    }

    pub fn text_embedding_3_large() -> Self {
        Self {
            id: "text-embedding-3-large".into(),
            max_input_tokens: 8191,
            dimensions: 3072,
        }
    }

    pub fn text_embedding_ada_002() -> Self {
        Self {
            id: "text-embedding-ada-002".into(),
            max_input_tokens: 8191,
            dimensions: 1536,
        }
    }

    pub fn lookup(id: &str) -> Option<Self> {
        match id {
            "text-embedding-3-small" => Some(Self::text_embedding_3_small()),
            "text-embedding-3-large" => Some(Self::text_embedding_3_large()),
            "text-embedding-ada-002" => Some(Self::text_embedding_ada_002()),
            _ => None,
        }
    }
}
