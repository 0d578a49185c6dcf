use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A job posting being ranked against the reference resume.
///
/// Source data is heterogeneous, so every known field is optional and
/// anything else lands in the open `extra` map rather than being discarded.
/// The core consumes postings read-only; the only augmentation ever applied
/// is wrapping one into a [`Recommendation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    /// Unrecognized attributes from the source, kept as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl JobPosting {
    /// The text submitted for embedding; empty when the posting has none.
    pub fn embedding_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// A job posting annotated with its similarity score and rank position.
///
/// The sole output artifact of the core: serializes as the original posting
/// attributes alongside `rank` and `similarity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// 1-based position in the ranked output.
    pub rank: usize,
    /// Cosine similarity to the resume, rounded to 4 decimal digits.
    pub similarity: f32,
    #[serde(flatten)]
    pub job: JobPosting,
}
