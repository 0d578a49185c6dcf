//! Text cleaning and composition for embedding input.

use crate::types::JobPosting;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Cleans free text before it is embedded.
///
/// Total: never fails, may return an empty string.
pub trait TextNormalizer: Send + Sync {
    fn clean(&self, text: &str) -> String;
}

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?\d{3}\)?[\s.-]?\d{3}[-.]?\d{4}").unwrap());
static SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,!?;:()\-]").unwrap());
static PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,!?;:]+").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
        "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does",
        "did", "will", "would", "could", "should", "may", "might", "must", "can", "this", "that",
        "these", "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us",
        "them", "my", "your", "his", "our", "their",
    ]
    .into_iter()
    .collect()
});

/// Default cleaning pass: decodes HTML entities, strips markup, URLs, email
/// addresses and phone numbers, drops punctuation, collapses whitespace, and
/// lowercases.
#[derive(Debug, Clone, Default)]
pub struct DefaultNormalizer {
    remove_stop_words: bool,
}

impl DefaultNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also drop common English stop words and words shorter than 3 chars.
    pub fn with_stop_word_removal(mut self) -> Self {
        self.remove_stop_words = true;
        self
    }
}

impl TextNormalizer for DefaultNormalizer {
    fn clean(&self, text: &str) -> String {
        let text = decode_entities(text);
        let text = HTML_TAG.replace_all(&text, " ");
        let text = URL.replace_all(&text, " ");
        let text = EMAIL.replace_all(&text, " ");
        let text = PHONE.replace_all(&text, " ");
        let text = SPECIAL.replace_all(&text, " ");
        let text = PUNCT.replace_all(&text, " ");
        let text = WHITESPACE.replace_all(&text, " ");
        let text = text.trim().to_lowercase();

        if self.remove_stop_words {
            text.split_whitespace()
                .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            text
        }
    }
}

// The handful of entities job boards actually emit; `&amp;` is decoded last
// so it cannot mint new entities.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Combine a posting's fields into one embeddable string.
///
/// The title is repeated to weight it more heavily than the description.
/// Output is raw; callers run it through a [`TextNormalizer`].
pub fn compose_job_text(job: &JobPosting) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(title) = job.title.as_deref() {
        parts.push(title);
        parts.push(title);
    }
    if let Some(company) = job.company.as_deref() {
        parts.push(company);
    }
    if let Some(location) = job.location.as_deref() {
        parts.push(location);
    }
    if let Some(description) = job.description.as_deref() {
        parts.push(description);
    }
    let salary_part;
    if let Some(salary) = job.salary.as_deref() {
        salary_part = format!("salary {salary}");
        parts.push(&salary_part);
    }
    if let Some(job_type) = job.job_type.as_deref() {
        parts.push(job_type);
    }
    parts.join(" ")
}
