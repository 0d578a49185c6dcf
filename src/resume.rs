//! Resume text extraction.

use std::path::Path;
use tracing::warn;

/// Pulls raw text out of a resume file.
///
/// `None` signals extraction failure (unreadable file, unsupported format,
/// nothing extracted); the orchestrator turns that into
/// [`crate::Error::EmptyResume`].
pub trait ResumeExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Option<String>;
}

/// Extractor for plain-text resume files (`.txt`, `.text`, `.md`).
///
/// Binary formats (PDF, DOCX) need a dedicated extractor behind the same
/// trait; this one refuses them rather than returning garbage bytes.
#[derive(Debug, Clone, Default)]
pub struct PlainTextResume;

impl ResumeExtractor for PlainTextResume {
    fn extract(&self, path: &Path) -> Option<String> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("txt") | Some("text") | Some("md") => {}
            other => {
                warn!(path = %path.display(), extension = ?other, "unsupported resume format");
                return None;
            }
        }
        match std::fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                warn!(path = %path.display(), "resume file is empty");
                None
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read resume file");
                None
            }
        }
    }
}
