//! Job posting sources.

use crate::types::JobPosting;
use crate::Result;
use async_trait::async_trait;

/// Where candidate postings come from.
///
/// Implementations may return fewer postings than requested; an empty result
/// is a valid outcome the orchestrator maps to [`crate::Error::NoJobsFound`].
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(
        &self,
        location: &str,
        keywords: &str,
        max_count: usize,
    ) -> Result<Vec<JobPosting>>;
}

mod adzuna;

pub use adzuna::{AdzunaSource, AdzunaSourceBuilder};
