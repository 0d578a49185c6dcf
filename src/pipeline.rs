//! Pipeline orchestration: resume in, ranked recommendations out.
//!
//! One fixed, linear sequence (embed the resume, embed the candidate
//! postings, score, rank) with a defined failure exit at every stage. There
//! is no partial or resumable result: a run either returns recommendations or
//! a single terminal error naming the stage that stopped it.

use crate::embeddings::{BatchEmbedder, EmbeddingClient};
use crate::filter::{self, FilterCriteria};
use crate::ranking::top_n;
use crate::resume::ResumeExtractor;
use crate::similarity::similarity_all;
use crate::sources::JobSource;
use crate::text::{DefaultNormalizer, TextNormalizer};
use crate::types::Recommendation;
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Where a run currently is, used for cancellation checkpoints and failure
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResumeExtraction,
    ResumeEmbedding,
    JobFetch,
    JobFiltering,
    JobEmbedding,
    Ranking,
    /// Inside the provider client's retry/backoff sequence.
    ProviderRetry,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::ResumeExtraction => "resume extraction",
            Stage::ResumeEmbedding => "resume embedding",
            Stage::JobFetch => "job fetch",
            Stage::JobFiltering => "job filtering",
            Stage::JobEmbedding => "job embedding",
            Stage::Ranking => "ranking",
            Stage::ProviderRetry => "provider retry backoff",
        };
        f.write_str(name)
    }
}

/// Parameters for one recommendation run.
#[derive(Debug, Clone)]
pub struct RecommendationRequest {
    pub resume_path: PathBuf,
    pub location: String,
    pub keywords: String,
    pub max_jobs: usize,
    pub top_n: usize,
    pub criteria: Option<FilterCriteria>,
}

impl RecommendationRequest {
    pub fn new(resume_path: impl Into<PathBuf>) -> Self {
        Self {
            resume_path: resume_path.into(),
            location: String::new(),
            keywords: String::new(),
            max_jobs: 50,
            top_n: 10,
            criteria: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn with_max_jobs(mut self, max_jobs: usize) -> Self {
        self.max_jobs = max_jobs;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }
}

/// Sequences resume embedding, batch job embedding, and ranking.
pub struct RecommendationPipeline {
    source: Arc<dyn JobSource>,
    resume: Arc<dyn ResumeExtractor>,
    normalizer: Arc<dyn TextNormalizer>,
    client: Arc<EmbeddingClient>,
    batch: BatchEmbedder,
    cancel: CancellationToken,
}

impl RecommendationPipeline {
    pub fn builder() -> RecommendationPipelineBuilder {
        RecommendationPipelineBuilder::new()
    }

    /// Run the full pipeline and return ranked recommendations.
    ///
    /// Stage failures, in order: [`Error::EmptyResume`] when extraction or
    /// cleaning yields nothing; any resume-embedding failure (the reference
    /// vector is mandatory); [`Error::NoJobsFound`]; [`Error::NoJobsMatchFilters`];
    /// [`Error::EmbeddingFailed`] only when *every* posting's embedding
    /// failed; partial failures score 0.0 and rank last. Cancellation is
    /// observed between stages and surfaces as [`Error::Cancelled`].
    pub async fn run(&self, request: &RecommendationRequest) -> Result<Vec<Recommendation>> {
        self.checkpoint(Stage::ResumeExtraction)?;
        let resume_text = self
            .resume
            .extract(&request.resume_path)
            .ok_or(Error::EmptyResume)?;
        let clean_resume = self.normalizer.clean(&resume_text);
        if clean_resume.trim().is_empty() {
            return Err(Error::EmptyResume);
        }
        info!(chars = clean_resume.len(), "resume text ready");

        self.checkpoint(Stage::ResumeEmbedding)?;
        let reference = self.client.embed_one(&clean_resume).await?;
        info!(dimensions = reference.len(), "resume embedded");

        self.checkpoint(Stage::JobFetch)?;
        let mut jobs = self
            .source
            .fetch(&request.location, &request.keywords, request.max_jobs)
            .await?;
        if jobs.is_empty() {
            return Err(Error::NoJobsFound);
        }
        info!(count = jobs.len(), "postings fetched");

        if let Some(criteria) = request.criteria.as_ref().filter(|c| !c.is_empty()) {
            self.checkpoint(Stage::JobFiltering)?;
            let total = jobs.len();
            jobs = filter::apply(jobs, criteria);
            if jobs.is_empty() {
                return Err(Error::NoJobsMatchFilters { total });
            }
            info!(before = total, after = jobs.len(), "postings filtered");
        }

        self.checkpoint(Stage::JobEmbedding)?;
        let job_texts: Vec<String> = jobs
            .iter()
            .map(|job| self.normalizer.clean(job.embedding_text()))
            .collect();
        let outcomes = self.batch.embed_batch(&job_texts).await;
        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        if failed == outcomes.len() {
            return Err(Error::EmbeddingFailed {
                total: outcomes.len(),
            });
        }
        if failed > 0 {
            warn!(
                failed,
                total = outcomes.len(),
                "some postings failed to embed; they will rank last"
            );
        }

        self.checkpoint(Stage::Ranking)?;
        let scores = similarity_all(&reference, &outcomes)?;
        let recommendations = top_n(&jobs, &scores, request.top_n)?;
        info!(count = recommendations.len(), "recommendations ready");
        Ok(recommendations)
    }

    /// Cancelling this token stops the run at the next between-stage
    /// checkpoint. Hand the same token to
    /// [`crate::embeddings::EmbeddingClientBuilder::cancellation`] and the
    /// client's backoff waits abort too, bounding a cancelled run to at most
    /// one in-flight provider call.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn checkpoint(&self, stage: Stage) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled { stage });
        }
        Ok(())
    }
}

pub struct RecommendationPipelineBuilder {
    source: Option<Arc<dyn JobSource>>,
    resume: Option<Arc<dyn ResumeExtractor>>,
    normalizer: Option<Arc<dyn TextNormalizer>>,
    client: Option<Arc<EmbeddingClient>>,
    batch: Option<BatchEmbedder>,
    cancel: Option<CancellationToken>,
}

impl RecommendationPipelineBuilder {
    pub fn new() -> Self {
        Self {
            source: None,
            resume: None,
            normalizer: None,
            client: None,
            batch: None,
            cancel: None,
        }
    }

    pub fn source(mut self, source: Arc<dyn JobSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn resume(mut self, resume: Arc<dyn ResumeExtractor>) -> Self {
        self.resume = Some(resume);
        self
    }

    pub fn normalizer(mut self, normalizer: Arc<dyn TextNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn client(mut self, client: Arc<EmbeddingClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn batch(mut self, batch: BatchEmbedder) -> Self {
        self.batch = Some(batch);
        self
    }

    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<RecommendationPipeline> {
        let client = self
            .client
            .ok_or_else(|| Error::configuration("embedding client required"))?;
        let source = self
            .source
            .ok_or_else(|| Error::configuration("job source required"))?;
        let resume = self
            .resume
            .ok_or_else(|| Error::configuration("resume extractor required"))?;
        let normalizer = self
            .normalizer
            .unwrap_or_else(|| Arc::new(DefaultNormalizer::new()));
        let batch = self
            .batch
            .unwrap_or_else(|| BatchEmbedder::new(Arc::clone(&client)));
        Ok(RecommendationPipeline {
            source,
            resume,
            normalizer,
            client,
            batch,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl Default for RecommendationPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
