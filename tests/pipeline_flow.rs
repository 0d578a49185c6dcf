//! End-to-end pipeline tests against a mock embedding provider.
//!
//! Collaborators (job source, resume extractor) are in-test doubles; the
//! provider is a real HTTP round trip through mockito so the client's wire
//! handling is exercised too.

use async_trait::async_trait;
use jobmatch::embeddings::{BatchConfig, BatchEmbedder, EmbeddingClient};
use jobmatch::filter::FilterCriteria;
use jobmatch::pipeline::{RecommendationPipeline, RecommendationRequest, Stage};
use jobmatch::resilience::RetryPolicy;
use jobmatch::resume::ResumeExtractor;
use jobmatch::sources::JobSource;
use jobmatch::types::JobPosting;
use jobmatch::{Error, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

struct StaticSource {
    jobs: Vec<JobPosting>,
}

#[async_trait]
impl JobSource for StaticSource {
    async fn fetch(&self, _: &str, _: &str, max_count: usize) -> Result<Vec<JobPosting>> {
        Ok(self.jobs.iter().take(max_count).cloned().collect())
    }
}

struct StaticResume {
    text: Option<&'static str>,
}

impl ResumeExtractor for StaticResume {
    fn extract(&self, _: &Path) -> Option<String> {
        self.text.map(str::to_string)
    }
}

fn job(title: &str, description: &str) -> JobPosting {
    JobPosting {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        ..JobPosting::default()
    }
}

fn embedding_body(vectors: &[Vec<f32>]) -> String {
    let data: Vec<serde_json::Value> = vectors
        .iter()
        .enumerate()
        .map(|(i, v)| {
            serde_json::json!({ "object": "embedding", "index": i, "embedding": v })
        })
        .collect();
    serde_json::json!({
        "object": "list",
        "data": data,
        "model": "text-embedding-3-small",
        "usage": { "prompt_tokens": 8, "total_tokens": 8 }
    })
    .to_string()
}

// Single-text requests serialize input as a JSON string, batch requests as an
// array; the two mocks are disambiguated on that.
fn single_input() -> mockito::Matcher {
    mockito::Matcher::Regex(r#""input":""#.to_string())
}

fn batch_input() -> mockito::Matcher {
    mockito::Matcher::Regex(r#""input":\["#.to_string())
}

fn client_for(server: &mockito::Server) -> Arc<EmbeddingClient> {
    let client = EmbeddingClient::builder()
        .api_key("test-key")
        .base_url(server.url())
        .requests_per_minute(0.0)
        .retry(RetryPolicy::new(2).with_base_delay(Duration::from_millis(5)))
        .build()
        .expect("client builds");
    Arc::new(client)
}

fn pipeline_for(
    server: &mockito::Server,
    jobs: Vec<JobPosting>,
    resume: Option<&'static str>,
    chunk_size: usize,
) -> RecommendationPipeline {
    let client = client_for(server);
    let batch = BatchEmbedder::with_config(
        Arc::clone(&client),
        BatchConfig::new()
            .with_chunk_size(chunk_size)
            .with_pacing(Duration::ZERO),
    );
    RecommendationPipeline::builder()
        .client(client)
        .batch(batch)
        .source(Arc::new(StaticSource { jobs }))
        .resume(Arc::new(StaticResume { text: resume }))
        .build()
        .expect("pipeline builds")
}

#[tokio::test]
async fn ranks_the_matching_job_first() {
    let mut server = mockito::Server::new_async().await;
    let resume_mock = server
        .mock("POST", "/v1/embeddings")
        .match_body(single_input())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![1.0, 0.0, 0.0]]))
        .create_async()
        .await;
    let batch_mock = server
        .mock("POST", "/v1/embeddings")
        .match_body(batch_input())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![0.9, 0.1, 0.0], vec![0.0, 1.0, 0.0]]))
        .create_async()
        .await;

    let jobs = vec![
        job("Python backend role", "Backend services in Python"),
        job("Graphic designer wanted", "Branding and layout"),
    ];
    let pipeline = pipeline_for(&server, jobs, Some("Senior Python engineer, 5 years"), 20);

    let request = RecommendationRequest::new("resume.txt").with_top_n(1);
    let recs = pipeline.run(&request).await.unwrap();
    resume_mock.assert_async().await;
    batch_mock.assert_async().await;

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].rank, 1);
    assert_eq!(recs[0].job.title.as_deref(), Some("Python backend role"));
    assert!(recs[0].similarity > 0.9);
}

#[tokio::test]
async fn full_ranking_attaches_scores_and_ranks() {
    let mut server = mockito::Server::new_async().await;
    let _resume = server
        .mock("POST", "/v1/embeddings")
        .match_body(single_input())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![1.0, 0.0]]))
        .create_async()
        .await;
    let _batch = server
        .mock("POST", "/v1/embeddings")
        .match_body(batch_input())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![0.0, 1.0], vec![1.0, 0.0]]))
        .create_async()
        .await;

    let jobs = vec![job("far", "far away role"), job("near", "close match role")];
    let pipeline = pipeline_for(&server, jobs, Some("some resume text"), 20);
    let recs = pipeline
        .run(&RecommendationRequest::new("resume.txt").with_top_n(5))
        .await
        .unwrap();

    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].job.title.as_deref(), Some("near"));
    assert_eq!(recs[0].rank, 1);
    assert_eq!(recs[0].similarity, 1.0);
    assert_eq!(recs[1].job.title.as_deref(), Some("far"));
    assert_eq!(recs[1].rank, 2);
    assert_eq!(recs[1].similarity, 0.0);
}

#[tokio::test]
async fn missing_resume_text_fails_the_run() {
    let server = mockito::Server::new_async().await;
    let pipeline = pipeline_for(&server, vec![job("a", "b")], None, 20);
    let err = pipeline
        .run(&RecommendationRequest::new("resume.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyResume));
}

#[tokio::test]
async fn empty_job_source_fails_after_resume_embedding() {
    let mut server = mockito::Server::new_async().await;
    let _resume = server
        .mock("POST", "/v1/embeddings")
        .match_body(single_input())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![1.0, 0.0]]))
        .create_async()
        .await;

    let pipeline = pipeline_for(&server, Vec::new(), Some("resume text"), 20);
    let err = pipeline
        .run(&RecommendationRequest::new("resume.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoJobsFound));
}

#[tokio::test]
async fn filters_that_empty_the_set_fail_with_counts() {
    let mut server = mockito::Server::new_async().await;
    let _resume = server
        .mock("POST", "/v1/embeddings")
        .match_body(single_input())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![1.0, 0.0]]))
        .create_async()
        .await;

    let jobs = vec![job("Designer", "figma portfolio"), job("Artist", "gallery")];
    let pipeline = pipeline_for(&server, jobs, Some("resume text"), 20);
    let request = RecommendationRequest::new("resume.txt")
        .with_criteria(FilterCriteria::new().with_required_skills(vec!["rust".into()]));
    let err = pipeline.run(&request).await.unwrap_err();
    match err {
        Error::NoJobsMatchFilters { total } => assert_eq!(total, 2),
        other => panic!("expected NoJobsMatchFilters, got {other:?}"),
    }
}

#[tokio::test]
async fn total_embedding_outage_fails_the_run() {
    let mut server = mockito::Server::new_async().await;
    let _resume = server
        .mock("POST", "/v1/embeddings")
        .match_body(single_input())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![1.0, 0.0]]))
        .create_async()
        .await;
    let _batch = server
        .mock("POST", "/v1/embeddings")
        .match_body(batch_input())
        .with_status(500)
        .create_async()
        .await;

    let jobs = vec![job("a", "first role"), job("b", "second role")];
    let pipeline = pipeline_for(&server, jobs, Some("resume text"), 20);
    let err = pipeline
        .run(&RecommendationRequest::new("resume.txt"))
        .await
        .unwrap_err();
    match err {
        Error::EmbeddingFailed { total } => assert_eq!(total, 2),
        other => panic!("expected EmbeddingFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn partial_embedding_failure_ranks_failed_postings_last() {
    let mut server = mockito::Server::new_async().await;
    let _resume = server
        .mock("POST", "/v1/embeddings")
        .match_body(single_input())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![1.0, 0.0]]))
        .create_async()
        .await;
    // Chunk size 1 gives each posting its own call; only the designer chunk
    // fails.
    let _python_chunk = server
        .mock("POST", "/v1/embeddings")
        .match_body(mockito::Matcher::AllOf(vec![
            batch_input(),
            mockito::Matcher::Regex("python".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(embedding_body(&[vec![1.0, 0.0]]))
        .create_async()
        .await;
    let _designer_chunk = server
        .mock("POST", "/v1/embeddings")
        .match_body(mockito::Matcher::AllOf(vec![
            batch_input(),
            mockito::Matcher::Regex("designer".to_string()),
        ]))
        .with_status(500)
        .create_async()
        .await;

    let jobs = vec![
        job("Designer", "graphic designer role"),
        job("Python dev", "python services role"),
    ];
    let pipeline = pipeline_for(&server, jobs, Some("resume text"), 1);
    let recs = pipeline
        .run(&RecommendationRequest::new("resume.txt").with_top_n(5))
        .await
        .unwrap();

    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0].job.title.as_deref(), Some("Python dev"));
    assert_eq!(recs[1].job.title.as_deref(), Some("Designer"));
    assert_eq!(recs[1].similarity, 0.0);
}

#[tokio::test]
async fn cancelled_token_stops_the_run_at_the_first_checkpoint() {
    let server = mockito::Server::new_async().await;
    let client = client_for(&server);
    let cancel = CancellationToken::new();
    let pipeline = RecommendationPipeline::builder()
        .client(Arc::clone(&client))
        .source(Arc::new(StaticSource {
            jobs: vec![job("a", "b")],
        }))
        .resume(Arc::new(StaticResume { text: Some("text") }))
        .cancellation(cancel.clone())
        .build()
        .unwrap();

    cancel.cancel();
    let err = pipeline
        .run(&RecommendationRequest::new("resume.txt"))
        .await
        .unwrap_err();
    match err {
        Error::Cancelled { stage } => assert_eq!(stage, Stage::ResumeExtraction),
        other => panic!("expected Cancelled, got {other:?}"),
    }
}
