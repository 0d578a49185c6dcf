//! Embedding client for generating embeddings.

use super::types::{EmbeddingModel, EmbeddingOutcome, EmbeddingRequest, EmbeddingResponse};
use crate::pipeline::Stage;
use crate::resilience::{wait_cancellable, RateGate, RateGateConfig, RetryPolicy};
use crate::{Error, Result};
use std::borrow::Cow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Rate-limited, retry-capable client for a remote text-to-vector provider.
///
/// One instance owns one rate gate; independent instances (e.g. in tests)
/// never interfere. All vectors produced through one instance share the
/// provider's configured dimensionality.
#[derive(Debug)]
pub struct EmbeddingClient {
    http_client: reqwest::Client,
    model: String,
    base_url: String,
    api_key: String,
    dimensions: Option<usize>,
    max_input_tokens: usize,
    retry: RetryPolicy,
    gate: RateGate,
    cancel: CancellationToken,
}

impl EmbeddingClient {
    pub fn builder() -> EmbeddingClientBuilder {
        EmbeddingClientBuilder::new()
    }

    /// Embed a single text, retrying transient provider failures.
    ///
    /// Empty-after-trim input fails with [`Error::InvalidInput`] before any
    /// provider call. Oversized input is truncated, not rejected. Each retry
    /// re-applies rate limiting; after the final attempt fails the last
    /// underlying error is surfaced inside [`Error::ProviderExhausted`].
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("text cannot be empty"));
        }
        let text = self.truncate(text);
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error: Option<Error> = None;

        for attempt in 0..attempts {
            self.gate.acquire().await;
            match self
                .execute(EmbeddingRequest::single(&self.model, text.as_ref()))
                .await
            {
                Ok(response) => match response.embeddings.into_iter().next() {
                    Some(embedding) if !embedding.vector.is_empty() => {
                        debug!(dimensions = embedding.vector.len(), "embedding generated");
                        return Ok(embedding.vector);
                    }
                    _ => {
                        let err = Error::api(200, "provider returned no embedding data");
                        warn!(attempt = attempt + 1, max_attempts = attempts, error = %err, "embedding attempt failed");
                        last_error = Some(err);
                    }
                },
                Err(err) => {
                    warn!(attempt = attempt + 1, max_attempts = attempts, error = %err, "embedding attempt failed");
                    last_error = Some(err);
                }
            }

            if attempt + 1 < attempts {
                let wait = self.retry.backoff(attempt);
                debug!(wait_ms = wait.as_millis() as u64, "backing off before retry");
                if !wait_cancellable(wait, &self.cancel).await {
                    return Err(Error::Cancelled {
                        stage: Stage::ProviderRetry,
                    });
                }
            }
        }

        Err(Error::ProviderExhausted {
            attempts,
            source: Box::new(
                last_error.unwrap_or_else(|| Error::api(200, "provider returned no embedding data")),
            ),
        })
    }

    /// Embed one chunk of texts in a single provider call.
    ///
    /// No per-item retry: if the call for the chunk fails, every item is
    /// recorded as [`EmbeddingOutcome::Failed`] and the caller moves on. This
    /// bounds total latency at the cost of completeness; deciding whether any
    /// failed entries are acceptable is the caller's job.
    pub async fn embed_many(&self, texts: &[String]) -> Vec<EmbeddingOutcome> {
        if texts.is_empty() {
            return Vec::new();
        }
        let prepared: Vec<String> = texts.iter().map(|t| self.truncate(t).into_owned()).collect();

        self.gate.acquire().await;
        let mut outcomes = vec![EmbeddingOutcome::Failed; texts.len()];
        match self
            .execute(EmbeddingRequest::batch(&self.model, prepared))
            .await
        {
            Ok(response) => {
                let received = response.len();
                for embedding in response.embeddings {
                    if !embedding.vector.is_empty() {
                        if let Some(slot) = outcomes.get_mut(embedding.index) {
                            *slot = EmbeddingOutcome::Embedded(embedding.vector);
                        }
                    }
                }
                if received != texts.len() {
                    warn!(
                        expected = texts.len(),
                        received, "provider returned a short embedding list"
                    );
                }
            }
            Err(err) => {
                error!(chunk_len = texts.len(), error = %err, "chunk embedding failed; marking every item failed");
            }
        }
        outcomes
    }

    async fn execute(&self, mut request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        if let Some(dims) = self.dimensions {
            request = request.with_dimensions(dims);
        }
        let endpoint = format!("{}/v1/embeddings", self.base_url);
        let response = self
            .http_client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), body));
        }
        let json: serde_json::Value = serde_json::from_str(&body)?;
        EmbeddingResponse::from_provider_json(&json)
    }

    fn truncate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        truncate_tokens(text, self.max_input_tokens)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Dimensions and token limits for the configured model, when known.
    pub fn model_info(&self) -> Option<EmbeddingModel> {
        EmbeddingModel::lookup(&self.model)
    }
}

/// Deterministically keep the first `max_tokens` whitespace-delimited tokens.
///
/// A silent, logged normalization rather than an error: the provider rejects
/// over-long inputs outright, and the head of a document carries most of the
/// matching signal.
fn truncate_tokens(text: &str, max_tokens: usize) -> Cow<'_, str> {
    if text.split_whitespace().take(max_tokens + 1).count() <= max_tokens {
        return Cow::Borrowed(text);
    }
    warn!(max_tokens, "input truncated before embedding");
    Cow::Owned(
        text.split_whitespace()
            .take(max_tokens)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

pub struct EmbeddingClientBuilder {
    model: String,
    api_key: Option<String>,
    base_url: Option<String>,
    dimensions: Option<usize>,
    requests_per_minute: f64,
    max_input_tokens: usize,
    retry: RetryPolicy,
    cancel: Option<CancellationToken>,
    timeout_secs: u64,
}

impl EmbeddingClientBuilder {
    pub fn new() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            base_url: None,
            dimensions: None,
            requests_per_minute: 3000.0,
            max_input_tokens: 8000,
            retry: RetryPolicy::default(),
            cancel: None,
            timeout_secs: 60,
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Request-rate ceiling; zero disables rate limiting.
    pub fn requests_per_minute(mut self, rpm: f64) -> Self {
        self.requests_per_minute = rpm;
        self
    }

    pub fn max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Token observed by backoff waits; cancelling it aborts an in-flight
    /// retry sequence at its next wait point.
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<EmbeddingClient> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| Error::configuration("API key required (set OPENAI_API_KEY)"))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| "https://api.openai.com".to_string());
        url::Url::parse(&base_url)
            .map_err(|e| Error::configuration(format!("invalid base URL '{base_url}': {e}")))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let gate_cfg = RateGateConfig::from_rpm(self.requests_per_minute).ok_or_else(|| {
            Error::configuration(format!(
                "invalid requests-per-minute ceiling: {}",
                self.requests_per_minute
            ))
        })?;
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| Error::configuration(format!("failed to create HTTP client: {e}")))?;
        Ok(EmbeddingClient {
            http_client,
            model: self.model,
            base_url,
            api_key,
            dimensions: self.dimensions,
            max_input_tokens: self.max_input_tokens,
            retry: self.retry,
            gate: RateGate::new(gate_cfg),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl Default for EmbeddingClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_untouched() {
        let text = "one two three";
        assert!(matches!(truncate_tokens(text, 3), Cow::Borrowed(_)));
    }

    #[test]
    fn long_input_keeps_first_n_tokens() {
        let text = "a b c d e";
        let truncated = truncate_tokens(text, 3);
        assert_eq!(truncated.as_ref(), "a b c");
    }

    #[test]
    fn truncation_normalizes_interior_whitespace_only_when_needed() {
        let text = "a   b\tc";
        assert_eq!(truncate_tokens(text, 3).as_ref(), "a   b\tc");
        assert_eq!(truncate_tokens(text, 2).as_ref(), "a b");
    }

    #[test]
    fn builder_rejects_bad_base_url() {
        let err = EmbeddingClient::builder()
            .api_key("k")
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn builder_rejects_negative_rpm() {
        let err = EmbeddingClient::builder()
            .api_key("k")
            .requests_per_minute(-5.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn model_info_for_known_model() {
        let client = EmbeddingClient::builder().api_key("k").build().unwrap();
        assert_eq!(client.model(), "text-embedding-3-small");
        assert_eq!(client.model_info().unwrap().dimensions, 1536);
    }
}
