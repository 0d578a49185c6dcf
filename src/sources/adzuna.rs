//! Adzuna search API source (aggregates Indeed, Monster, and others).

use super::JobSource;
use crate::types::JobPosting;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

const DEFAULT_BASE_URL: &str = "https://api.adzuna.com/v1/api/jobs/us/search";
const RESULTS_PER_PAGE: usize = 50;

/// Paginated client for the Adzuna job-search API.
pub struct AdzunaSource {
    http_client: reqwest::Client,
    app_id: String,
    api_key: String,
    base_url: String,
}

impl AdzunaSource {
    pub fn builder() -> AdzunaSourceBuilder {
        AdzunaSourceBuilder::new()
    }

    async fn fetch_page(
        &self,
        page: usize,
        location: &str,
        keywords: &str,
        per_page: usize,
    ) -> Result<SearchPage> {
        let response = self
            .http_client
            .get(format!("{}/{page}", self.base_url))
            .query(&[
                ("app_id", self.app_id.as_str()),
                ("app_key", self.api_key.as_str()),
                ("what", keywords),
                ("where", location),
            ])
            .query(&[("results_per_page", per_page)])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<SearchPage>().await?)
    }
}

#[async_trait]
impl JobSource for AdzunaSource {
    /// Pages through search results until `max_count` postings are collected
    /// or the source runs out. A page-level failure logs and returns what was
    /// collected so far rather than discarding earlier pages.
    async fn fetch(
        &self,
        location: &str,
        keywords: &str,
        max_count: usize,
    ) -> Result<Vec<JobPosting>> {
        let mut postings: Vec<JobPosting> = Vec::new();
        let mut page = 1usize;
        while postings.len() < max_count {
            let per_page = RESULTS_PER_PAGE.min(max_count - postings.len());
            info!(page, per_page, "fetching postings from Adzuna");
            match self.fetch_page(page, location, keywords, per_page).await {
                Ok(data) => {
                    if data.results.is_empty() {
                        break;
                    }
                    let received = data.results.len();
                    postings.extend(data.results.into_iter().map(RawJob::into_posting));
                    if received < per_page {
                        break; // last page
                    }
                    page += 1;
                }
                Err(err) => {
                    warn!(page, error = %err, "Adzuna fetch failed; keeping postings collected so far");
                    break;
                }
            }
        }
        postings.truncate(max_count);
        Ok(postings)
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    title: Option<String>,
    company: Option<DisplayName>,
    location: Option<DisplayName>,
    description: Option<String>,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    redirect_url: Option<String>,
    created: Option<String>,
    contract_type: Option<String>,
    contract_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DisplayName {
    display_name: Option<String>,
}

impl RawJob {
    fn into_posting(self) -> JobPosting {
        let job_type = job_type_label(self.contract_type.as_deref(), self.contract_time.as_deref());
        JobPosting {
            title: self.title,
            company: self.company.and_then(|c| c.display_name),
            location: self.location.and_then(|l| l.display_name),
            description: self.description,
            salary: format_salary(self.salary_min, self.salary_max),
            url: self.redirect_url,
            source: Some("Adzuna".to_string()),
            posted_date: self.created,
            job_type: Some(job_type.to_string()),
            extra: Default::default(),
        }
    }
}

fn format_salary(min: Option<f64>, max: Option<f64>) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) => Some(format!(
            "${} - ${}",
            group_thousands(min),
            group_thousands(max)
        )),
        (Some(min), None) => Some(format!("${}+", group_thousands(min))),
        _ => None,
    }
}

fn group_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.max(0.0));
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn job_type_label(contract_type: Option<&str>, contract_time: Option<&str>) -> &'static str {
    fn label(raw: &str) -> Option<&'static str> {
        match raw {
            "full_time" => Some("Full-time"),
            "part_time" => Some("Part-time"),
            "contract" => Some("Contract"),
            "temporary" => Some("Temporary"),
            "permanent" => Some("Permanent"),
            "internship" => Some("Internship"),
            _ => None,
        }
    }
    contract_type
        .and_then(label)
        .or_else(|| contract_time.and_then(label))
        .unwrap_or("Full-time")
}

pub struct AdzunaSourceBuilder {
    app_id: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: u64,
}

impl AdzunaSourceBuilder {
    pub fn new() -> Self {
        Self {
            app_id: None,
            api_key: None,
            base_url: None,
            timeout_secs: 10,
        }
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<AdzunaSource> {
        let app_id = self
            .app_id
            .or_else(|| std::env::var("ADZUNA_APP_ID").ok())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::configuration("Adzuna app id required (set ADZUNA_APP_ID)"))?;
        let api_key = self
            .api_key
            .or_else(|| std::env::var("ADZUNA_API_KEY").ok())
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Error::configuration("Adzuna API key required (set ADZUNA_API_KEY)"))?;
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)
            .map_err(|e| Error::configuration(format!("invalid base URL '{base_url}': {e}")))?;
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| Error::configuration(format!("failed to create HTTP client: {e}")))?;
        Ok(AdzunaSource {
            http_client,
            app_id: app_id.trim().to_string(),
            api_key: api_key.trim().to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Default for AdzunaSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
