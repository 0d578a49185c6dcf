//! Post-fetch filtering of job postings.
//!
//! Keyword/regex heuristics over the posting text; runs before embedding so
//! filtered-out postings never cost a provider call.

use crate::types::JobPosting;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    EntryLevel,
    Junior,
    MidLevel,
    Senior,
    Lead,
    Principal,
    Executive,
}

static ENTRY_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(entry|junior|jr|graduate|intern)\b").unwrap());
static JUNIOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(junior|jr)\b").unwrap());
static MID_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(mid|middle|intermediate)\b").unwrap());
static SENIOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(senior|sr)\b").unwrap());
static LEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(lead|principal|staff)\b").unwrap());
static PRINCIPAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(principal|staff|architect)\b").unwrap());
static EXECUTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(executive|director|vp|cto|ceo|head)\b").unwrap());

impl ExperienceLevel {
    fn pattern(&self) -> &'static Regex {
        match self {
            ExperienceLevel::EntryLevel => &ENTRY_LEVEL,
            ExperienceLevel::Junior => &JUNIOR,
            ExperienceLevel::MidLevel => &MID_LEVEL,
            ExperienceLevel::Senior => &SENIOR,
            ExperienceLevel::Lead => &LEAD,
            ExperienceLevel::Principal => &PRINCIPAL,
            ExperienceLevel::Executive => &EXECUTIVE,
        }
    }
}

/// Structured predicate applied to fetched postings. Empty criteria match
/// everything.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Minimum salary; postings without a parseable salary are kept.
    pub salary_min: u64,
    pub experience_levels: Vec<ExperienceLevel>,
    pub job_types: Vec<String>,
    pub required_skills: Vec<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_salary_min(mut self, salary_min: u64) -> Self {
        self.salary_min = salary_min;
        self
    }

    pub fn with_experience_levels(mut self, levels: Vec<ExperienceLevel>) -> Self {
        self.experience_levels = levels;
        self
    }

    pub fn with_job_types(mut self, job_types: Vec<String>) -> Self {
        self.job_types = job_types;
        self
    }

    pub fn with_required_skills(mut self, skills: Vec<String>) -> Self {
        self.required_skills = skills;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.salary_min == 0
            && self.experience_levels.is_empty()
            && self.job_types.is_empty()
            && self.required_skills.is_empty()
    }
}

/// Apply every populated criterion in turn. May return an empty list; the
/// orchestrator decides whether that aborts the run.
pub fn apply(jobs: Vec<JobPosting>, criteria: &FilterCriteria) -> Vec<JobPosting> {
    let before = jobs.len();
    let mut filtered = jobs;
    if criteria.salary_min > 0 {
        filtered.retain(|job| salary_at_least(job, criteria.salary_min));
    }
    if !criteria.experience_levels.is_empty() {
        filtered.retain(|job| matches_experience(job, &criteria.experience_levels));
    }
    if !criteria.job_types.is_empty() {
        filtered.retain(|job| matches_job_type(job, &criteria.job_types));
    }
    if !criteria.required_skills.is_empty() {
        filtered.retain(|job| mentions_any_skill(job, &criteria.required_skills));
    }
    debug!(before, after = filtered.len(), "filters applied");
    filtered
}

static SALARY_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$?[\d,]+").unwrap());

// First number in the string is the low end of a range like
// "$100,000 - $150,000". Unparseable salaries are kept, not filtered out.
fn salary_at_least(job: &JobPosting, minimum: u64) -> bool {
    let Some(salary) = job.salary.as_deref() else {
        return true;
    };
    if salary.is_empty() || salary == "N/A" {
        return true;
    }
    let Some(m) = SALARY_NUMBER.find(salary) else {
        return true;
    };
    match m.as_str().replace(['$', ','], "").parse::<u64>() {
        Ok(value) => value >= minimum,
        Err(_) => true,
    }
}

fn searchable_text(job: &JobPosting) -> String {
    format!(
        "{} {}",
        job.title.as_deref().unwrap_or(""),
        job.description.as_deref().unwrap_or("")
    )
}

fn matches_experience(job: &JobPosting, levels: &[ExperienceLevel]) -> bool {
    let text = searchable_text(job);
    levels.iter().any(|level| level.pattern().is_match(&text))
}

fn matches_job_type(job: &JobPosting, job_types: &[String]) -> bool {
    let wanted: Vec<String> = job_types.iter().map(|t| t.to_lowercase()).collect();
    let declared = job
        .job_type
        .as_deref()
        .unwrap_or("Full-time")
        .to_lowercase();
    if wanted.iter().any(|t| declared.contains(t)) {
        return true;
    }
    let text = searchable_text(job).to_lowercase();
    wanted.iter().any(|t| text.contains(t))
}

fn mentions_any_skill(job: &JobPosting, skills: &[String]) -> bool {
    let text = searchable_text(job);
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .any(|skill| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(skill)))
                .map(|re| re.is_match(&text))
                .unwrap_or(false)
        })
}
