use serde::{Deserialize, Serialize};

/// A job title suggested by the recommender.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecommendation {
    pub title: String,
    /// Seniority label, e.g. "Senior".
    pub level: String,
    pub fit_reason: String,
}

/// Refinements the user gives after picking a recommendation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JobPreferences {
    pub industries: Vec<String>,
    pub company_type: Option<String>,
    pub location: Option<String>,
}

/// A posting as returned by the search API.
///
/// Search providers disagree on field names, so deserialization goes through
/// `RawPostingWire` and accepts `role`/`company_name`/`apply_link`/`sharing_link`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "RawPostingWire")]
pub struct RawJobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
}

#[derive(Deserialize)]
struct RawPostingWire {
    title: Option<String>,
    role: Option<String>,
    company: Option<String>,
    company_name: Option<String>,
    location: Option<String>,
    description: Option<String>,
    link: Option<String>,
    apply_link: Option<String>,
    sharing_link: Option<String>,
}

fn first_present(candidates: [Option<String>; 3]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
}

impl From<RawPostingWire> for RawJobPosting {
    fn from(w: RawPostingWire) -> Self {
        Self {
            title: first_present([w.title, w.role, None]),
            company: first_present([w.company, w.company_name, None]),
            location: w.location.unwrap_or_default(),
            description: w.description.unwrap_or_default(),
            link: first_present([w.link, w.apply_link, w.sharing_link]),
        }
    }
}

/// A posting annotated and scored against the user's profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnrichedJob {
    pub role: String,
    pub company: String,
    pub company_type: String,
    pub location: String,
    pub industry: String,
    /// Estimated monthly pay, free text ("Approx 2,000–3,000 USD/month").
    pub pay_usd: String,
    pub fit_reason: String,
    /// Always within 0..=100.
    pub match_score: u8,
    pub description: String,
    pub link: String,
}

/// One entry of a job result list: enriched when enrichment succeeded,
/// raw when the pipeline fell back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobListing {
    Enriched(EnrichedJob),
    Raw(RawJobPosting),
}

impl JobListing {
    pub fn title(&self) -> &str {
        match self {
            JobListing::Enriched(job) => &job.role,
            JobListing::Raw(job) => &job.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            JobListing::Enriched(job) => &job.description,
            JobListing::Raw(job) => &job.description,
        }
    }

    pub fn match_score(&self) -> Option<u8> {
        match self {
            JobListing::Enriched(job) => Some(job.match_score),
            JobListing::Raw(_) => None,
        }
    }
}
