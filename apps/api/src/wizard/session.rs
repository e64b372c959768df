//! The wizard session record and where it lives between requests.
//!
//! Each step writes its output into a typed slot and reads its inputs through
//! a `require_*` accessor, which fails with a missing-precondition error that
//! names the step to complete. Writing a step clears every slot downstream of
//! it, so a resubmitted profile can never be paired with stale job results.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::pipeline::{PipelineOutcome, PipelineStatus};
use crate::models::analysis::{GapReport, JobRequirement, LearningPlan};
use crate::models::job::{JobListing, JobPreferences, JobRecommendation};
use crate::models::profile::{CompetencyProfile, ProfileInput};

/// Section key under which the job-results page index is kept.
pub const JOB_RESULTS_SECTION: &str = "job_results";

const REDIS_KEY_PREFIX: &str = "pathfinder:session";

/// Stored output of the job-search step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobResults {
    pub query: String,
    pub status: PipelineStatus,
    pub listings: Vec<JobListing>,
}

/// Stored output of the gap-analysis step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GapAnalysis {
    pub requirements: Vec<JobRequirement>,
    pub report: GapReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WizardSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub profile: Option<ProfileInput>,
    pub summary: Option<String>,
    pub current_title: Option<String>,
    pub competency_profile: Option<CompetencyProfile>,
    pub recommendations: Option<Vec<JobRecommendation>>,
    pub selected_job: Option<JobRecommendation>,
    pub preferences: Option<JobPreferences>,
    pub job_results: Option<JobResults>,
    /// 1-based page index per result section.
    #[serde(default)]
    pub pages: HashMap<String, usize>,
    pub selected_posting: Option<JobListing>,
    pub gap_analysis: Option<GapAnalysis>,
    pub learning_plan: Option<LearningPlan>,
}

fn missing(step: &str) -> AppError {
    AppError::MissingPrecondition(format!("Complete the {step} step first"))
}

impl WizardSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            profile: None,
            summary: None,
            current_title: None,
            competency_profile: None,
            recommendations: None,
            selected_job: None,
            preferences: None,
            job_results: None,
            pages: HashMap::new(),
            selected_posting: None,
            gap_analysis: None,
            learning_plan: None,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn require_profile(&self) -> Result<&ProfileInput, AppError> {
        self.profile.as_ref().ok_or_else(|| missing("profile"))
    }

    pub fn require_summary(&self) -> Result<&str, AppError> {
        self.summary.as_deref().ok_or_else(|| missing("summary"))
    }

    pub fn require_competency_profile(&self) -> Result<&CompetencyProfile, AppError> {
        self.competency_profile
            .as_ref()
            .ok_or_else(|| missing("summary"))
    }

    pub fn require_recommendations(&self) -> Result<&[JobRecommendation], AppError> {
        self.recommendations
            .as_deref()
            .ok_or_else(|| missing("recommendations"))
    }

    pub fn require_selected_job(&self) -> Result<&JobRecommendation, AppError> {
        self.selected_job.as_ref().ok_or_else(|| missing("selection"))
    }

    pub fn require_job_results(&self) -> Result<&JobResults, AppError> {
        self.job_results.as_ref().ok_or_else(|| missing("job search"))
    }

    pub fn require_selected_posting(&self) -> Result<&JobListing, AppError> {
        self.selected_posting
            .as_ref()
            .ok_or_else(|| missing("job interest"))
    }

    pub fn require_gap_analysis(&self) -> Result<&GapAnalysis, AppError> {
        self.gap_analysis.as_ref().ok_or_else(|| missing("gap analysis"))
    }

    pub fn page(&self, section: &str) -> usize {
        self.pages.get(section).copied().unwrap_or(1)
    }

    pub fn set_profile(&mut self, profile: ProfileInput) {
        self.profile = Some(profile);
        self.summary = None;
        self.current_title = None;
        self.competency_profile = None;
        self.clear_from_recommendations();
    }

    pub fn set_summary(
        &mut self,
        summary: String,
        current_title: String,
        profile: CompetencyProfile,
    ) {
        self.summary = Some(summary);
        self.current_title = Some(current_title);
        self.competency_profile = Some(profile);
        self.clear_from_recommendations();
    }

    pub fn set_recommendations(&mut self, recommendations: Vec<JobRecommendation>) {
        self.recommendations = Some(recommendations);
        self.clear_from_selection();
    }

    pub fn select_job(&mut self, job: JobRecommendation, preferences: JobPreferences) {
        self.clear_from_selection();
        self.selected_job = Some(job);
        self.preferences = Some(preferences);
    }

    pub fn set_job_results(&mut self, query: String, outcome: PipelineOutcome) {
        self.clear_from_job_results();
        self.job_results = Some(JobResults {
            query,
            status: outcome.status,
            listings: outcome.listings,
        });
        self.pages.insert(JOB_RESULTS_SECTION.to_string(), 1);
    }

    pub fn select_posting(&mut self, posting: JobListing) {
        self.selected_posting = Some(posting);
        self.gap_analysis = None;
        self.learning_plan = None;
    }

    pub fn set_gap_analysis(&mut self, analysis: GapAnalysis) {
        self.gap_analysis = Some(analysis);
        self.learning_plan = None;
    }

    fn clear_from_recommendations(&mut self) {
        self.recommendations = None;
        self.clear_from_selection();
    }

    fn clear_from_selection(&mut self) {
        self.selected_job = None;
        self.preferences = None;
        self.clear_from_job_results();
    }

    fn clear_from_job_results(&mut self) {
        self.job_results = None;
        self.pages.remove(JOB_RESULTS_SECTION);
        self.selected_posting = None;
        self.gap_analysis = None;
        self.learning_plan = None;
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Whole-record storage. Each request loads, mutates and saves the record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: Uuid) -> Result<Option<WizardSession>, SessionError>;
    async fn save(&self, session: &WizardSession) -> Result<(), SessionError>;
}

/// Redis-backed store; each record is one JSON string with a TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(id: Uuid) -> String {
        format!("{REDIS_KEY_PREFIX}:{id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<WizardSession>, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(Self::key(id)).await?;
        Ok(raw.map(|json| serde_json::from_str(&json)).transpose()?)
    }

    async fn save(&self, session: &WizardSession) -> Result<(), SessionError> {
        let payload = serde_json::to_string(session)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn
            .set_ex(Self::key(session.id), payload, self.ttl_secs)
            .await?;
        Ok(())
    }
}

/// In-process store used when no Redis URL is configured. Records do not expire.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, WizardSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: Uuid) -> Result<Option<WizardSession>, SessionError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn save(&self, session: &WizardSession) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::RawJobPosting;

    fn recommendation(title: &str) -> JobRecommendation {
        JobRecommendation {
            title: title.to_string(),
            level: "Mid".to_string(),
            fit_reason: "Fits".to_string(),
        }
    }

    fn profile() -> CompetencyProfile {
        CompetencyProfile {
            latest_role: "Analyst".to_string(),
            role_needed: vec![],
            cv_strengths: vec![],
            combined: vec![],
        }
    }

    #[test]
    fn test_missing_step_is_named() {
        let session = WizardSession::new();
        match session.require_selected_job() {
            Err(AppError::MissingPrecondition(msg)) => assert!(msg.contains("selection")),
            other => panic!("expected missing precondition, got {other:?}"),
        }
    }

    #[test]
    fn test_new_profile_clears_everything_downstream() {
        let mut session = WizardSession::new();
        session.set_profile(ProfileInput::default());
        session.set_summary("summary".to_string(), "Analyst".to_string(), profile());
        session.set_recommendations(vec![recommendation("Data Analyst")]);
        session.select_job(recommendation("Data Analyst"), JobPreferences::default());
        session.set_job_results(
            "Data Analyst".to_string(),
            PipelineOutcome {
                status: PipelineStatus::RawFallback,
                listings: vec![JobListing::Raw(RawJobPosting::default())],
            },
        );

        session.set_profile(ProfileInput::default());
        assert!(session.summary.is_none());
        assert!(session.recommendations.is_none());
        assert!(session.selected_job.is_none());
        assert!(session.job_results.is_none());
        assert_eq!(session.page(JOB_RESULTS_SECTION), 1);
    }

    #[test]
    fn test_reselecting_job_keeps_recommendations() {
        let mut session = WizardSession::new();
        session.set_recommendations(vec![recommendation("A"), recommendation("B")]);
        session.select_job(recommendation("A"), JobPreferences::default());
        session.select_job(recommendation("B"), JobPreferences::default());
        assert_eq!(session.require_recommendations().unwrap().len(), 2);
        assert_eq!(session.require_selected_job().unwrap().title, "B");
    }

    #[test]
    fn test_redis_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            RedisSessionStore::key(id),
            "pathfinder:session:00000000-0000-0000-0000-000000000000"
        );
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemorySessionStore::new();
        let mut session = WizardSession::new();
        session.set_profile(ProfileInput {
            cv_text: Some("CV".to_string()),
            ..Default::default()
        });
        store.save(&session).await.unwrap();

        let loaded = store.load(session.id).await.unwrap().unwrap();
        assert_eq!(loaded, session);
        assert!(store.load(Uuid::new_v4()).await.unwrap().is_none());
    }
}
