//! Job pipeline: cache check → search → enrich (with retry and raw fallback)
//! → cache write.
//!
//! ```text
//! CACHE_CHECK ─hit──────────────────────────────▶ CacheHit
//!      └miss─▶ SEARCH ─empty─────────────────────▶ NoResults
//!                └results─▶ ENRICH ×N ─ok─▶ CACHE_WRITE ─▶ Enriched
//!                                 └all failed─────────────▶ RawFallback
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agents::job_enricher::{enrich_and_score, EnrichedBatch, EnrichmentError};
use crate::jobs::cache::{EnrichmentCache, PutOutcome};
use crate::jobs::failure_log::FailureLog;
use crate::jobs::search::JobSearch;
use crate::llm_client::CompletionModel;
use crate::models::job::{JobListing, RawJobPosting};
use crate::retry::{retry, RetryPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub enrich_max_attempts: u32,
    pub search_max_retries: u32,
    pub page_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enrich_max_attempts: 3,
            search_max_retries: 3,
            page_size: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    CacheHit,
    Enriched,
    /// Every enrichment attempt failed; listings are the raw postings.
    RawFallback,
    NoResults,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub status: PipelineStatus,
    pub listings: Vec<JobListing>,
}

/// The single job-results orchestrator. Cheap to clone; shared via app state.
#[derive(Clone)]
pub struct JobPipeline {
    model: Arc<dyn CompletionModel>,
    search: Arc<dyn JobSearch>,
    cache: Arc<dyn EnrichmentCache>,
    failure_log: FailureLog,
    config: PipelineConfig,
}

impl JobPipeline {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        search: Arc<dyn JobSearch>,
        cache: Arc<dyn EnrichmentCache>,
        failure_log: FailureLog,
        config: PipelineConfig,
    ) -> Self {
        Self {
            model,
            search,
            cache,
            failure_log,
            config,
        }
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// Produces job listings for `title`. Never fails: every stage degrades.
    pub async fn run(&self, title: &str, summary: &str) -> PipelineOutcome {
        let query = title.trim();

        match self.cache.get(query).await {
            Ok(cached) if !cached.is_empty() => {
                info!("Loaded {} enriched job(s) for '{query}' from cache", cached.len());
                return PipelineOutcome {
                    status: PipelineStatus::CacheHit,
                    listings: cached.into_iter().map(JobListing::Enriched).collect(),
                };
            }
            Ok(_) => {}
            Err(e) => warn!("Cache lookup for '{query}' failed, treating as a miss: {e}"),
        }

        let postings = self.search.search(query, self.config.search_max_retries).await;
        if postings.is_empty() {
            info!("No jobs found for '{query}'");
            return PipelineOutcome {
                status: PipelineStatus::NoResults,
                listings: Vec::new(),
            };
        }

        match self.enrich(&postings, summary).await {
            Some(batch) => {
                match self.cache.put_if_absent(query, &batch.jobs).await {
                    Ok(PutOutcome::Stored) => {}
                    Ok(PutOutcome::AlreadyCached) => {
                        info!("'{query}' was cached by another request; keeping that entry")
                    }
                    Err(e) => warn!("Failed to cache enriched jobs for '{query}': {e}"),
                }
                PipelineOutcome {
                    status: PipelineStatus::Enriched,
                    listings: batch.jobs.into_iter().map(JobListing::Enriched).collect(),
                }
            }
            None => {
                warn!(
                    "Enrichment for '{query}' failed after {} attempt(s); showing raw postings",
                    self.config.enrich_max_attempts
                );
                PipelineOutcome {
                    status: PipelineStatus::RawFallback,
                    listings: postings.into_iter().map(JobListing::Raw).collect(),
                }
            }
        }
    }

    /// Up to `enrich_max_attempts` full enrichment calls; each failure goes to
    /// the failure log. A batch in which every record was auto-filled counts
    /// as a failure.
    async fn enrich(&self, postings: &[RawJobPosting], summary: &str) -> Option<EnrichedBatch> {
        let policy = RetryPolicy::<EnrichmentError>::new(self.config.enrich_max_attempts);
        let model = self.model.as_ref();
        let failure_log = &self.failure_log;

        retry(policy, "Job enrichment", |attempt| async move {
            let result = match enrich_and_score(postings, summary, model).await {
                Ok(batch) if !batch.is_usable() => Err(EnrichmentError::Unusable {
                    returned: batch.jobs.len(),
                    auto_filled: batch.auto_filled,
                }),
                other => other,
            };
            if let Err(e) = &result {
                if let Err(io) = failure_log.record(attempt, &e.to_string()).await {
                    warn!("Could not write to {}: {io}", failure_log.path().display());
                }
            }
            result
        })
        .await
        .ok()
    }
}
