use std::sync::Arc;

use crate::competency::CompetencyStore;
use crate::jobs::pipeline::JobPipeline;
use crate::llm_client::CompletionModel;
use crate::wizard::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn CompletionModel>,
    /// Immutable after startup.
    pub competencies: Arc<CompetencyStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub pipeline: JobPipeline,
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::competency::testing::sample_store;
    use crate::jobs::cache::MemoryEnrichmentCache;
    use crate::jobs::failure_log::FailureLog;
    use crate::jobs::pipeline::PipelineConfig;
    use crate::jobs::search::testing::ScriptedSearch;
    use crate::llm_client::testing::ScriptedModel;
    use crate::wizard::session::MemorySessionStore;

    /// In-process state: scripted model and search, memory stores, sample taxonomy.
    pub async fn test_state(
        model: Arc<ScriptedModel>,
        search: Arc<ScriptedSearch>,
        failure_log: FailureLog,
    ) -> AppState {
        AppState {
            llm: model.clone(),
            competencies: Arc::new(sample_store().await),
            sessions: Arc::new(MemorySessionStore::new()),
            pipeline: JobPipeline::new(
                model,
                search,
                Arc::new(MemoryEnrichmentCache::new()),
                failure_log,
                PipelineConfig::default(),
            ),
        }
    }
}
