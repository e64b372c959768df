//! Job recommender: merged competency levels → a handful of job titles.

use serde_json::Value;
use tracing::{info, warn};

use crate::agents::prompts::JOB_RECOMMENDATION_TEMPLATE;
use crate::agents::{AGENT_MAX_ATTEMPTS, NOT_PROVIDED};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{self, complete_json, CompletionModel};
use crate::models::job::JobRecommendation;
use crate::models::lenient::text_field;
use crate::models::profile::CompetencyLevel;
use crate::retry::{retry, RetryPolicy};

const UNSPECIFIED_LEVEL: &str = "Unspecified";

/// Retries until the model returns a JSON array. Exhaustion yields an empty list.
pub async fn recommend_jobs(
    competencies: &[CompetencyLevel],
    model: &dyn CompletionModel,
) -> Vec<JobRecommendation> {
    let competencies_json = serde_json::to_string_pretty(competencies).unwrap_or_default();
    let prompt = JOB_RECOMMENDATION_TEMPLATE
        .replace("{competencies_json}", &competencies_json)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);
    let policy = RetryPolicy::new(AGENT_MAX_ATTEMPTS).with_classifier(llm_client::classify_error);

    let prompt = &prompt;
    let items: Vec<Value> = match retry(policy, "Job recommendation", |_| async move {
        complete_json::<Vec<Value>>(model, prompt).await
    })
    .await
    {
        Ok(items) => items,
        Err(e) => {
            warn!("{e}");
            return Vec::new();
        }
    };

    let recommendations: Vec<JobRecommendation> = items.iter().filter_map(to_recommendation).collect();
    info!("Recommended {} job title(s)", recommendations.len());
    recommendations
}

fn to_recommendation(item: &Value) -> Option<JobRecommendation> {
    Some(JobRecommendation {
        title: text_field(item, "title")?,
        level: text_field(item, "level").unwrap_or_else(|| UNSPECIFIED_LEVEL.to_string()),
        fit_reason: text_field(item, "fit_reason").unwrap_or_else(|| NOT_PROVIDED.to_string()),
    })
}
