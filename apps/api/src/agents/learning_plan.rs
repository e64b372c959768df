//! Learning-plan generator: a four-week plan that targets the identified gaps.

use serde_json::Value;
use tracing::{info, warn};

use crate::agents::prompts::LEARNING_PLAN_TEMPLATE;
use crate::agents::AGENT_MAX_ATTEMPTS;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{self, complete_json, CompletionModel, LlmError};
use crate::models::analysis::{GapRecord, JobRequirement, LearningPlan, WeekPlan};
use crate::models::job::JobListing;
use crate::models::lenient::{number_field, string_list, text_field};
use crate::retry::{retry, RetryPolicy};

pub const PLAN_WEEKS: usize = 4;
pub const MAX_RESOURCES_PER_WEEK: usize = 3;

/// Retries until the reply carries a `plan` array. Exhaustion yields an empty plan.
pub async fn generate_learning_plan(
    job: &JobListing,
    summary: &str,
    gaps: &[GapRecord],
    requirements: &[JobRequirement],
    model: &dyn CompletionModel,
) -> LearningPlan {
    let prompt = LEARNING_PLAN_TEMPLATE
        .replace("{job_json}", &serde_json::to_string_pretty(job).unwrap_or_default())
        .replace("{summary}", summary)
        .replace("{gaps_json}", &serde_json::to_string_pretty(gaps).unwrap_or_default())
        .replace(
            "{requirements_json}",
            &serde_json::to_string_pretty(requirements).unwrap_or_default(),
        )
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);
    let policy = RetryPolicy::new(AGENT_MAX_ATTEMPTS).with_classifier(llm_client::classify_error);

    let prompt = &prompt;
    let weeks = match retry(policy, "Learning plan", |_| async move {
        let reply: Value = complete_json(model, prompt).await?;
        match reply.get("plan") {
            Some(Value::Array(weeks)) => Ok(weeks.clone()),
            _ => Err(LlmError::MissingKey("plan")),
        }
    })
    .await
    {
        Ok(weeks) => weeks,
        Err(e) => {
            warn!("{e}");
            return LearningPlan::default();
        }
    };

    let plan: Vec<WeekPlan> = weeks
        .iter()
        .filter(|w| w.is_object())
        .take(PLAN_WEEKS)
        .enumerate()
        .map(|(i, w)| to_week(i, w))
        .collect();
    info!("Learning plan for '{}': {} week(s)", job.title(), plan.len());
    LearningPlan { plan }
}

fn to_week(position: usize, item: &Value) -> WeekPlan {
    let fallback_week = (position + 1) as u8;
    let mut resources = string_list(item, "resources");
    resources.truncate(MAX_RESOURCES_PER_WEEK);

    WeekPlan {
        week: number_field(item, "week")
            .map(|n| n.round().clamp(1.0, PLAN_WEEKS as f64) as u8)
            .unwrap_or(fallback_week),
        focus_area: text_field(item, "focus_area").unwrap_or_default(),
        objectives: text_field(item, "objectives").unwrap_or_default(),
        activities: string_list(item, "activities"),
        resources,
        rationale: text_field(item, "rationale").unwrap_or_default(),
    }
}
