//! Requirement extractor: the key requirements of one posting, each scored
//! against the user's summary.

use serde_json::Value;
use tracing::warn;

use crate::agents::prompts::REQUIREMENTS_TEMPLATE;
use crate::agents::NOT_PROVIDED;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{complete_json, CompletionModel};
use crate::models::analysis::JobRequirement;
use crate::models::lenient::{score_field, text_field};

/// Single attempt. Accepts `{"requirements": [...]}` or a bare array;
/// anything else yields an empty list.
pub async fn extract_job_requirements(
    job_description: &str,
    summary: &str,
    model: &dyn CompletionModel,
) -> Vec<JobRequirement> {
    let prompt = REQUIREMENTS_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{summary}", summary)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);

    let reply: Value = match complete_json(model, &prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Requirement extraction failed: {e}");
            return Vec::new();
        }
    };

    let items = match &reply {
        Value::Array(items) => items.as_slice(),
        other => match other.get("requirements").and_then(Value::as_array) {
            Some(items) => items.as_slice(),
            None => {
                warn!("Requirement reply had no requirements list");
                return Vec::new();
            }
        },
    };

    items.iter().filter_map(to_requirement).collect()
}

fn to_requirement(item: &Value) -> Option<JobRequirement> {
    Some(JobRequirement {
        requirement: text_field(item, "requirement")?,
        category: text_field(item, "category").unwrap_or_else(|| "other".to_string()),
        reason: text_field(item, "reason").unwrap_or_else(|| NOT_PROVIDED.to_string()),
        match_score: score_field(item, "match_score").unwrap_or(0),
        match_explanation: text_field(item, "match_explanation")
            .unwrap_or_else(|| NOT_PROVIDED.to_string()),
    })
}
