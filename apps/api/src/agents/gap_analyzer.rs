//! Gap analyzer: compares one job with the user's summary and competency levels.

use serde_json::Value;
use tracing::{info, warn};

use crate::agents::prompts::GAP_ANALYSIS_TEMPLATE;
use crate::agents::{AGENT_MAX_ATTEMPTS, NOT_PROVIDED};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{self, complete_json, CompletionModel, LlmError};
use crate::models::analysis::{GapRecord, GapReport, GapType};
use crate::models::job::JobListing;
use crate::models::lenient::{level_field, text_field};
use crate::models::profile::CompetencyLevel;
use crate::retry::{retry, RetryPolicy};

/// Cap for the full analysis view.
pub const FULL_GAP_LIMIT: usize = 10;

/// Cap for the compact view and for gaps fed into the learning plan.
pub const COMPACT_GAP_LIMIT: usize = 5;

/// Retries until the reply carries a `gaps` array. Exhaustion yields
/// `{job title, []}`; the list is always truncated to `max_gaps`.
pub async fn analyze_gaps(
    job: &JobListing,
    summary: &str,
    competencies: &[CompetencyLevel],
    max_gaps: usize,
    model: &dyn CompletionModel,
) -> GapReport {
    let job_json = serde_json::to_string_pretty(job).unwrap_or_default();
    let competencies_json = serde_json::to_string_pretty(competencies).unwrap_or_default();
    let prompt = GAP_ANALYSIS_TEMPLATE
        .replace("{max_gaps}", &max_gaps.to_string())
        .replace("{job_json}", &job_json)
        .replace("{summary}", summary)
        .replace("{competencies_json}", &competencies_json)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);
    let policy = RetryPolicy::new(AGENT_MAX_ATTEMPTS).with_classifier(llm_client::classify_error);

    let prompt = &prompt;
    let items = match retry(policy, "Gap analysis", |_| async move {
        let reply: Value = complete_json(model, prompt).await?;
        match reply.get("gaps") {
            Some(Value::Array(items)) => Ok(items.clone()),
            _ => Err(LlmError::MissingKey("gaps")),
        }
    })
    .await
    {
        Ok(items) => items,
        Err(e) => {
            warn!("{e}");
            Vec::new()
        }
    };

    let gaps: Vec<GapRecord> = items
        .iter()
        .filter_map(|item| to_gap(item, competencies))
        .take(max_gaps)
        .collect();
    info!("Gap analysis for '{}': {} gap(s)", job.title(), gaps.len());

    GapReport {
        job_title: job.title().to_string(),
        gaps,
    }
}

fn to_gap(item: &Value, competencies: &[CompetencyLevel]) -> Option<GapRecord> {
    let competency = text_field(item, "competency")?;
    let gap_type = match text_field(item, "type").map(|t| t.to_lowercase()).as_deref() {
        Some("experience") => GapType::Experience,
        Some("skill") => GapType::Skill,
        _ if item.get("required_level").is_some() => GapType::Skill,
        _ => GapType::Experience,
    };

    let (current_level, required_level) = match gap_type {
        GapType::Skill => {
            let known = competencies
                .iter()
                .find(|c| c.competency.eq_ignore_ascii_case(&competency))
                .map(|c| c.level);
            (
                level_field(item, "current_level").or(known),
                level_field(item, "required_level"),
            )
        }
        GapType::Experience => (None, None),
    };

    Some(GapRecord {
        gap_type,
        competency,
        current_level,
        required_level,
        explanation: text_field(item, "explanation").unwrap_or_else(|| NOT_PROVIDED.to_string()),
        recommendation: text_field(item, "recommendation")
            .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        suggested_learning_mode: text_field(item, "suggested_learning_mode"),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use crate::models::job::EnrichedJob;

    fn job() -> JobListing {
        JobListing::Enriched(EnrichedJob {
            role: "Data Analyst".to_string(),
            description: "SQL and dashboards".to_string(),
            ..Default::default()
        })
    }

    fn gaps_reply(n: usize) -> String {
        let gaps: Vec<_> = (0..n)
            .map(|i| json!({"type": "skill", "competency": format!("Skill {i}"), "current_level": 2, "required_level": 4}))
            .collect();
        json!({"job_title": "Data Analyst", "gaps": gaps}).to_string()
    }

    #[tokio::test]
    async fn test_gaps_are_capped() {
        let model = ScriptedModel::new([Some(gaps_reply(12))]);
        let report = analyze_gaps(&job(), "s", &[], FULL_GAP_LIMIT, &model).await;
        assert_eq!(report.gaps.len(), 10);

        let model = ScriptedModel::new([Some(gaps_reply(12))]);
        let report = analyze_gaps(&job(), "s", &[], COMPACT_GAP_LIMIT, &model).await;
        assert_eq!(report.gaps.len(), 5);
        assert!(model.prompts()[0].contains("up to 5"));
    }

    #[tokio::test]
    async fn test_reply_without_gaps_is_retried() {
        let model = ScriptedModel::new([Some(r#"{"job_title": "x"}"#), Some(gaps_reply(1).as_str())]);
        let report = analyze_gaps(&job(), "s", &[], FULL_GAP_LIMIT, &model).await;
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_empty_report_for_job() {
        let model = ScriptedModel::always("garbage", 5);
        let report = analyze_gaps(&job(), "s", &[], FULL_GAP_LIMIT, &model).await;
        assert_eq!(report.job_title, "Data Analyst");
        assert!(report.gaps.is_empty());
        assert_eq!(model.calls(), 3);
    }

    #[test]
    fn test_experience_gap_has_no_levels() {
        let item = json!({"type": "Experience", "competency": "Client work", "current_level": 1});
        let gap = to_gap(&item, &[]).unwrap();
        assert_eq!(gap.gap_type, GapType::Experience);
        assert_eq!(gap.current_level, None);
    }

    #[test]
    fn test_skill_gap_borrows_known_level() {
        let item = json!({"type": "skill", "competency": "leadership", "required_level": 9});
        let known = vec![CompetencyLevel {
            competency: "Leadership".to_string(),
            level: 2,
        }];
        let gap = to_gap(&item, &known).unwrap();
        assert_eq!(gap.current_level, Some(2));
        assert_eq!(gap.required_level, Some(5));
    }
}
