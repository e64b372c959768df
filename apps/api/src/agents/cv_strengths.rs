//! CV-strength extractor: the top competencies evidenced by the raw CV.

use serde_json::Value;
use tracing::warn;

use crate::agents::level_estimator::NEUTRAL_LEVEL;
use crate::agents::prompts::CV_STRENGTHS_TEMPLATE;
use crate::llm_client::prompts::{bullet_list, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{extract_json_array, parse_json_reply, CompletionModel};
use crate::models::lenient::{level_field, text_field};
use crate::models::profile::CompetencyLevel;

/// Single attempt; any failure yields an empty list.
pub async fn extract_top_strengths(
    cv_text: &str,
    competency_names: &[String],
    model: &dyn CompletionModel,
) -> Vec<CompetencyLevel> {
    let prompt = CV_STRENGTHS_TEMPLATE
        .replace("{cv_text}", cv_text)
        .replace("{competency_list}", &bullet_list(competency_names))
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);

    let reply = match model.complete(&prompt, &[]).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("CV strength extraction failed: {e}");
            return Vec::new();
        }
    };

    match parse_strengths(&reply) {
        Some(strengths) => strengths,
        None => {
            warn!("CV strength reply was not a JSON array: {reply:?}");
            Vec::new()
        }
    }
}

/// Accepts a bare array or one buried in prose.
fn parse_strengths(reply: &str) -> Option<Vec<CompetencyLevel>> {
    let items: Vec<Value> = parse_json_reply(reply)
        .ok()
        .or_else(|| extract_json_array(reply).and_then(|a| serde_json::from_str(a).ok()))?;

    Some(
        items
            .iter()
            .filter_map(|item| {
                Some(CompetencyLevel {
                    competency: text_field(item, "competency")?,
                    level: level_field(item, "level").unwrap_or(NEUTRAL_LEVEL),
                })
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    #[test]
    fn test_parse_array_in_prose() {
        let reply = r#"Here are the strengths:
[{"competency": "Data Analytics", "level": 4}, {"competency": "Leadership", "level": "7"}]"#;
        let strengths = parse_strengths(reply).unwrap();
        assert_eq!(strengths.len(), 2);
        assert_eq!(strengths[1].level, 5);
    }

    #[test]
    fn test_entries_without_name_are_skipped() {
        let strengths = parse_strengths(r#"[{"level": 4}, {"competency": "SQL"}]"#).unwrap();
        assert_eq!(
            strengths,
            vec![CompetencyLevel {
                competency: "SQL".to_string(),
                level: NEUTRAL_LEVEL
            }]
        );
    }

    #[tokio::test]
    async fn test_garbage_reply_yields_empty() {
        let model = ScriptedModel::new([Some("I could not read the CV.")]);
        assert!(extract_top_strengths("cv", &[], &model).await.is_empty());
    }
}
