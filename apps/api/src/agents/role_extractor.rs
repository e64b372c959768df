//! Single-value extractors for the user's role.

use tracing::warn;

use crate::agents::prompts::{CURRENT_TITLE_TEMPLATE, LATEST_ROLE_TEMPLATE};
use crate::llm_client::prompts::SINGLE_VALUE_INSTRUCTION;
use crate::llm_client::CompletionModel;

pub const UNKNOWN_ROLE: &str = "Unknown Role";

/// Title of the latest job held, as written in the summary.
pub async fn extract_latest_role(summary: &str, model: &dyn CompletionModel) -> String {
    let prompt = LATEST_ROLE_TEMPLATE
        .replace("{summary}", summary)
        .replace("{single_value}", SINGLE_VALUE_INSTRUCTION);
    ask_single_value(model, &prompt, "latest role")
        .await
        .unwrap_or_else(|| UNKNOWN_ROLE.to_string())
}

/// Current job title, title-cased ("data scientist" → "Data Scientist").
pub async fn extract_current_title(summary: &str, model: &dyn CompletionModel) -> String {
    let prompt = CURRENT_TITLE_TEMPLATE
        .replace("{summary}", summary)
        .replace("{single_value}", SINGLE_VALUE_INSTRUCTION);
    ask_single_value(model, &prompt, "current title")
        .await
        .map(|t| title_case(&t))
        .unwrap_or_else(|| UNKNOWN_ROLE.to_string())
}

async fn ask_single_value(model: &dyn CompletionModel, prompt: &str, what: &str) -> Option<String> {
    match model.complete(prompt, &[]).await {
        Ok(reply) => clean_single_value(&reply),
        Err(e) => {
            warn!("Extracting {what} failed: {e}");
            None
        }
    }
}

/// First non-empty line, without surrounding quotes, bullets or a trailing period.
fn clean_single_value(reply: &str) -> Option<String> {
    let line = reply.lines().map(str::trim).find(|l| !l.is_empty())?;
    let cleaned = line
        .trim_start_matches(&['-', '*'][..])
        .trim()
        .trim_end_matches('.')
        .trim_matches(&['"', '\'', '`'][..])
        .trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("data scientist"), "Data Scientist");
        assert_eq!(title_case("HR MANAGER"), "Hr Manager");
        assert_eq!(title_case("front-end developer"), "Front-End Developer");
    }

    #[test]
    fn test_clean_single_value() {
        assert_eq!(
            clean_single_value("\n  \"Senior Data Analyst\".\n").as_deref(),
            Some("Senior Data Analyst")
        );
        assert_eq!(clean_single_value("- Engineer").as_deref(), Some("Engineer"));
        assert_eq!(clean_single_value("   \n  "), None);
    }

    #[tokio::test]
    async fn test_latest_role_falls_back_when_model_down() {
        let model = ScriptedModel::unavailable();
        assert_eq!(extract_latest_role("summary", &model).await, UNKNOWN_ROLE);
    }

    #[tokio::test]
    async fn test_current_title_is_title_cased() {
        let model = ScriptedModel::new([Some("software engineer")]);
        assert_eq!(
            extract_current_title("summary", &model).await,
            "Software Engineer"
        );
    }
}
