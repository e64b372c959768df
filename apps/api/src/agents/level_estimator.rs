//! Level estimator: one competency, one digit.

use tracing::warn;

use crate::agents::prompts::LEVEL_ESTIMATE_TEMPLATE;
use crate::llm_client::CompletionModel;

/// Used whenever the reply cannot be read as an integer.
pub const NEUTRAL_LEVEL: u8 = 3;

/// Estimates the user's 1–5 level for `competency`. Never fails.
pub async fn estimate_level(
    competency: &str,
    summary: &str,
    model: &dyn CompletionModel,
) -> u8 {
    let prompt = LEVEL_ESTIMATE_TEMPLATE
        .replace("{summary}", summary)
        .replace("{competency}", competency);

    match model.complete(&prompt, &[]).await {
        Ok(reply) => parse_level(&reply),
        Err(e) => {
            warn!("Level estimate for '{competency}' failed: {e}");
            NEUTRAL_LEVEL
        }
    }
}

/// The whole trimmed reply must be an integer; it is clamped to 1..=5.
pub fn parse_level(reply: &str) -> u8 {
    reply
        .trim()
        .parse::<i64>()
        .map(|n| n.clamp(1, 5) as u8)
        .unwrap_or(NEUTRAL_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    #[test]
    fn test_parse_level_clamps() {
        assert_eq!(parse_level("4"), 4);
        assert_eq!(parse_level(" 5\n"), 5);
        assert_eq!(parse_level("9"), 5);
        assert_eq!(parse_level("0"), 1);
        assert_eq!(parse_level("-2"), 1);
    }

    #[test]
    fn test_unparseable_reply_is_neutral() {
        assert_eq!(parse_level("Level 4"), 3);
        assert_eq!(parse_level("4.5"), 3);
        assert_eq!(parse_level(""), 3);
    }

    #[tokio::test]
    async fn test_estimate_uses_reply() {
        let model = ScriptedModel::new([Some("2")]);
        assert_eq!(estimate_level("SQL", "summary", &model).await, 2);
        assert!(model.prompts()[0].contains("SQL"));
    }

    #[tokio::test]
    async fn test_model_failure_is_neutral() {
        let model = ScriptedModel::unavailable();
        assert_eq!(estimate_level("SQL", "summary", &model).await, NEUTRAL_LEVEL);
    }
}
