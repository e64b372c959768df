//! Profile summarizer: raw CV / manual input → competency-focused summary.

use tracing::info;

use crate::agents::prompts::PROFILE_SUMMARY_TEMPLATE;
use crate::agents::AGENT_MAX_ATTEMPTS;
use crate::errors::AppError;
use crate::llm_client::{self, CompletionModel, LlmError};
use crate::retry::{retry, RetryPolicy};

/// Summarizes the user's profile. There is no meaningful default summary, so
/// exhausting the retries surfaces as "model unavailable".
pub async fn summarize_profile(
    input_text: &str,
    model: &dyn CompletionModel,
) -> Result<String, AppError> {
    let prompt = PROFILE_SUMMARY_TEMPLATE.replace("{input_text}", input_text);
    let policy = RetryPolicy::new(AGENT_MAX_ATTEMPTS).with_classifier(llm_client::classify_error);

    let prompt = &prompt;
    let summary = retry(policy, "Profile summary", |_| async move {
        let text = model.complete(prompt, &[]).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(text.to_string())
    })
    .await
    .map_err(|e| AppError::Llm(e.to_string()))?;

    info!("Profile summarized ({} chars)", summary.len());
    Ok(summary)
}
