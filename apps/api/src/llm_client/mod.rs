/// LLM client: the single point of entry for every completion call in Pathfinder.
///
/// ARCHITECTURAL RULE: agents never talk HTTP themselves. They receive a
/// `&dyn CompletionModel` and go through it.
///
/// This layer does NOT retry. Each caller owns its retry and fallback policy
/// (see `crate::retry`), because the agents need different ones.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::retry::ErrorClass;

pub mod prompts;

const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM reply is missing \"{0}\"")]
    MissingKey(&'static str),
}

/// One prior turn of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<&'a ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl CompletionResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
    }
}

/// Text-completion seam. `LlmClient` is the production implementation;
/// tests swap in a scripted model.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str, history: &[ChatMessage]) -> Result<String, LlmError>;
}

/// HTTP client for the chat-completions endpoint.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_url,
            api_key,
        })
    }
}

#[async_trait]
impl CompletionModel for LlmClient {
    async fn complete(&self, prompt: &str, history: &[ChatMessage]) -> Result<String, LlmError> {
        let user_turn = ChatMessage::user(prompt);
        let request_body = CompletionRequest {
            messages: history.iter().chain(std::iter::once(&user_turn)).collect(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stream: false,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&body)?;
        let text = parsed.into_text().ok_or(LlmError::EmptyContent)?;

        debug!(
            "LLM call succeeded: prompt_chars={}, reply_chars={}",
            prompt.len(),
            text.len()
        );
        Ok(text)
    }
}

/// Retry classification shared by agents: a rejected request (4xx other than
/// 408/429) will not succeed on a second attempt; everything else might.
pub fn classify_error(error: &LlmError) -> ErrorClass {
    match error {
        LlmError::Api { status, .. }
            if (400..500).contains(status) && *status != 408 && *status != 429 =>
        {
            ErrorClass::Fatal
        }
        _ => ErrorClass::Retryable,
    }
}

/// Calls the model and deserializes the reply as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn complete_json<T: DeserializeOwned>(
    model: &dyn CompletionModel,
    prompt: &str,
) -> Result<T, LlmError> {
    let text = model.complete(prompt, &[]).await?;
    parse_json_reply(&text)
}

/// Parses a model reply as JSON after stripping Markdown fences.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(text);
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Returns the outermost `[ ... ]` span of a reply that wraps a JSON array in prose.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
pub mod testing {
    //! Scripted stand-in for the completion endpoint.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replies are consumed in order; once the script runs dry every call fails.
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Option<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = Option<S>>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// A model that answers every prompt with the same text.
        pub fn always(reply: &str, times: usize) -> Self {
            Self::new(std::iter::repeat(Some(reply.to_string())).take(times))
        }

        /// A model whose endpoint is down.
        pub fn unavailable() -> Self {
            Self::new(Vec::<Option<String>>::new())
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionModel for ScriptedModel {
        async fn complete(
            &self,
            prompt: &str,
            _history: &[ChatMessage],
        ) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.replies.lock().unwrap().pop_front() {
                Some(Some(text)) => Ok(text),
                _ => Err(LlmError::Api {
                    status: 503,
                    message: "scripted outage".to_string(),
                }),
            }
        }
    }
}
