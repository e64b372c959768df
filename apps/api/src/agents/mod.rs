// Agents: one prompt each, typed input in, validated output out.
// Every call goes through `llm_client::CompletionModel`; no agent talks HTTP.
// Parse failures never escape an agent. Each one either retries or returns
// its documented default.

pub mod competency_mapper;
pub mod cv_strengths;
pub mod gap_analyzer;
pub mod job_enricher;
pub mod job_recommender;
pub mod learning_plan;
pub mod level_estimator;
pub mod prompts;
pub mod requirements;
pub mod role_extractor;
pub mod summarizer;

/// Attempts for agents that retry on unusable output.
pub const AGENT_MAX_ATTEMPTS: u32 = 3;

/// Back-fill for free-text fields the model left out.
pub const NOT_PROVIDED: &str = "Not provided.";
