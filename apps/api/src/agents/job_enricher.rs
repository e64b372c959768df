//! Job enricher/scorer: one LLM call annotates and scores a batch of raw postings.
//!
//! This agent makes exactly one attempt. Retry, failure logging and the raw
//! fallback belong to the pipeline (`crate::jobs::pipeline`).

use serde_json::Value;
use thiserror::Error;

use crate::agents::prompts::JOB_ENRICHMENT_TEMPLATE;
use crate::agents::NOT_PROVIDED;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{parse_json_reply, CompletionModel, LlmError};
use crate::models::job::{EnrichedJob, RawJobPosting};
use crate::models::lenient::{score_field, text_field};

/// Postings beyond the first five are never sent to the model.
pub const MAX_JOBS_PER_BATCH: usize = 5;

/// Score given to records the model said nothing useful about.
pub const FALLBACK_MATCH_SCORE: u8 = 20;

const DESCRIPTION_FALLBACK_CHARS: usize = 300;
const UNKNOWN_ROLE: &str = "Unknown Role";
const UNKNOWN_COMPANY: &str = "Unknown Company";

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("enrichment reply was not a JSON array")]
    NotAnArray,

    #[error("enrichment reply had no usable records ({returned} returned, {auto_filled} auto-filled)")]
    Unusable { returned: usize, auto_filled: usize },
}

/// Output of one enrichment call.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedBatch {
    pub jobs: Vec<EnrichedJob>,
    /// How many records got the auto-fill fallback.
    pub auto_filled: usize,
}

impl EnrichedBatch {
    /// A batch carries model signal when at least one record was not auto-filled.
    pub fn is_usable(&self) -> bool {
        !self.jobs.is_empty() && self.auto_filled < self.jobs.len()
    }
}

/// Enriches the first `MAX_JOBS_PER_BATCH` postings in a single model call.
///
/// Model records are paired with raw postings by position; extra records are
/// dropped. Whether the batch is good enough is the caller's call
/// (`EnrichedBatch::is_usable`).
pub async fn enrich_and_score(
    postings: &[RawJobPosting],
    summary: &str,
    model: &dyn CompletionModel,
) -> Result<EnrichedBatch, EnrichmentError> {
    let batch = &postings[..postings.len().min(MAX_JOBS_PER_BATCH)];
    let jobs_json = serde_json::to_string_pretty(batch).map_err(LlmError::Parse)?;
    let prompt = JOB_ENRICHMENT_TEMPLATE
        .replace("{summary}", summary)
        .replace("{jobs_json}", &jobs_json)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);

    let reply = model.complete(&prompt, &[]).await?;
    let records = match parse_json_reply::<Value>(&reply) {
        Ok(Value::Array(records)) => records,
        _ => return Err(EnrichmentError::NotAnArray),
    };

    let mut enriched = EnrichedBatch {
        jobs: Vec::with_capacity(batch.len()),
        auto_filled: 0,
    };
    for (record, raw) in records.iter().zip(batch) {
        let (job, auto_filled) = enrich_record(record, raw);
        if auto_filled {
            enriched.auto_filled += 1;
        }
        enriched.jobs.push(job);
    }
    Ok(enriched)
}

/// Builds one enriched job from a model record, filling gaps from the raw posting.
/// The flag reports whether the auto-fill fallback was applied.
pub fn enrich_record(record: &Value, raw: &RawJobPosting) -> (EnrichedJob, bool) {
    let model_fit_reason = text_field(record, "fit_reason");
    let model_score = score_field(record, "match_score").unwrap_or(0);

    let mut job = EnrichedJob {
        role: text_field(record, "role")
            .or_else(|| non_blank(&raw.title))
            .unwrap_or_else(|| UNKNOWN_ROLE.to_string()),
        company: text_field(record, "company")
            .or_else(|| non_blank(&raw.company))
            .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
        company_type: text_field(record, "company_type").unwrap_or_default(),
        location: text_field(record, "location").unwrap_or_else(|| raw.location.clone()),
        industry: text_field(record, "industry").unwrap_or_default(),
        pay_usd: text_field(record, "pay_usd").unwrap_or_default(),
        fit_reason: model_fit_reason
            .clone()
            .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        match_score: model_score,
        description: text_field(record, "description")
            .unwrap_or_else(|| raw.description.chars().take(DESCRIPTION_FALLBACK_CHARS).collect()),
        link: text_field(record, "link").unwrap_or_else(|| raw.link.clone()),
    };

    let auto_filled = model_fit_reason.is_none() && model_score == 0;
    if auto_filled {
        job.fit_reason = format!("Auto-filled from raw data. Role: {}", raw.title);
        job.match_score = FALLBACK_MATCH_SCORE;
    }
    (job, auto_filled)
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
