//! Wizard steps as plain functions: declared inputs in, step output out.
//! Handlers own loading and saving the session; nothing here touches it.

use std::collections::HashSet;

use tracing::info;

use crate::agents::competency_mapper::map_competencies_for_role;
use crate::agents::cv_strengths::extract_top_strengths;
use crate::agents::gap_analyzer::{analyze_gaps, COMPACT_GAP_LIMIT};
use crate::agents::learning_plan::generate_learning_plan;
use crate::agents::level_estimator::estimate_level;
use crate::agents::requirements::extract_job_requirements;
use crate::agents::role_extractor::{extract_current_title, extract_latest_role};
use crate::agents::summarizer::summarize_profile;
use crate::competency::{CompetencyRecord, CompetencyStore};
use crate::errors::AppError;
use crate::llm_client::CompletionModel;
use crate::models::analysis::LearningPlan;
use crate::models::job::JobListing;
use crate::models::profile::{
    CompetencyLevel, CompetencyMatch, CompetencyProfile, MatchSource, ProfileInput,
};
use crate::wizard::session::GapAnalysis;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub summary: String,
    pub current_title: String,
    pub profile: CompetencyProfile,
}

/// Summary step: summary, latest role, role-needed competencies with
/// estimated levels, CV strengths, and the merged list for the recommender.
///
/// Only the summarizer can fail the step; every other agent degrades.
pub async fn run_summary_stage(
    input: &ProfileInput,
    store: &CompetencyStore,
    model: &dyn CompletionModel,
) -> Result<SummaryOutcome, AppError> {
    let input_text = input.summarizer_input().ok_or_else(|| {
        AppError::MissingPrecondition("Submit a CV, a LinkedIn URL or profile fields first".into())
    })?;

    let summary = summarize_profile(&input_text, model).await?;
    let latest_role = extract_latest_role(&summary, model).await;
    let current_title = extract_current_title(&summary, model).await;
    let names = store.names();

    let mut role_needed = Vec::new();
    for name in map_competencies_for_role(&latest_role, &names, model).await {
        let Some(record) = store.find_by_name(&name) else {
            continue;
        };
        let level = estimate_level(&record.name, &summary, model).await;
        role_needed.push(to_match(record, level, MatchSource::RoleNeeded));
    }

    let mut cv_strengths = Vec::new();
    if let Some(cv_text) = input.cv_text() {
        for strength in extract_top_strengths(cv_text, &names, model).await {
            if let Some(record) = store.find_by_name(&strength.competency) {
                cv_strengths.push(to_match(record, strength.level, MatchSource::CvStrength));
            }
        }
    }

    let combined = merge_competencies(&role_needed, &cv_strengths);
    info!(
        "Summary step done: role '{latest_role}', {} role competencies, {} CV strengths, {} combined",
        role_needed.len(),
        cv_strengths.len(),
        combined.len()
    );

    Ok(SummaryOutcome {
        summary,
        current_title,
        profile: CompetencyProfile {
            latest_role,
            role_needed,
            cv_strengths,
            combined,
        },
    })
}

fn to_match(record: &CompetencyRecord, level: u8, source: MatchSource) -> CompetencyMatch {
    CompetencyMatch {
        competency: record.name.clone(),
        definition: record.definition.clone(),
        level,
        source,
        levels: record.levels.clone(),
    }
}

/// Role-needed first, then CV strengths; the first occurrence of a name wins.
pub fn merge_competencies(
    role_needed: &[CompetencyMatch],
    cv_strengths: &[CompetencyMatch],
) -> Vec<CompetencyLevel> {
    let mut seen = HashSet::new();
    role_needed
        .iter()
        .chain(cv_strengths)
        .filter(|m| seen.insert(m.competency.to_lowercase()))
        .map(|m| CompetencyLevel {
            competency: m.competency.clone(),
            level: m.level,
        })
        .collect()
}

/// Gap step: requirement extraction, then the gap analysis capped at `max_gaps`.
pub async fn run_gap_stage(
    posting: &JobListing,
    summary: &str,
    competencies: &[CompetencyLevel],
    max_gaps: usize,
    model: &dyn CompletionModel,
) -> GapAnalysis {
    let requirements = extract_job_requirements(posting.description(), summary, model).await;
    let report = analyze_gaps(posting, summary, competencies, max_gaps, model).await;
    GapAnalysis {
        requirements,
        report,
    }
}

/// Learning-plan step. Only the first `COMPACT_GAP_LIMIT` gaps reach the prompt.
pub async fn run_learning_plan_stage(
    posting: &JobListing,
    summary: &str,
    analysis: &GapAnalysis,
    model: &dyn CompletionModel,
) -> LearningPlan {
    let gaps = &analysis.report.gaps[..analysis.report.gaps.len().min(COMPACT_GAP_LIMIT)];
    generate_learning_plan(posting, summary, gaps, &analysis.requirements, model).await
}
