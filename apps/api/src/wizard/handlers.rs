use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::agents::gap_analyzer::{COMPACT_GAP_LIMIT, FULL_GAP_LIMIT};
use crate::agents::job_recommender::recommend_jobs;
use crate::errors::AppError;
use crate::jobs::pagination::{clamp_page, navigate, paginate, Nav, Page};
use crate::jobs::pipeline::PipelineStatus;
use crate::models::analysis::LearningPlan;
use crate::models::job::{JobListing, JobPreferences, JobRecommendation};
use crate::models::profile::{CompetencyProfile, ManualProfile, ProfileInput};
use crate::state::AppState;
use crate::wizard::session::{GapAnalysis, WizardSession, JOB_RESULTS_SECTION};
use crate::wizard::stages::{run_gap_stage, run_learning_plan_stage, run_summary_stage};

async fn load_session(state: &AppState, id: Uuid) -> Result<WizardSession, AppError> {
    state
        .sessions
        .load(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

async fn save_session(state: &AppState, session: &mut WizardSession) -> Result<(), AppError> {
    session.touch();
    state.sessions.save(session).await?;
    Ok(())
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<WizardSession>), AppError> {
    let mut session = WizardSession::new();
    save_session(&state, &mut session).await?;
    info!("Created wizard session {}", session.id);
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSession>, AppError> {
    Ok(Json(load_session(&state, id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub cv_text: Option<String>,
    pub linkedin_url: Option<String>,
    pub manual: Option<ManualProfile>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub session_id: Uuid,
    /// Which input the summarizer will read: `cv`, `linkedin` or `manual`.
    pub input_source: &'static str,
}

fn input_source(profile: &ProfileInput) -> &'static str {
    if profile.cv_text().is_some() {
        "cv"
    } else if profile
        .linkedin_url
        .as_deref()
        .is_some_and(|u| !u.trim().is_empty())
    {
        "linkedin"
    } else {
        "manual"
    }
}

async fn store_profile(
    state: &AppState,
    mut session: WizardSession,
    profile: ProfileInput,
) -> Result<ProfileResponse, AppError> {
    if profile.summarizer_input().is_none() {
        return Err(AppError::Validation(
            "Provide CV text, a LinkedIn URL or at least one profile field".to_string(),
        ));
    }
    let input_source = input_source(&profile);
    session.set_profile(profile);
    save_session(state, &mut session).await?;
    Ok(ProfileResponse {
        session_id: session.id,
        input_source,
    })
}

/// POST /api/v1/sessions/:id/profile
pub async fn handle_submit_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let session = load_session(&state, id).await?;
    let profile = ProfileInput {
        cv_text: req.cv_text,
        linkedin_url: req.linkedin_url,
        manual: req.manual,
    };
    Ok(Json(store_profile(&state, session, profile).await?))
}

/// POST /api/v1/sessions/:id/profile/cv
/// Multipart upload; the PDF in field `file` becomes the profile's CV text.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let session = load_session(&state, id).await?;

    let mut pdf_bytes = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
            pdf_bytes = Some(bytes);
            break;
        }
    }
    let pdf_bytes =
        pdf_bytes.ok_or_else(|| AppError::Validation("Missing multipart field 'file'".to_string()))?;

    // PDF parsing is CPU-bound.
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf_bytes))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
        })?
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "The PDF contains no extractable text".to_string(),
        ));
    }
    info!("Extracted {} characters from uploaded CV", text.len());

    let mut profile = session.profile.clone().unwrap_or_default();
    profile.cv_text = Some(text);
    Ok(Json(store_profile(&state, session, profile).await?))
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub current_title: String,
    pub competency_profile: CompetencyProfile,
}

/// POST /api/v1/sessions/:id/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SummaryResponse>, AppError> {
    let mut session = load_session(&state, id).await?;
    let profile = session.require_profile()?.clone();

    let outcome = run_summary_stage(&profile, &state.competencies, state.llm.as_ref()).await?;
    session.set_summary(
        outcome.summary.clone(),
        outcome.current_title.clone(),
        outcome.profile.clone(),
    );
    save_session(&state, &mut session).await?;

    Ok(Json(SummaryResponse {
        summary: outcome.summary,
        current_title: outcome.current_title,
        competency_profile: outcome.profile,
    }))
}

/// POST /api/v1/sessions/:id/recommendations
/// Computed once per session; later calls return the stored list.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<JobRecommendation>>, AppError> {
    let mut session = load_session(&state, id).await?;
    if let Some(existing) = &session.recommendations {
        return Ok(Json(existing.clone()));
    }

    let competencies = session.require_competency_profile()?.combined.clone();
    let recommendations = recommend_jobs(&competencies, state.llm.as_ref()).await;
    session.set_recommendations(recommendations.clone());
    save_session(&state, &mut session).await?;
    Ok(Json(recommendations))
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    /// Index into the session's recommendations.
    pub index: usize,
    #[serde(default)]
    pub preferences: JobPreferences,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected_job: JobRecommendation,
    pub preferences: JobPreferences,
}

/// POST /api/v1/sessions/:id/selection
pub async fn handle_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    let mut session = load_session(&state, id).await?;
    let recommendations = session.require_recommendations()?;
    let job = recommendations.get(req.index).cloned().ok_or_else(|| {
        AppError::Validation(format!(
            "Recommendation index {} out of range (have {})",
            req.index,
            recommendations.len()
        ))
    })?;

    session.select_job(job.clone(), req.preferences.clone());
    save_session(&state, &mut session).await?;
    Ok(Json(SelectionResponse {
        selected_job: job,
        preferences: req.preferences,
    }))
}

#[derive(Debug, Serialize)]
pub struct JobsPageResponse {
    pub query: String,
    pub status: PipelineStatus,
    pub total_jobs: usize,
    #[serde(flatten)]
    pub page: Page<JobListing>,
}

fn jobs_page(session: &WizardSession, page_size: usize) -> Result<JobsPageResponse, AppError> {
    let results = session.require_job_results()?;
    Ok(JobsPageResponse {
        query: results.query.clone(),
        status: results.status,
        total_jobs: results.listings.len(),
        page: paginate(&results.listings, session.page(JOB_RESULTS_SECTION), page_size),
    })
}

/// POST /api/v1/sessions/:id/jobs/search
/// Runs the job pipeline for the selected recommendation and returns page 1.
pub async fn handle_job_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobsPageResponse>, AppError> {
    let mut session = load_session(&state, id).await?;
    let title = session.require_selected_job()?.title.clone();
    let summary = session.require_summary()?.to_string();

    let outcome = state.pipeline.run(&title, &summary).await;
    info!(
        "Job search for '{title}' finished: {:?}, {} listing(s)",
        outcome.status,
        outcome.listings.len()
    );
    session.set_job_results(title, outcome);
    save_session(&state, &mut session).await?;

    Ok(Json(jobs_page(&session, state.pipeline.config().page_size)?))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub nav: Option<Nav>,
}

/// GET /api/v1/sessions/:id/jobs?page=&nav=
/// `page` jumps to a page, `nav` moves one page; both clamp to the valid range.
pub async fn handle_job_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Json<JobsPageResponse>, AppError> {
    let mut session = load_session(&state, id).await?;
    let page_size = state.pipeline.config().page_size;
    let count = session.require_job_results()?.listings.len();

    let current = session.page(JOB_RESULTS_SECTION);
    let target = match (query.page, query.nav) {
        (Some(page), _) => clamp_page(page, count, page_size),
        (None, Some(nav)) => navigate(current, nav, count, page_size),
        (None, None) => clamp_page(current, count, page_size),
    };
    if target != current {
        session.pages.insert(JOB_RESULTS_SECTION.to_string(), target);
        save_session(&state, &mut session).await?;
    }

    Ok(Json(jobs_page(&session, page_size)?))
}

/// POST /api/v1/sessions/:id/jobs/:index/interest
/// `index` is the posting's position in the full result list.
pub async fn handle_job_interest(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<JobListing>, AppError> {
    let mut session = load_session(&state, id).await?;
    let listings = &session.require_job_results()?.listings;
    let posting = listings.get(index).cloned().ok_or_else(|| {
        AppError::Validation(format!(
            "Job index {index} out of range (have {})",
            listings.len()
        ))
    })?;

    session.select_posting(posting.clone());
    save_session(&state, &mut session).await?;
    Ok(Json(posting))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GapRequest {
    /// Caps the list at the compact size instead of the full one.
    pub compact: bool,
}

/// POST /api/v1/sessions/:id/gaps
pub async fn handle_gap_analysis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    req: Option<Json<GapRequest>>,
) -> Result<Json<GapAnalysis>, AppError> {
    let req = req.map(|Json(r)| r).unwrap_or_default();
    let mut session = load_session(&state, id).await?;
    let summary = session.require_summary()?.to_string();
    let posting = session.require_selected_posting()?.clone();
    let competencies = session.require_competency_profile()?.combined.clone();
    let max_gaps = if req.compact {
        COMPACT_GAP_LIMIT
    } else {
        FULL_GAP_LIMIT
    };

    let analysis = run_gap_stage(
        &posting,
        &summary,
        &competencies,
        max_gaps,
        state.llm.as_ref(),
    )
    .await;
    session.set_gap_analysis(analysis.clone());
    save_session(&state, &mut session).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/sessions/:id/learning-plan
pub async fn handle_learning_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LearningPlan>, AppError> {
    let mut session = load_session(&state, id).await?;
    let analysis = session.require_gap_analysis()?.clone();
    let posting = session.require_selected_posting()?.clone();
    let summary = session.require_summary()?.to_string();

    let plan = run_learning_plan_stage(&posting, &summary, &analysis, state.llm.as_ref()).await;
    session.learning_plan = Some(plan.clone());
    save_session(&state, &mut session).await?;
    Ok(Json(plan))
}
