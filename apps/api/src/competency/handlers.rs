use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::competency::{CompetencyRecord, ScoredCompetency};
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_TOP_K: usize = 5;
const MAX_TOP_K: usize = 50;

#[derive(Debug, Deserialize)]
pub struct CompetencyQuery {
    pub q: String,
    pub top_k: Option<usize>,
}

/// GET /api/v1/competencies?q=&top_k=
pub async fn handle_query_competencies(
    State(state): State<AppState>,
    Query(params): Query<CompetencyQuery>,
) -> Result<Json<Vec<ScoredCompetency>>, AppError> {
    let text = params.q.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Query 'q' must not be empty".to_string()));
    }
    let top_k = params.top_k.unwrap_or(DEFAULT_TOP_K).min(MAX_TOP_K);
    Ok(Json(state.competencies.query(text, top_k).await?))
}

/// GET /api/v1/competencies/:name
pub async fn handle_get_competency(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CompetencyRecord>, AppError> {
    state
        .competencies
        .find_by_name(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Competency '{name}' not found")))
}
