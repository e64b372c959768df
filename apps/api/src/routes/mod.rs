pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::competency::handlers as competency;
use crate::state::AppState;
use crate::wizard::handlers as wizard;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Wizard sessions
        .route("/api/v1/sessions", post(wizard::handle_create_session))
        .route("/api/v1/sessions/:id", get(wizard::handle_get_session))
        .route(
            "/api/v1/sessions/:id/profile",
            post(wizard::handle_submit_profile),
        )
        .route(
            "/api/v1/sessions/:id/profile/cv",
            post(wizard::handle_upload_cv),
        )
        .route("/api/v1/sessions/:id/summary", post(wizard::handle_summary))
        .route(
            "/api/v1/sessions/:id/recommendations",
            post(wizard::handle_recommendations),
        )
        .route(
            "/api/v1/sessions/:id/selection",
            post(wizard::handle_selection),
        )
        .route(
            "/api/v1/sessions/:id/jobs/search",
            post(wizard::handle_job_search),
        )
        .route("/api/v1/sessions/:id/jobs", get(wizard::handle_job_page))
        .route(
            "/api/v1/sessions/:id/jobs/:index/interest",
            post(wizard::handle_job_interest),
        )
        .route("/api/v1/sessions/:id/gaps", post(wizard::handle_gap_analysis))
        .route(
            "/api/v1/sessions/:id/learning-plan",
            post(wizard::handle_learning_plan),
        )
        // Competency store
        .route(
            "/api/v1/competencies",
            get(competency::handle_query_competencies),
        )
        .route(
            "/api/v1/competencies/:name",
            get(competency::handle_get_competency),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::jobs::failure_log::FailureLog;
    use crate::jobs::search::testing::ScriptedSearch;
    use crate::llm_client::testing::ScriptedModel;
    use crate::models::job::RawJobPosting;
    use crate::state::testing::test_state;

    async fn app(model: ScriptedModel, search: ScriptedSearch, dir: &tempfile::TempDir) -> Router {
        let log = FailureLog::new(dir.path().join("failures.log"));
        build_router(test_state(Arc::new(model), Arc::new(search), log).await)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    fn posting(title: &str, company: &str) -> RawJobPosting {
        RawJobPosting {
            title: title.to_string(),
            company: company.to_string(),
            description: format!("{title} role at {company}"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(ScriptedModel::unavailable(), ScriptedSearch::new(vec![]), &dir).await;
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "pathfinder-api");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(ScriptedModel::unavailable(), ScriptedSearch::new(vec![]), &dir).await;
        let uri = format!("/api/v1/sessions/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_skipping_a_step_requires_the_previous_one() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(ScriptedModel::unavailable(), ScriptedSearch::new(vec![]), &dir).await;
        let id = create_session(&app).await;

        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/summary"), None).await;
        assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
        assert_eq!(body["error"]["code"], "PRECONDITION_REQUIRED");

        let (status, _) = send(&app, "POST", &format!("/api/v1/sessions/{id}/gaps"), None).await;
        assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
    }

    #[tokio::test]
    async fn test_empty_profile_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(ScriptedModel::unavailable(), ScriptedSearch::new(vec![]), &dir).await;
        let id = create_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/profile"),
            Some(json!({"cv_text": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_summary_reports_model_outage() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(ScriptedModel::unavailable(), ScriptedSearch::new(vec![]), &dir).await;
        let id = create_session(&app).await;
        send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/profile"),
            Some(json!({"cv_text": "Five years of SQL reporting"})),
        )
        .await;
        let (status, body) = send(&app, "POST", &format!("/api/v1/sessions/{id}/summary"), None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "MODEL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_full_wizard_flow() {
        let enriched = json!([
            {"role": "Data Analyst", "company": "Acme", "fit_reason": "SQL heavy", "match_score": 82},
            {"role": "BI Analyst", "company": "Globex", "fit_reason": "Dashboards", "match_score": 64}
        ]);
        let gaps = json!({
            "job_title": "Data Analyst",
            "gaps": [
                {"type": "skill", "competency": "Data Visualization", "current_level": 2, "required_level": 4},
                {"type": "experience", "competency": "Stakeholder reporting"}
            ]
        });
        let model = ScriptedModel::new([
            Some("Analyst with five years of SQL and Python.".to_string()),
            Some("Data Analyst".to_string()),
            Some("Data Analyst".to_string()),
            Some("Data Analytics, Leadership".to_string()),
            Some("4".to_string()),
            Some("2".to_string()),
            Some(r#"[{"title": "Data Analyst", "level": "Mid", "fit_reason": "Strong SQL"}]"#.to_string()),
            Some(enriched.to_string()),
            Some(r#"{"requirements": [{"requirement": "SQL", "category": "skill", "match_score": 70}]}"#.to_string()),
            Some(gaps.to_string()),
            Some(r#"{"plan": [{"week": 1, "focus_area": "Dashboards"}, {"focus_area": "Reporting"}]}"#.to_string()),
        ]);
        let search = ScriptedSearch::new(vec![vec![
            posting("Data Analyst", "Acme"),
            posting("BI Analyst", "Globex"),
        ]]);
        let dir = tempfile::tempdir().unwrap();
        let app = app(model, search, &dir).await;
        let id = create_session(&app).await;
        let base = format!("/api/v1/sessions/{id}");

        let (status, body) = send(
            &app,
            "POST",
            &format!("{base}/profile"),
            Some(json!({"manual": {"name": "Ayu", "experience": "5 years analyst", "skills": "SQL, Python"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["input_source"], "manual");

        let (status, body) = send(&app, "POST", &format!("{base}/summary"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_title"], "Data Analyst");
        assert_eq!(body["competency_profile"]["combined"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, "POST", &format!("{base}/recommendations"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Data Analyst");

        let (status, _) = send(&app, "POST", &format!("{base}/selection"), Some(json!({"index": 3}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = send(
            &app,
            "POST",
            &format!("{base}/selection"),
            Some(json!({"index": 0, "preferences": {"location": "Jakarta"}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected_job"]["title"], "Data Analyst");

        let (status, body) = send(&app, "POST", &format!("{base}/jobs/search"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "enriched");
        assert_eq!(body["total_jobs"], 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["items"][0]["kind"], "enriched");
        assert_eq!(body["items"][0]["match_score"], 82);

        let (status, body) = send(&app, "GET", &format!("{base}/jobs?nav=next"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["has_next"], false);

        let (status, body) = send(&app, "POST", &format!("{base}/jobs/1/interest"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "BI Analyst");

        let (status, body) = send(&app, "POST", &format!("{base}/gaps"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requirements"][0]["requirement"], "SQL");
        assert_eq!(body["report"]["gaps"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, "POST", &format!("{base}/learning-plan"), None).await;
        assert_eq!(status, StatusCode::OK);
        let weeks = body["plan"].as_array().unwrap();
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[1]["week"], 2);

        let (status, body) = send(&app, "GET", &base, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected_posting"]["company"], "Globex");
        assert!(body["learning_plan"].is_object());
    }

    #[tokio::test]
    async fn test_competency_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(ScriptedModel::unavailable(), ScriptedSearch::new(vec![]), &dir).await;

        let (status, body) = send(&app, "GET", "/api/v1/competencies/leadership", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Leadership");

        let (status, _) = send(&app, "GET", "/api/v1/competencies/Astrology", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "GET", "/api/v1/competencies?q=python%20code&top_k=2", None).await;
        assert_eq!(status, StatusCode::OK);
        let hits = body.as_array().unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0]["competency"]["name"], "Python Programming");

        let (status, _) = send(&app, "GET", "/api/v1/competencies?q=%20", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
