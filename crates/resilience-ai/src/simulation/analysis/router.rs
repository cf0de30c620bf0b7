use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::super::baseline::BaselineProvider;
use super::super::scenario::ScenarioInterpreter;
use super::super::taxonomy::{Aspect, Country};
use super::{AnalysisError, AnalysisService};

const ANONYMOUS_USER: &str = "anonymous";

/// Router exposing the analysis pipeline. HTTP shaping stays thin: every
/// handler delegates to [`AnalysisService`] and maps its errors.
pub fn analysis_router<P, I>(service: Arc<AnalysisService<P, I>>) -> Router
where
    P: BaselineProvider + ?Sized + 'static,
    I: ScenarioInterpreter + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/analysis/analyze", post(analyze_handler::<P, I>))
        .route("/api/v1/analysis/results", get(results_handler::<P, I>))
        .route("/api/v1/analysis/countries", get(countries_handler))
        .route("/api/v1/analysis/aspects", get(aspects_handler))
        .route("/api/v1/analysis/baseline", get(baseline_handler::<P, I>))
        .route(
            "/api/v1/analysis/baseline/audit",
            get(baseline_audit_handler::<P, I>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeRequest {
    #[serde(default)]
    pub(crate) headline: String,
    #[serde(default)]
    pub(crate) user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsQuery {
    #[serde(default)]
    pub(crate) user: Option<String>,
}

pub(crate) async fn analyze_handler<P, I>(
    State(service): State<Arc<AnalysisService<P, I>>>,
    axum::Json(request): axum::Json<AnalyzeRequest>,
) -> Response
where
    P: BaselineProvider + ?Sized + 'static,
    I: ScenarioInterpreter + ?Sized + 'static,
{
    let user = request.user.as_deref().unwrap_or(ANONYMOUS_USER);
    match service.analyze(user, &request.headline).await {
        Ok(result) => (StatusCode::OK, axum::Json(result.as_ref().clone())).into_response(),
        Err(AnalysisError::EmptyHeadline) => {
            let payload = json!({ "error": "Headline cannot be empty" });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(AnalysisError::InterpretationUnavailable(details)) => {
            let payload = json!({
                "error": "Scenario analysis unavailable",
                "details": details,
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn results_handler<P, I>(
    State(service): State<Arc<AnalysisService<P, I>>>,
    Query(query): Query<ResultsQuery>,
) -> Response
where
    P: BaselineProvider + ?Sized + 'static,
    I: ScenarioInterpreter + ?Sized + 'static,
{
    let user = query.user.as_deref().unwrap_or(ANONYMOUS_USER);
    match service.last_result(user) {
        Some(result) => (StatusCode::OK, axum::Json(result.as_ref().clone())).into_response(),
        None => {
            let payload = json!({
                "analysis": "No analysis yet. Send a scenario headline to get started.",
                "country_scores": {},
                "aspect_scores": {},
                "explanations": {},
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn countries_handler() -> axum::Json<serde_json::Value> {
    let countries: Vec<&str> = Country::ALL.iter().map(|country| country.name()).collect();
    axum::Json(json!({ "countries": countries }))
}

pub(crate) async fn aspects_handler() -> axum::Json<serde_json::Value> {
    let aspects: Vec<&str> = Aspect::ALL.iter().map(|aspect| aspect.label()).collect();
    axum::Json(json!({ "aspects": aspects }))
}

pub(crate) async fn baseline_handler<P, I>(
    State(service): State<Arc<AnalysisService<P, I>>>,
) -> Response
where
    P: BaselineProvider + ?Sized + 'static,
    I: ScenarioInterpreter + ?Sized + 'static,
{
    match service.baseline().await {
        Ok(snapshot) => {
            (StatusCode::OK, axum::Json(snapshot.as_ref().clone())).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn baseline_audit_handler<P, I>(
    State(service): State<Arc<AnalysisService<P, I>>>,
) -> Response
where
    P: BaselineProvider + ?Sized + 'static,
    I: ScenarioInterpreter + ?Sized + 'static,
{
    match service.baseline_audit().await {
        Ok(audit) => (StatusCode::OK, axum::Json(audit)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
