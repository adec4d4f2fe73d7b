use axum::{Json, extract::State};
use hr_common::{EmployeeRecord, ExplicitFilters};
use hr_metrics::{QUERIES_TOTAL, QUERY_RESULTS};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::resolve_max_results;
use crate::SharedState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub filters: Option<ExplicitFilters>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub matched_employees: Vec<EmployeeRecord>,
    pub confidence_score: f32,
}

pub async fn chat(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let result = answer(&state, &request);
    let outcome = if result.is_ok() { "ok" } else { "error" };
    counter!(QUERIES_TOTAL, "endpoint" => "chat", "outcome" => outcome).increment(1);
    result.map(Json)
}

fn answer(state: &SharedState, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()));
    }

    let max_results = resolve_max_results(request.max_results, state.config.default_max_results);
    let index = state.index();
    let result = state
        .engine
        .query(&index, query, request.filters.as_ref(), max_results)?;

    histogram!(QUERY_RESULTS).record(result.candidates.len() as f64);
    info!(
        returned = result.candidates.len(),
        pool = result.candidate_pool_size,
        confidence = result.confidence,
        "chat query answered"
    );

    let records: Vec<&EmployeeRecord> = result.candidates.iter().map(|c| c.record).collect();

    Ok(ChatResponse {
        response: state.composer.compose(&records),
        matched_employees: records.into_iter().cloned().collect(),
        confidence_score: result.confidence,
    })
}
