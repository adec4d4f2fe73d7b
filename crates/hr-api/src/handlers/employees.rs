use axum::{
    Json,
    extract::{Path, Query, State},
};
use hr_common::{Availability, EmployeeId, EmployeeRecord, ExplicitFilters};
use hr_metrics::QUERIES_TOTAL;
use metrics::counter;
use serde::Deserialize;

use super::resolve_max_results;
use crate::SharedState;
use crate::error::ApiError;

const DEFAULT_SEARCH_RESULTS: usize = 10;

pub async fn list_employees(State(state): State<SharedState>) -> Json<Vec<EmployeeRecord>> {
    Json(state.index().records().cloned().collect())
}

pub async fn get_employee(
    State(state): State<SharedState>,
    Path(id): Path<EmployeeId>,
) -> Result<Json<EmployeeRecord>, ApiError> {
    let index = state.index();
    let record = index.lookup(id)?;
    Ok(Json(record.clone()))
}

/// Query string of `/api/employees/search`. Skills are comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub skills: Option<String>,
    pub min_experience: Option<f64>,
    pub max_experience: Option<f64>,
    pub availability: Option<String>,
    pub department: Option<String>,
    pub max_results: Option<usize>,
}

impl SearchParams {
    fn to_filters(&self) -> Result<ExplicitFilters, ApiError> {
        let skills = self.skills.as_deref().map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|skill| !skill.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        let availability = self
            .availability
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(str::parse::<Availability>)
            .transpose()?;

        Ok(ExplicitFilters {
            skills,
            min_experience: self.min_experience,
            max_experience: self.max_experience,
            availability,
            department: self.department.clone(),
        })
    }
}

pub async fn search_employees(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<EmployeeRecord>>, ApiError> {
    let result = search(&state, &params);
    let outcome = if result.is_ok() { "ok" } else { "error" };
    counter!(QUERIES_TOTAL, "endpoint" => "search", "outcome" => outcome).increment(1);
    result.map(Json)
}

fn search(state: &SharedState, params: &SearchParams) -> Result<Vec<EmployeeRecord>, ApiError> {
    let filters = params.to_filters()?;
    let max_results = resolve_max_results(params.max_results, DEFAULT_SEARCH_RESULTS);
    let index = state.index();
    let records = state
        .engine
        .structured_search(&index, &filters, max_results)?;
    Ok(records.into_iter().cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_skills_and_parses_availability() {
        let params = SearchParams {
            skills: Some("Python, ,AWS".into()),
            availability: Some("on leave".into()),
            ..Default::default()
        };

        let filters = params.to_filters().unwrap();

        assert_eq!(
            filters.skills,
            Some(vec!["Python".to_string(), "AWS".to_string()])
        );
        assert_eq!(filters.availability, Some(Availability::OnLeave));
    }

    #[test]
    fn unknown_availability_is_a_bad_request() {
        let params = SearchParams {
            availability: Some("sleeping".into()),
            ..Default::default()
        };

        let err = params.to_filters().unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
