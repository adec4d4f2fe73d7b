use axum::{Json, extract::State};
use serde_json::json;

use crate::SharedState;
use crate::error::ApiError;

pub async fn livez() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn readyz(State(state): State<SharedState>) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.is_ready() {
        return Err(ApiError::ServiceUnavailable("shutting_down".into()));
    }

    let index = state.index();

    Ok(Json(json!({
        "status": "ok",
        "application": env!("CARGO_PKG_NAME"),
        "employees_loaded": index.len(),
        "encoder": index.encoder_name(),
        "encoder_version": index.encoder_version(),
        "index_built_at": index.built_at().to_rfc3339(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hr_common::{Availability, EmployeeRecord};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn readyz_rejects_when_readiness_disabled() {
        let state = crate::test_state(Vec::new());
        state.readiness.store(false, Ordering::SeqCst);

        match readyz(State(state)).await {
            Err(ApiError::ServiceUnavailable(code)) => assert!(code.contains("shutting_down")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn readyz_reports_loaded_count() {
        let record = EmployeeRecord::new(1, "Ada", &["Rust"], 2.0, Availability::Busy);
        let state = crate::test_state(vec![record]);

        let Json(body) = readyz(State(state)).await.unwrap();

        assert_eq!(body["employees_loaded"], 1);
        assert_eq!(body["encoder"], "hash");
        assert_eq!(body["encoder_version"], "v1");
    }
}
