use axum::{Json, extract::State};
use hr_common::dataset::load_records;
use hr_metrics::INDEX_RELOADS_TOTAL;
use metrics::counter;
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::{SharedState, report_skipped};

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub loaded: usize,
    pub skipped: usize,
    pub previous: usize,
    pub built_at: String,
}

/// Re-read the dataset and swap in a new index. On failure the current index
/// stays in place.
pub async fn reload(State(state): State<SharedState>) -> Result<Json<ReloadResponse>, ApiError> {
    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || rebuild(&worker_state))
        .await
        .map_err(|err| ApiError::Internal(format!("reload task failed: {err}")))
        .and_then(|inner| inner);

    let outcome = if result.is_ok() { "ok" } else { "error" };
    counter!(INDEX_RELOADS_TOTAL, "outcome" => outcome).increment(1);
    result.map(Json)
}

fn rebuild(state: &SharedState) -> Result<ReloadResponse, ApiError> {
    let path = &state.config.data_path;
    let records = load_records(path)?;
    let index = state.engine.build_index(records);
    report_skipped(&index, path);

    let loaded = index.len();
    let skipped = index.skipped().len();
    let built_at = index.built_at().to_rfc3339();
    let previous = state.swap_index(index).len();

    info!(loaded, skipped, previous, "corpus index reloaded");

    Ok(ReloadResponse {
        loaded,
        skipped,
        previous,
        built_at,
    })
}
