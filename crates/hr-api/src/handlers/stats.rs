use axum::{Json, extract::State};
use hr_common::CorpusStats;

use crate::SharedState;

pub async fn get_stats(State(state): State<SharedState>) -> Json<CorpusStats> {
    Json(state.index().stats())
}
