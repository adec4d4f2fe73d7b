pub mod chat;
pub mod corpus;
pub mod employees;
pub mod health;
pub mod stats;

use crate::MAX_RESULTS_LIMIT;

/// Requested result count, defaulted and capped. Zero passes through so the
/// engine rejects it.
pub(crate) fn resolve_max_results(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).min(MAX_RESULTS_LIMIT)
}
