pub mod confidence;
pub mod filter;
pub mod ranker;

use serde::Serialize;

pub use confidence::{ConfidenceEstimator, ConfidenceWeights};
pub use filter::{Check, ConstraintFilter, ConstraintKind, FilteredCandidate, MatchedConstraints};
pub use ranker::rank;

use crate::EmployeeRecord;

/// One ranked hit. Borrowed from the index it was retrieved from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate<'a> {
    pub record: &'a EmployeeRecord,
    /// Cosine similarity to the query, clamped to `0.0..=1.0`.
    pub similarity: f32,
    pub matched: MatchedConstraints,
}
