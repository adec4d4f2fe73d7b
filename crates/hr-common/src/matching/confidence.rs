use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::query::QueryConstraints;

use super::{ConstraintKind, ScoredCandidate};

/// Blend of the two confidence signals. Normalised to sum to 1 before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceWeights {
    pub semantic: f32,
    pub coverage: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            semantic: 0.7,
            coverage: 0.3,
        }
    }
}

impl ConfidenceWeights {
    /// Weights scaled to sum to 1. Negative, non-finite or all-zero weights
    /// fall back to the defaults.
    pub fn normalized(&self) -> Self {
        let valid = |w: f32| w.is_finite() && w >= 0.0;
        let sum = self.semantic + self.coverage;
        if !valid(self.semantic) || !valid(self.coverage) || sum <= 0.0 {
            warn!(
                semantic = self.semantic,
                coverage = self.coverage,
                "invalid confidence weights; using defaults"
            );
            return Self::default();
        }
        Self {
            semantic: self.semantic / sum,
            coverage: self.coverage / sum,
        }
    }
}

/// Collapses a ranked result into a single 0..1 confidence value.
///
/// `confidence = top * (semantic + coverage * covered / 5)` with normalised
/// weights, so it never exceeds the top similarity and rises strictly with
/// coverage whenever the top similarity is positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceEstimator {
    weights: ConfidenceWeights,
}

impl ConfidenceEstimator {
    pub fn new(weights: ConfidenceWeights) -> Self {
        Self {
            weights: weights.normalized(),
        }
    }

    pub fn weights(&self) -> ConfidenceWeights {
        self.weights
    }

    /// Fraction of the constraint fields that are set and satisfied by `top`.
    pub fn coverage(top: &ScoredCandidate<'_>, constraints: &QueryConstraints) -> f32 {
        let covered = ConstraintKind::ALL
            .into_iter()
            .filter(|kind| is_set(*kind, constraints) && top.matched.get(*kind))
            .count();
        covered as f32 / QueryConstraints::FIELD_COUNT as f32
    }

    pub fn estimate(
        &self,
        ranked: &[ScoredCandidate<'_>],
        constraints: &QueryConstraints,
        candidate_pool_size: usize,
    ) -> f32 {
        let Some(top) = ranked.first() else {
            return 0.0;
        };
        if candidate_pool_size == 0 {
            return 0.0;
        }

        let similarity = top.similarity.clamp(0.0, 1.0);
        let coverage = Self::coverage(top, constraints);
        let blended = similarity * (self.weights.semantic + self.weights.coverage * coverage);
        blended.clamp(0.0, similarity)
    }
}

fn is_set(kind: ConstraintKind, constraints: &QueryConstraints) -> bool {
    match kind {
        ConstraintKind::Skills => !constraints.skills.is_empty(),
        ConstraintKind::MinExperience => constraints.min_experience.is_some(),
        ConstraintKind::MaxExperience => constraints.max_experience.is_some(),
        ConstraintKind::Availability => constraints.availability.is_some(),
        ConstraintKind::Department => constraints.department.is_some(),
    }
}
