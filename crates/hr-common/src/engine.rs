use serde::Serialize;
use tracing::{debug, info};

use crate::{
    CoreError, CorpusIndex, EmployeeRecord,
    config::EngineConfig,
    embedding::{ProfileEncoder, create_encoder},
    matching::{ConfidenceEstimator, ConstraintFilter, ScoredCandidate, rank},
    query::{ExplicitFilters, QueryConstraints, QueryInterpreter},
};

/// Outcome of a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult<'a> {
    /// Best candidates, similarity descending, ties by ascending id.
    pub candidates: Vec<ScoredCandidate<'a>>,
    pub confidence: f32,
    /// Effective constraints the candidates were filtered with.
    pub constraints: QueryConstraints,
    /// Number of records that passed the filter before truncation.
    pub candidate_pool_size: usize,
}

fn ensure_max_results(max_results: usize) -> Result<(), CoreError> {
    if max_results == 0 {
        return Err(CoreError::InvalidArgument("max_results must be at least 1".to_string()));
    }
    Ok(())
}

/// Interpret -> filter -> rank -> estimate, over an explicitly passed index.
pub struct RetrievalEngine {
    encoder: Box<dyn ProfileEncoder>,
    estimator: ConfidenceEstimator,
}

impl Default for RetrievalEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RetrievalEngine {
    pub fn new(config: EngineConfig) -> Self {
        let encoder = create_encoder(&config.encoder_name, config.encoder);
        info!(
            encoder = encoder.name(),
            version = encoder.version(),
            dimension = encoder.dimension(),
            "retrieval engine initialised"
        );
        Self {
            encoder,
            estimator: ConfidenceEstimator::new(config.confidence),
        }
    }

    pub fn encoder(&self) -> &dyn ProfileEncoder {
        self.encoder.as_ref()
    }

    pub fn build_index(&self, records: Vec<EmployeeRecord>) -> CorpusIndex {
        CorpusIndex::build(records, self.encoder.as_ref())
    }

    pub fn interpreter<'a>(&'a self, index: &'a CorpusIndex) -> QueryInterpreter<'a> {
        QueryInterpreter::new(index, self.encoder.as_ref())
    }

    /// Hybrid retrieval: hard constraints first, then semantic ranking.
    pub fn query<'a>(
        &self,
        index: &'a CorpusIndex,
        text: &str,
        explicit: Option<&ExplicitFilters>,
        max_results: usize,
    ) -> Result<RetrievalResult<'a>, CoreError> {
        ensure_max_results(max_results)?;

        let interpreted = self.interpreter(index).interpret(text, explicit)?;
        let filtered = ConstraintFilter::apply(&interpreted.constraints, index.entries());
        let candidate_pool_size = filtered.len();
        debug!(
            corpus = index.len(),
            pool = candidate_pool_size,
            "constraint filter applied"
        );

        let candidates = rank(&interpreted.vector, filtered, max_results)?;
        let confidence = self
            .estimator
            .estimate(&candidates, &interpreted.constraints, candidate_pool_size);
        debug!(
            returned = candidates.len(),
            top_similarity = candidates.first().map(|c| c.similarity),
            confidence,
            "query ranked"
        );

        Ok(RetrievalResult {
            candidates,
            confidence,
            constraints: interpreted.constraints,
            candidate_pool_size,
        })
    }

    /// Filter-only search, most experienced first, ties by ascending id.
    pub fn structured_search<'a>(
        &self,
        index: &'a CorpusIndex,
        filters: &ExplicitFilters,
        max_results: usize,
    ) -> Result<Vec<&'a EmployeeRecord>, CoreError> {
        ensure_max_results(max_results)?;
        let constraints = filters.to_constraints()?;

        let filtered = ConstraintFilter::apply(&constraints, index.entries());
        let mut records: Vec<&EmployeeRecord> = filtered
            .into_iter()
            .map(|candidate| &candidate.entry.record)
            .collect();

        records.sort_by(|a, b| {
            b.experience_years
                .total_cmp(&a.experience_years)
                .then_with(|| a.id.cmp(&b.id))
        });
        records.truncate(max_results);
        Ok(records)
    }
}
