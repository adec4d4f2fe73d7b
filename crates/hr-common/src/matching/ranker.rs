use std::cmp::Ordering;

use crate::{
    CoreError,
    embedding::{ProfileVector, similarity::cosine_similarity},
};

use super::{FilteredCandidate, ScoredCandidate};

/// Order hits by similarity, highest first; ties go to the lower id.
pub fn compare_scored(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.record.id.cmp(&b.record.id))
}

/// Score `candidates` against the query vector and keep the best
/// `max_results`.
///
/// A zero query vector scores every candidate 0, which leaves the result in
/// ascending id order.
pub fn rank<'a>(
    query: &ProfileVector,
    candidates: Vec<FilteredCandidate<'a>>,
    max_results: usize,
) -> Result<Vec<ScoredCandidate<'a>>, CoreError> {
    if max_results == 0 {
        return Err(CoreError::InvalidArgument("max_results must be at least 1".to_string()));
    }

    let mut scored: Vec<ScoredCandidate<'a>> = candidates
        .into_iter()
        .map(|candidate| ScoredCandidate {
            record: &candidate.entry.record,
            similarity: cosine_similarity(query.values(), candidate.entry.vector.values()),
            matched: candidate.matched,
        })
        .collect();

    scored.sort_by(compare_scored);
    scored.truncate(max_results);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Availability, CorpusIndex, EmployeeRecord,
        embedding::{HashProfileEncoder, ProfileEncoder, ProfileText},
        matching::{ConstraintFilter, MatchedConstraints},
        query::QueryConstraints,
    };

    fn index() -> CorpusIndex {
        let django = &["Python", "Django"];
        CorpusIndex::build(
            vec![
                EmployeeRecord::new(3, "Cleo", django, 4.0, Availability::Available),
                EmployeeRecord::new(1, "Ada", django, 4.0, Availability::Available),
                EmployeeRecord::new(2, "Bob", &["Go", "Kubernetes"], 6.0, Availability::Busy),
            ],
            &HashProfileEncoder::default(),
        )
    }

    fn all_candidates(index: &CorpusIndex) -> Vec<FilteredCandidate<'_>> {
        ConstraintFilter::apply(&QueryConstraints::default(), index.entries())
    }

    #[test]
    fn rejects_zero_max_results() {
        let index = index();
        let query = ProfileVector::zeros(index.dimension());

        let err = rank(&query, all_candidates(&index), 0).unwrap_err();

        assert!(matches!(err, CoreError::InvalidArgument(_)));
    }

    #[test]
    fn orders_by_similarity_then_id() {
        let index = index();
        let encoder = HashProfileEncoder::default();
        let query = encoder.encode_text(&ProfileText::for_query(
            "python django",
            &["python".to_string(), "django".to_string()],
            None,
        ));

        let ranked = rank(&query, all_candidates(&index), 10).unwrap();
        let ids: Vec<i64> = ranked.iter().map(|c| c.record.id).collect();

        assert_eq!(ids, vec![1, 3, 2]);
        assert!(ranked[0].similarity > ranked[2].similarity);
        assert_eq!(ranked[0].similarity, ranked[1].similarity);
    }

    #[test]
    fn truncates_to_max_results() {
        let index = index();
        let query = ProfileVector::zeros(index.dimension());

        let ranked = rank(&query, all_candidates(&index), 2).unwrap();

        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn zero_query_vector_scores_zero_in_id_order() {
        let index = index();
        let query = ProfileVector::zeros(index.dimension());

        let ranked = rank(&query, all_candidates(&index), 5).unwrap();

        assert!(ranked.iter().all(|c| c.similarity == 0.0));
        let ids: Vec<i64> = ranked.iter().map(|c| c.record.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn carries_matched_flags_through() {
        let index = index();
        let constraints = QueryConstraints {
            availability: Some(Availability::Busy),
            ..Default::default()
        };
        let candidates = ConstraintFilter::apply(&constraints, index.entries());
        let query = ProfileVector::zeros(index.dimension());

        let ranked = rank(&query, candidates, 5).unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(
            ranked[0].matched,
            MatchedConstraints {
                availability: true,
                ..Default::default()
            }
        );
    }
}
