use tracing::debug;

use super::{ExplicitFilters, QueryConstraints, matchers};
use crate::{
    CoreError, CorpusIndex,
    embedding::{ProfileEncoder, ProfileText, ProfileVector},
};

/// Output of [`QueryInterpreter::interpret`].
#[derive(Debug, Clone, PartialEq)]
pub struct InterpretedQuery {
    pub vector: ProfileVector,
    /// Effective constraints (explicit filters overlaid on inferred ones).
    pub constraints: QueryConstraints,
    /// What the text alone implied, kept for logging and explanations.
    pub inferred: QueryConstraints,
}

/// Turns free text plus optional explicit filters into a query vector and
/// structured constraints.
///
/// Text inference never fails; only malformed explicit filters are rejected.
pub struct QueryInterpreter<'a> {
    index: &'a CorpusIndex,
    encoder: &'a dyn ProfileEncoder,
}

impl<'a> QueryInterpreter<'a> {
    pub fn new(index: &'a CorpusIndex, encoder: &'a dyn ProfileEncoder) -> Self {
        Self { index, encoder }
    }

    /// Constraints implied by the text, one matcher per field.
    pub fn infer_constraints(&self, text: &str) -> QueryConstraints {
        QueryConstraints {
            skills: matchers::match_skills(text, self.index.skill_vocabulary()),
            min_experience: matchers::match_min_experience(text),
            max_experience: matchers::match_max_experience(text),
            availability: matchers::match_availability(text),
            department: matchers::match_department(text, self.index.departments()),
        }
    }

    pub fn interpret(
        &self,
        text: &str,
        explicit: Option<&ExplicitFilters>,
    ) -> Result<InterpretedQuery, CoreError> {
        let explicit = explicit
            .map(ExplicitFilters::to_constraints)
            .transpose()?
            .unwrap_or_default();

        let inferred = self.infer_constraints(text);
        let constraints = explicit.or(inferred.clone());

        let vector = self.encoder.encode_text(&ProfileText::for_query(
            text,
            &constraints.skills,
            constraints.department.as_deref(),
        ));

        debug!(
            inferred = ?inferred,
            effective = ?constraints,
            zero_vector = vector.is_zero(),
            "query interpreted"
        );

        Ok(InterpretedQuery {
            vector,
            constraints,
            inferred,
        })
    }
}
