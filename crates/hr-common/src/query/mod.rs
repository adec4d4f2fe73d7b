pub mod interpreter;
pub mod matchers;

use serde::{Deserialize, Serialize};

pub use interpreter::{InterpretedQuery, QueryInterpreter};

use crate::{Availability, CoreError, skill_normalizer::normalize_skills_vec};

/// Structured constraints for one query. Every field is independently
/// optional; `None` (or an empty skill list) means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryConstraints {
    /// Canonical skill names, all of which a candidate must have.
    #[serde(default)]
    pub skills: Vec<String>,
    pub min_experience: Option<f64>,
    pub max_experience: Option<f64>,
    pub availability: Option<Availability>,
    pub department: Option<String>,
}

impl QueryConstraints {
    /// Number of constraint fields (skills, min/max experience, availability, department).
    pub const FIELD_COUNT: usize = 5;

    pub fn is_empty(&self) -> bool {
        self.set_field_count() == 0
    }

    pub fn set_field_count(&self) -> usize {
        [
            !self.skills.is_empty(),
            self.min_experience.is_some(),
            self.max_experience.is_some(),
            self.availability.is_some(),
            self.department.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    /// Field-wise overlay: `self` wins wherever it is set, `fallback` fills
    /// the rest.
    pub fn or(self, fallback: QueryConstraints) -> QueryConstraints {
        QueryConstraints {
            skills: if self.skills.is_empty() {
                fallback.skills
            } else {
                self.skills
            },
            min_experience: self.min_experience.or(fallback.min_experience),
            max_experience: self.max_experience.or(fallback.max_experience),
            availability: self.availability.or(fallback.availability),
            department: self.department.or(fallback.department),
        }
    }
}

/// Caller-supplied filters (search form, API query string). Unlike text
/// inference these are validated and rejected when malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplicitFilters {
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub min_experience: Option<f64>,
    #[serde(default)]
    pub max_experience: Option<f64>,
    #[serde(default)]
    pub availability: Option<Availability>,
    #[serde(default)]
    pub department: Option<String>,
}

impl ExplicitFilters {
    /// Validate and convert into constraints.
    ///
    /// An empty skill list or blank department counts as "not set".
    pub fn to_constraints(&self) -> Result<QueryConstraints, CoreError> {
        let min_experience = validate_bound("min_experience", self.min_experience)?;
        let max_experience = validate_bound("max_experience", self.max_experience)?;

        if let (Some(min), Some(max)) = (min_experience, max_experience) {
            if min > max {
                return Err(CoreError::InvalidArgument(format!(
                    "min_experience ({min}) exceeds max_experience ({max})"
                )));
            }
        }

        let skills = self
            .skills
            .as_deref()
            .map(normalize_skills_vec)
            .unwrap_or_default();

        let department = self
            .department
            .as_deref()
            .map(str::trim)
            .filter(|dept| !dept.is_empty())
            .map(str::to_string);

        Ok(QueryConstraints {
            skills,
            min_experience,
            max_experience,
            availability: self.availability,
            department,
        })
    }
}

fn validate_bound(field: &str, value: Option<f64>) -> Result<Option<f64>, CoreError> {
    match value {
        Some(v) if !v.is_finite() => Err(CoreError::InvalidArgument(format!(
            "{field} must be a finite number"
        ))),
        Some(v) if v < 0.0 => Err(CoreError::InvalidArgument(format!(
            "{field} must be non-negative, got {v}"
        ))),
        other => Ok(other),
    }
}
