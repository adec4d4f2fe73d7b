use std::collections::HashSet;

use serde::Serialize;

use crate::{
    EmployeeRecord, corpus::IndexedEmployee, query::QueryConstraints,
    skill_normalizer::{normalize_skill, normalize_skill_set},
};

/// Constraint fields, one predicate each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    Skills,
    MinExperience,
    MaxExperience,
    Availability,
    Department,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 5] = [
        ConstraintKind::Skills,
        ConstraintKind::MinExperience,
        ConstraintKind::MaxExperience,
        ConstraintKind::Availability,
        ConstraintKind::Department,
    ];
}

/// Outcome of one predicate against one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Unconstrained,
    Satisfied,
    Violated,
}

/// Which constraints were set *and* satisfied by a candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchedConstraints {
    pub skills: bool,
    pub min_experience: bool,
    pub max_experience: bool,
    pub availability: bool,
    pub department: bool,
}

impl MatchedConstraints {
    pub fn count(&self) -> usize {
        [
            self.skills,
            self.min_experience,
            self.max_experience,
            self.availability,
            self.department,
        ]
        .into_iter()
        .filter(|flag| *flag)
        .count()
    }

    pub fn get(&self, kind: ConstraintKind) -> bool {
        match kind {
            ConstraintKind::Skills => self.skills,
            ConstraintKind::MinExperience => self.min_experience,
            ConstraintKind::MaxExperience => self.max_experience,
            ConstraintKind::Availability => self.availability,
            ConstraintKind::Department => self.department,
        }
    }

    fn set(&mut self, kind: ConstraintKind) {
        match kind {
            ConstraintKind::Skills => self.skills = true,
            ConstraintKind::MinExperience => self.min_experience = true,
            ConstraintKind::MaxExperience => self.max_experience = true,
            ConstraintKind::Availability => self.availability = true,
            ConstraintKind::Department => self.department = true,
        }
    }
}

/// A candidate that survived filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredCandidate<'a> {
    pub entry: &'a IndexedEmployee,
    pub matched: MatchedConstraints,
}

fn check_skills(required: &[String], candidate: &HashSet<String>) -> Check {
    if required.is_empty() {
        return Check::Unconstrained;
    }
    if required
        .iter()
        .all(|skill| candidate.contains(&normalize_skill(skill)))
    {
        Check::Satisfied
    } else {
        Check::Violated
    }
}

fn check_bound(bound: Option<f64>, holds: impl FnOnce(f64) -> bool) -> Check {
    match bound {
        None => Check::Unconstrained,
        Some(b) if holds(b) => Check::Satisfied,
        Some(_) => Check::Violated,
    }
}

fn check_department(required: Option<&str>, candidate: Option<&str>) -> Check {
    let Some(required) = required else {
        return Check::Unconstrained;
    };
    match candidate {
        Some(dept) if dept.trim().to_lowercase() == required.trim().to_lowercase() => {
            Check::Satisfied
        }
        _ => Check::Violated,
    }
}

/// Structured-constraint filter. Stateless; every predicate is independent,
/// so evaluation order never changes the outcome.
pub struct ConstraintFilter;

impl ConstraintFilter {
    /// Evaluate a single predicate against a record.
    pub fn check(
        kind: ConstraintKind,
        constraints: &QueryConstraints,
        record: &EmployeeRecord,
    ) -> Check {
        match kind {
            ConstraintKind::Skills => {
                check_skills(&constraints.skills, &normalize_skill_set(&record.skills))
            }
            ConstraintKind::MinExperience => {
                check_bound(constraints.min_experience, |min| record.experience_years >= min)
            }
            ConstraintKind::MaxExperience => {
                check_bound(constraints.max_experience, |max| record.experience_years <= max)
            }
            ConstraintKind::Availability => match constraints.availability {
                None => Check::Unconstrained,
                Some(required) if required == record.availability => Check::Satisfied,
                Some(_) => Check::Violated,
            },
            ConstraintKind::Department => check_department(
                constraints.department.as_deref(),
                record.department.as_deref(),
            ),
        }
    }

    /// Evaluate predicates in the given order. `None` when any is violated.
    pub fn evaluate_in_order(
        order: &[ConstraintKind],
        constraints: &QueryConstraints,
        record: &EmployeeRecord,
    ) -> Option<MatchedConstraints> {
        let mut matched = MatchedConstraints::default();
        for &kind in order {
            match Self::check(kind, constraints, record) {
                Check::Violated => return None,
                Check::Satisfied => matched.set(kind),
                Check::Unconstrained => {}
            }
        }
        Some(matched)
    }

    pub fn evaluate(
        constraints: &QueryConstraints,
        record: &EmployeeRecord,
    ) -> Option<MatchedConstraints> {
        Self::evaluate_in_order(&ConstraintKind::ALL, constraints, record)
    }

    /// Keep the entries satisfying every set constraint, in input order.
    pub fn apply<'a>(
        constraints: &QueryConstraints,
        entries: impl IntoIterator<Item = &'a IndexedEmployee>,
    ) -> Vec<FilteredCandidate<'a>> {
        entries
            .into_iter()
            .filter_map(|entry| {
                Self::evaluate(constraints, &entry.record)
                    .map(|matched| FilteredCandidate { entry, matched })
            })
            .collect()
    }
}
