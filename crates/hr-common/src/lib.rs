pub mod config;
pub mod corpus;
pub mod dataset;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod logging;
pub mod matching;
pub mod query;
pub mod skill_normalizer;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::EngineConfig;
pub use corpus::{CorpusIndex, CorpusStats, IndexedEmployee};
pub use dataset::{DataLoadError, load_records};
pub use engine::{RetrievalEngine, RetrievalResult};
pub use error::CoreError;
pub use matching::ScoredCandidate;
pub use query::{ExplicitFilters, QueryConstraints};

pub type EmployeeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Busy,
    OnLeave,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Busy => "busy",
            Availability::OnLeave => "on_leave",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Availability {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "available" => Ok(Availability::Available),
            "busy" => Ok(Availability::Busy),
            "on_leave" => Ok(Availability::OnLeave),
            other => Err(CoreError::InvalidArgument(format!("unknown availability: {other}"))),
        }
    }
}

/// Employee profile as loaded from the dataset. Read-only once indexed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub experience_years: f64,
    pub availability: Availability,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl EmployeeRecord {
    /// Minimal record, mostly for tests and fixtures.
    pub fn new(
        id: EmployeeId,
        name: impl Into<String>,
        skills: &[&str],
        experience_years: f64,
        availability: Availability,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_years,
            availability,
            department: None,
            projects: Vec::new(),
            specializations: Vec::new(),
            summary: None,
            location: None,
        }
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_projects(mut self, projects: &[&str]) -> Self {
        self.projects = projects.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}
