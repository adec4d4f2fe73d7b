use thiserror::Error;

use crate::EmployeeId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Corpus entry rejected at build time.
    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: EmployeeId, reason: String },
    #[error("employee not found: {0}")]
    NotFound(EmployeeId),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CoreError {
    pub fn invalid_record(id: EmployeeId, reason: impl Into<String>) -> Self {
        CoreError::InvalidRecord {
            id,
            reason: reason.into(),
        }
    }
}
