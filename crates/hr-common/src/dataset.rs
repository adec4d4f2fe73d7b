//! JSON employee dataset loading.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::EmployeeRecord;

#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Either a bare array of records or `{"employees": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetShape {
    Records(Vec<EmployeeRecord>),
    Wrapped { employees: Vec<EmployeeRecord> },
}

impl DatasetShape {
    fn into_records(self) -> Vec<EmployeeRecord> {
        match self {
            DatasetShape::Records(records) | DatasetShape::Wrapped { employees: records } => {
                records
            }
        }
    }
}

/// Parse records from JSON text. `origin` only labels errors.
pub fn parse_records(json: &str, origin: &str) -> Result<Vec<EmployeeRecord>, DataLoadError> {
    serde_json::from_str::<DatasetShape>(json)
        .map(DatasetShape::into_records)
        .map_err(|source| DataLoadError::Parse {
            origin: origin.to_string(),
            source,
        })
}

/// Read and parse a dataset file. Record-level validation happens at index
/// build time, not here.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<EmployeeRecord>, DataLoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&json, &path.display().to_string())?;
    info!(path = %path.display(), records = records.len(), "dataset loaded");
    Ok(records)
}
