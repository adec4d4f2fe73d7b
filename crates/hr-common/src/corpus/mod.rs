pub mod stats;

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

pub use stats::{CorpusStats, SkillCount};

use crate::{
    CoreError, EmployeeId, EmployeeRecord,
    embedding::{ProfileEncoder, ProfileVector},
    skill_normalizer::normalize_skill,
};

/// A record together with its precomputed profile vector.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEmployee {
    pub record: EmployeeRecord,
    pub vector: ProfileVector,
}

/// Immutable, scan-based index over the employee corpus.
///
/// Built once, then shared read-only (it is `Send + Sync`). Reloading means
/// building a fresh index and swapping the reference; nothing here mutates
/// after `build`.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    entries: Vec<IndexedEmployee>,
    positions: HashMap<EmployeeId, usize>,
    skill_vocabulary: BTreeSet<String>,
    departments: Vec<String>,
    skipped: Vec<CoreError>,
    encoder_name: &'static str,
    encoder_version: String,
    dimension: usize,
    built_at: DateTime<Utc>,
}

/// Structural checks on a single record. Only impossible values are rejected;
/// field parsing is the loader's job.
pub fn validate_record(record: &EmployeeRecord) -> Result<(), CoreError> {
    if !record.experience_years.is_finite() {
        return Err(CoreError::invalid_record(
            record.id,
            "experience_years must be a finite number",
        ));
    }
    if record.experience_years < 0.0 {
        return Err(CoreError::invalid_record(
            record.id,
            format!(
                "experience_years must be non-negative, got {}",
                record.experience_years
            ),
        ));
    }
    if record.name.trim().is_empty() {
        return Err(CoreError::invalid_record(record.id, "name is blank"));
    }
    Ok(())
}

impl CorpusIndex {
    /// Encode and index `records` in order.
    ///
    /// Invalid records (see [`validate_record`]) and later duplicates of an
    /// already indexed id are skipped with a warning and listed in
    /// [`CorpusIndex::skipped`].
    pub fn build(records: Vec<EmployeeRecord>, encoder: &dyn ProfileEncoder) -> Self {
        let mut entries = Vec::with_capacity(records.len());
        let mut positions = HashMap::with_capacity(records.len());
        let mut skipped = Vec::new();

        for record in records {
            if let Err(err) = validate_record(&record) {
                warn!(employee_id = record.id, error = %err, "skipping invalid record");
                skipped.push(err);
                continue;
            }
            if positions.contains_key(&record.id) {
                let err = CoreError::invalid_record(record.id, "duplicate employee id");
                warn!(employee_id = record.id, error = %err, "skipping invalid record");
                skipped.push(err);
                continue;
            }

            let vector = encoder.encode(&record);
            positions.insert(record.id, entries.len());
            entries.push(IndexedEmployee { record, vector });
        }

        let skill_vocabulary = entries
            .iter()
            .flat_map(|entry| entry.record.skills.iter())
            .map(|skill| normalize_skill(skill))
            .filter(|skill| !skill.is_empty())
            .collect();

        let departments = collect_departments(&entries);

        info!(
            indexed = entries.len(),
            skipped = skipped.len(),
            encoder = encoder.name(),
            encoder_version = encoder.version(),
            dimension = encoder.dimension(),
            "corpus index built"
        );

        Self {
            entries,
            positions,
            skill_vocabulary,
            departments,
            skipped,
            encoder_name: encoder.name(),
            encoder_version: encoder.version().to_string(),
            dimension: encoder.dimension(),
            built_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, id: EmployeeId) -> Result<&EmployeeRecord, CoreError> {
        self.get(id)
            .map(|entry| &entry.record)
            .ok_or(CoreError::NotFound(id))
    }

    pub fn get(&self, id: EmployeeId) -> Option<&IndexedEmployee> {
        self.positions.get(&id).map(|&pos| &self.entries[pos])
    }

    /// All (record, vector) pairs in insertion order.
    pub fn all(&self) -> impl Iterator<Item = (&EmployeeRecord, &ProfileVector)> + '_ {
        self.entries
            .iter()
            .map(|entry| (&entry.record, &entry.vector))
    }

    pub fn entries(&self) -> &[IndexedEmployee] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &EmployeeRecord> + '_ {
        self.entries.iter().map(|entry| &entry.record)
    }

    /// Canonical skill names present anywhere in the corpus.
    pub fn skill_vocabulary(&self) -> &BTreeSet<String> {
        &self.skill_vocabulary
    }

    /// Distinct departments (first-seen spelling, sorted case-insensitively).
    pub fn departments(&self) -> &[String] {
        &self.departments
    }

    pub fn skipped(&self) -> &[CoreError] {
        &self.skipped
    }

    pub fn encoder_name(&self) -> &'static str {
        self.encoder_name
    }

    pub fn encoder_version(&self) -> &str {
        &self.encoder_version
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn stats(&self) -> CorpusStats {
        CorpusStats::from_records(self.records())
    }
}

fn collect_departments(entries: &[IndexedEmployee]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut departments: Vec<String> = entries
        .iter()
        .filter_map(|entry| entry.record.department.as_deref())
        .map(str::trim)
        .filter(|dept| !dept.is_empty())
        .filter(|dept| seen.insert(dept.to_lowercase()))
        .map(str::to_string)
        .collect();
    departments.sort_by_key(|dept| dept.to_lowercase());
    departments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Availability, embedding::HashProfileEncoder};

    fn sample() -> Vec<EmployeeRecord> {
        vec![
            EmployeeRecord::new(3, "Cleo", &["Python"], 1.0, Availability::Busy)
                .with_department("Data"),
            EmployeeRecord::new(1, "Ada", &["Python", "JS"], 5.0, Availability::Available)
                .with_department("Engineering"),
            EmployeeRecord::new(2, "Bob", &["Java"], 2.0, Availability::Available)
                .with_department("engineering"),
        ]
    }

    #[test]
    fn preserves_insertion_order_and_vectors() {
        let encoder = HashProfileEncoder::default();
        let index = CorpusIndex::build(sample(), &encoder);

        let ids: Vec<_> = index.all().map(|(record, _)| record.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(index.all().all(|(_, v)| v.dimension() == encoder.config.dimension));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn lookup_reports_not_found() {
        let index = CorpusIndex::build(sample(), &HashProfileEncoder::default());

        assert_eq!(index.lookup(2).map(|r| r.name.as_str()), Ok("Bob"));
        assert_eq!(index.lookup(42), Err(CoreError::NotFound(42)));
    }

    #[test]
    fn skips_invalid_and_duplicate_records_deterministically() {
        let mut records = sample();
        records.push(EmployeeRecord::new(7, "Neg", &["Go"], -1.0, Availability::Busy));
        records.push(EmployeeRecord::new(1, "Ada again", &["Rust"], 3.0, Availability::Busy));
        records.push(EmployeeRecord::new(8, "  ", &["Go"], 1.0, Availability::Busy));
        records.push(EmployeeRecord::new(9, "Inf", &["Go"], f64::INFINITY, Availability::Busy));

        let index = CorpusIndex::build(records, &HashProfileEncoder::default());

        assert_eq!(index.len(), 3);
        let skipped_ids: Vec<_> = index
            .skipped()
            .iter()
            .map(|err| match err {
                CoreError::InvalidRecord { id, .. } => *id,
                other => panic!("unexpected error: {other:?}"),
            })
            .collect();
        assert_eq!(skipped_ids, vec![7, 1, 8, 9]);
        assert_eq!(index.lookup(1).map(|r| r.name.as_str()), Ok("Ada"));
    }

    #[test]
    fn derives_vocabulary_and_departments() {
        let index = CorpusIndex::build(sample(), &HashProfileEncoder::default());

        let vocab: Vec<_> = index.skill_vocabulary().iter().cloned().collect();
        assert_eq!(vocab, vec!["java", "javascript", "python"]);
        assert_eq!(index.departments(), ["Data", "Engineering"]);
    }

    #[test]
    fn empty_corpus_builds() {
        let index = CorpusIndex::build(Vec::new(), &HashProfileEncoder::default());
        assert!(index.is_empty());
        assert_eq!(index.all().count(), 0);
        assert!(index.skipped().is_empty());
    }
}
