pub mod config;
pub mod hash_encoder;
pub mod similarity;
pub mod tokenizer;

pub use config::EncoderConfig;
pub use hash_encoder::HashProfileEncoder;
pub use similarity::cosine_similarity;
use tracing::warn;

use crate::EmployeeRecord;

/// Dense profile or query vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileVector {
    values: Vec<f32>,
}

impl ProfileVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn zeros(dimension: usize) -> Self {
        Self::new(vec![0.0; dimension])
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }
}

/// The textual view of a profile or query that encoders consume.
///
/// Records and queries go through the same structure so both sides land in
/// the same token space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileText {
    pub skills: Vec<String>,
    pub department: Option<String>,
    pub fragments: Vec<String>,
}

impl ProfileText {
    pub fn from_record(record: &EmployeeRecord) -> Self {
        let mut fragments = Vec::with_capacity(
            record.skills.len() + record.projects.len() + record.specializations.len() + 2,
        );
        fragments.extend(record.skills.iter().cloned());
        fragments.extend(record.projects.iter().cloned());
        fragments.extend(record.specializations.iter().cloned());
        fragments.extend(record.summary.iter().cloned());
        fragments.extend(record.department.iter().cloned());

        Self {
            skills: record.skills.clone(),
            department: record.department.clone(),
            fragments,
        }
    }

    /// Query side: the raw text plus whatever skills and department the
    /// interpreter recognised in it.
    pub fn for_query(text: &str, skills: &[String], department: Option<&str>) -> Self {
        Self {
            skills: skills.to_vec(),
            department: department.map(str::to_string),
            fragments: vec![text.to_string()],
        }
    }
}

/// Abstract profile encoder.
///
/// Implementations must be deterministic: equal input text gives equal vectors.
pub trait ProfileEncoder: Send + Sync {
    /// Implementation name ("hash").
    fn name(&self) -> &'static str;

    /// Version tag; bump whenever the token scheme or hashing changes.
    fn version(&self) -> &str;

    fn dimension(&self) -> usize;

    fn encode_text(&self, text: &ProfileText) -> ProfileVector;

    fn encode(&self, record: &EmployeeRecord) -> ProfileVector {
        self.encode_text(&ProfileText::from_record(record))
    }

    /// Similarity in `0.0..=1.0`.
    fn similarity(&self, a: &ProfileVector, b: &ProfileVector) -> f32 {
        if a.dimension() != b.dimension() {
            warn!(
                encoder = self.name(),
                a_dimension = a.dimension(),
                b_dimension = b.dimension(),
                "vector dimension mismatch; returning zero similarity"
            );
            return 0.0;
        }
        cosine_similarity(a.values(), b.values())
    }
}

/// Encoder factory. Unknown names fall back to the hashing encoder.
pub fn create_encoder(name: &str, config: EncoderConfig) -> Box<dyn ProfileEncoder> {
    match name {
        "hash" => Box::new(HashProfileEncoder::new(config)),
        other => {
            warn!(encoder = other, "unknown encoder; falling back to hash");
            Box::new(HashProfileEncoder::new(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Availability;

    #[test]
    fn profile_text_leaves_out_the_name() {
        let record = EmployeeRecord::new(1, "Grace Hopper", &["COBOL"], 30.0, Availability::Busy)
            .with_summary("Compiler pioneer");

        let text = ProfileText::from_record(&record);

        assert_eq!(text.skills, vec!["COBOL".to_string()]);
        assert!(text.fragments.iter().all(|f| !f.contains("Grace")));
        assert!(text.fragments.contains(&"Compiler pioneer".to_string()));
    }

    #[test]
    fn factory_falls_back_to_hash() {
        let encoder = create_encoder("onnx", EncoderConfig::default());
        assert_eq!(encoder.name(), "hash");
    }

    #[test]
    fn mismatched_dimensions_score_zero() {
        let encoder = HashProfileEncoder::default();
        let a = ProfileVector::new(vec![1.0, 0.0]);
        let b = ProfileVector::new(vec![1.0, 0.0, 0.0]);
        assert_eq!(encoder.similarity(&a, &b), 0.0);
    }
}
