use std::env;

use serde::{Deserialize, Serialize};

use crate::{embedding::EncoderConfig, matching::ConfidenceWeights};

/// Retrieval engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Encoder implementation name passed to [`crate::embedding::create_encoder`].
    pub encoder_name: String,
    pub encoder: EncoderConfig,
    pub confidence: ConfidenceWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            encoder_name: "hash".to_string(),
            encoder: EncoderConfig::default(),
            confidence: ConfidenceWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Read overrides from the environment; unset or unparsable values keep
    /// their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            encoder_name: env::var("HR_ENCODER")
                .ok()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.encoder_name),
            encoder: EncoderConfig {
                dimension: env::var("HR_ENCODER_DIMENSION")
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .filter(|d: &usize| *d > 0)
                    .unwrap_or(defaults.encoder.dimension),
                ..defaults.encoder
            },
            confidence: ConfidenceWeights {
                semantic: env::var("HR_CONFIDENCE_SEMANTIC_WEIGHT")
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(defaults.confidence.semantic),
                coverage: env::var("HR_CONFIDENCE_COVERAGE_WEIGHT")
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(defaults.confidence.coverage),
            },
        }
    }
}
