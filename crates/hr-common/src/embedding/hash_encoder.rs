use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use super::{EncoderConfig, ProfileEncoder, ProfileText, ProfileVector, tokenizer};

/// Fixed keys keep vectors stable across processes and Rust versions.
/// Changing them changes every vector: bump `version()` when you do.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

/// Feature-hashing encoder.
///
/// - no training, no model files
/// - O(n) in the number of tokens
/// - signed hashing so collisions cancel out on average
/// - L2-normalised output (the zero vector stays zero)
pub struct HashProfileEncoder {
    pub config: EncoderConfig,
}

impl HashProfileEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        let mut cfg = config;
        cfg.dimension = cfg.dimension.max(1);
        Self { config: cfg }
    }

    /// Bucket index and sign for a token, both from one SipHash-1-3 digest.
    fn bucket(&self, token: &str) -> (usize, f32) {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        let digest = hasher.finish();
        let index = (digest % self.config.dimension as u64) as usize;
        let sign = if digest >> 63 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }

    fn tokens_to_vector(&self, tokens: &[tokenizer::WeightedToken]) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.config.dimension];

        for wt in tokens {
            let (idx, sign) = self.bucket(&wt.token);
            vector[idx] += sign * wt.weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl Default for HashProfileEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

impl ProfileEncoder for HashProfileEncoder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn version(&self) -> &str {
        "v1"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn encode_text(&self, text: &ProfileText) -> ProfileVector {
        let tokens = tokenizer::tokenize_profile(text, &self.config);
        ProfileVector::new(self.tokens_to_vector(&tokens))
    }
}
