use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Vector dimension (a power of two keeps collisions predictable: 256, 512, 1024).
    pub dimension: usize,
    /// Weight of a `skill:` token relative to a free-text term.
    pub skill_weight: f32,
    /// Weight of the `dept:` token.
    pub department_weight: f32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            dimension: 512,
            skill_weight: 2.0,
            department_weight: 1.0,
        }
    }
}
