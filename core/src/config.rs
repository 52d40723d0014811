use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;
/// A patent scoring strictly above this is reported as blocking.
pub const DEFAULT_BLOCKING_THRESHOLD: f64 = 0.7;
pub const DEFAULT_INVALIDITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_STRONG_INVALIDITY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_LEXICAL_WEIGHT: f64 = 0.6;
pub const DEFAULT_STRUCTURAL_WEIGHT: f64 = 0.4;
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub similarity_threshold: f64,
    pub blocking_threshold: f64,
    pub invalidity_threshold: f64,
    pub strong_invalidity_threshold: f64,
    pub lexical_weight: f64,
    pub structural_weight: f64,
    pub cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            blocking_threshold: DEFAULT_BLOCKING_THRESHOLD,
            invalidity_threshold: DEFAULT_INVALIDITY_THRESHOLD,
            strong_invalidity_threshold: DEFAULT_STRONG_INVALIDITY_THRESHOLD,
            lexical_weight: DEFAULT_LEXICAL_WEIGHT,
            structural_weight: DEFAULT_STRUCTURAL_WEIGHT,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Keys missing from the document keep their defaults.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let cfg: EngineConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let body = std::fs::read_to_string(path)?;
        Self::from_json_str(&body)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let unit_fields = [
            ("similarity_threshold", self.similarity_threshold),
            ("blocking_threshold", self.blocking_threshold),
            ("invalidity_threshold", self.invalidity_threshold),
            ("strong_invalidity_threshold", self.strong_invalidity_threshold),
            ("lexical_weight", self.lexical_weight),
            ("structural_weight", self.structural_weight),
        ];
        for (name, value) in unit_fields {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Configuration(format!(
                    "{} must lie in [0,1], got {}",
                    name, value
                )));
            }
        }

        let sum = self.lexical_weight + self.structural_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CoreError::Configuration(format!(
                "lexical_weight + structural_weight must equal 1.0, got {}",
                sum
            )));
        }

        if self.cache_capacity == 0 {
            return Err(CoreError::Configuration(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
