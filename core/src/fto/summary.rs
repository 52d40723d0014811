use crate::config::EngineConfig;
use crate::model::InvalidityAssessment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriorArtSummary {
    pub total_prior_art_references: usize,
    pub strong_invalidity_candidates: usize,
    pub average_invalidity_potential: f64,
}

pub fn summarize_prior_art(
    invalidity: &[InvalidityAssessment],
    config: &EngineConfig,
) -> PriorArtSummary {
    let total_prior_art_references = invalidity.iter().map(|a| a.references_considered).sum();
    let strong_invalidity_candidates = invalidity
        .iter()
        .filter(|a| a.score > config.strong_invalidity_threshold)
        .count();
    let average_invalidity_potential = if invalidity.is_empty() {
        0.0
    } else {
        invalidity.iter().map(|a| a.score).sum::<f64>() / invalidity.len() as f64
    };
    PriorArtSummary {
        total_prior_art_references,
        strong_invalidity_candidates,
        average_invalidity_potential,
    }
}
