use crate::config::EngineConfig;
use crate::model::{
    BlockingAssessment, FtoStatus, FtoVerdict, InvalidityAssessment, Priority, Recommendation,
    RecommendationType,
};
use crate::similarity::clamp_unit;
use std::collections::HashMap;

/// Freedom-to-operate verdict over every assessed patent.
///
/// Status, first match wins:
/// - BLOCKED when a patent is over the blocking threshold and its invalidity
///   case is at or below the invalidity threshold,
/// - NEEDS_REVIEW when a patent is over the blocking threshold at all,
/// - CLEAR otherwise.
///
/// A patent with no invalidity assessment pairs with an invalidity of 0.0.
pub fn aggregate(
    blocking: &[BlockingAssessment],
    invalidity: &[InvalidityAssessment],
    technology: &str,
    config: &EngineConfig,
) -> FtoVerdict {
    let invalidity_by_patent: HashMap<&str, f64> = invalidity
        .iter()
        .map(|a| (a.patent_id.as_str(), a.score))
        .collect();

    let mut blocked = Vec::new();
    let mut over_threshold = false;
    for b in blocking {
        if b.score <= config.blocking_threshold {
            continue;
        }
        over_threshold = true;
        let paired = invalidity_by_patent
            .get(b.patent_id.as_str())
            .copied()
            .unwrap_or(0.0);
        if paired <= config.invalidity_threshold {
            blocked.push(b.patent_id.clone());
        }
    }

    let status = if !blocked.is_empty() {
        FtoStatus::Blocked
    } else if over_threshold {
        FtoStatus::NeedsReview
    } else {
        FtoStatus::Clear
    };

    let scores: Vec<f64> = blocking.iter().map(|b| b.score).collect();
    let confidence = clamp_unit(1.0 - clamp_unit(std_dev(&scores)));

    let invalidatable: Vec<String> = invalidity
        .iter()
        .filter(|a| a.score > config.invalidity_threshold)
        .map(|a| a.patent_id.clone())
        .collect();

    FtoVerdict {
        technology: technology.to_string(),
        status,
        confidence,
        recommendations: recommendations(blocked, invalidatable),
    }
}

// Fixed emission order: licensing, design-around, reexamination.
fn recommendations(blocked: Vec<String>, invalidatable: Vec<String>) -> Vec<Recommendation> {
    let mut out = Vec::new();
    if !blocked.is_empty() {
        out.push(Recommendation {
            kind: RecommendationType::Licensing,
            priority: Priority::High,
            description: format!("Consider licensing {} blocking patents", blocked.len()),
            patents: blocked,
        });
    }
    out.push(Recommendation {
        kind: RecommendationType::DesignAround,
        priority: Priority::Medium,
        description: "Develop design-around solutions for identified blocking claims".to_string(),
        patents: Vec::new(),
    });
    if !invalidatable.is_empty() {
        out.push(Recommendation {
            kind: RecommendationType::Reexamination,
            priority: Priority::High,
            description: format!(
                "Consider reexamination proceedings for {} patents",
                invalidatable.len()
            ),
            patents: invalidatable,
        });
    }
    out
}

/// Population standard deviation; 0.0 for an empty slice.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocking(id: &str, score: f64) -> BlockingAssessment {
        BlockingAssessment {
            patent_id: id.to_string(),
            score,
            is_blocking: score > 0.7,
            dominant_claim: None,
            matched_elements: vec![],
            claim_scores: vec![],
        }
    }

    fn invalidity(id: &str, score: f64) -> InvalidityAssessment {
        InvalidityAssessment {
            patent_id: id.to_string(),
            score,
            is_strong: score > 0.7,
            broadest_claim: None,
            supporting_references: vec![],
            references_considered: 0,
            excluded_by_date: 0,
        }
    }

    fn kinds(v: &FtoVerdict) -> Vec<RecommendationType> {
        v.recommendations.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn blocked_when_invalidity_is_weak() {
        let cfg = EngineConfig::default();
        let v = aggregate(
            &[blocking("US1", 0.9), blocking("US2", 0.2)],
            &[invalidity("US1", 0.6)],
            "wireless charging",
            &cfg,
        );
        assert_eq!(v.status, FtoStatus::Blocked);
        assert_eq!(
            kinds(&v),
            vec![RecommendationType::Licensing, RecommendationType::DesignAround]
        );
        assert_eq!(v.recommendations[0].patents, vec!["US1".to_string()]);
        assert!((v.confidence - 0.65).abs() < 1e-9);
    }

    #[test]
    fn needs_review_when_invalidity_is_strong() {
        let cfg = EngineConfig::default();
        let v = aggregate(
            &[blocking("US1", 0.9)],
            &[invalidity("US1", 0.95)],
            "wireless charging",
            &cfg,
        );
        assert_eq!(v.status, FtoStatus::NeedsReview);
        assert_eq!(
            kinds(&v),
            vec![RecommendationType::DesignAround, RecommendationType::Reexamination]
        );
    }

    #[test]
    fn clear_at_exact_threshold() {
        let cfg = EngineConfig::default();
        let v = aggregate(&[blocking("US1", 0.7)], &[], "battery", &cfg);
        assert_eq!(v.status, FtoStatus::Clear);
        assert_eq!(kinds(&v), vec![RecommendationType::DesignAround]);
        assert_eq!(v.confidence, 1.0);
    }

    #[test]
    fn empty_run_is_clear() {
        let v = aggregate(&[], &[], "battery", &EngineConfig::default());
        assert_eq!(v.status, FtoStatus::Clear);
        assert_eq!(v.confidence, 1.0);
    }
}
