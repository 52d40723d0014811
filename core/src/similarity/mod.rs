//! Blended lexical + structural similarity.
//!
//! `blended = w_lex * jaccard(tokens) + w_struct * alignment`. For two claim
//! elements the alignment term is the token-order alignment gated by the
//! element-type alignment, so a step never structurally matches an apparatus
//! limitation. Every score is clamped to [0,1] and an empty side scores 0.0.

pub mod cache;
pub mod lexical;
pub mod structural;

use crate::config::EngineConfig;
use crate::model::{ClaimElement, ScoreMethod};
use cache::{CacheKey, ScoreCache};
use lexical::lexical_overlap;
use std::sync::Mutex;
use structural::{alignment, element_type_alignment};

pub struct SimilarityScorer {
    lexical_weight: f64,
    structural_weight: f64,
    threshold: f64,
    cache: Option<Mutex<ScoreCache>>,
}

impl SimilarityScorer {
    /// Uncached scorer.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            lexical_weight: config.lexical_weight,
            structural_weight: config.structural_weight,
            threshold: config.similarity_threshold,
            cache: None,
        }
    }

    /// Scorer with a bounded memo shared by every worker of one run.
    pub fn with_cache(config: &EngineConfig) -> Self {
        Self {
            cache: Some(Mutex::new(ScoreCache::new(config.cache_capacity))),
            ..Self::new(config)
        }
    }

    /// Below-threshold scores are non-matches and never aggregated.
    pub fn is_match(&self, value: f64) -> bool {
        value >= self.threshold
    }

    pub fn score(&self, a: &[String], b: &[String]) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }
        let Some(cache) = &self.cache else {
            return self.blend(lexical_overlap(a, b), alignment(a, b));
        };
        let key = CacheKey::for_pair(a, b);
        if let Ok(mut guard) = cache.lock() {
            if let Some(v) = guard.get(&key) {
                return v;
            }
        }
        let value = self.blend(lexical_overlap(a, b), alignment(a, b));
        if let Ok(mut guard) = cache.lock() {
            guard.insert(key, value);
        }
        value
    }

    /// Element against element. Tokens are compared as in [`Self::score`];
    /// when the element types differ the structural term is zero.
    pub fn score_pair(&self, a: &ClaimElement, b: &ClaimElement) -> f64 {
        if a.tokens.is_empty() || b.tokens.is_empty() {
            return 0.0;
        }
        let type_alignment =
            element_type_alignment(std::slice::from_ref(a), std::slice::from_ref(b));
        if type_alignment < 1.0 {
            return self.blend(lexical_overlap(&a.tokens, &b.tokens), 0.0);
        }
        self.score(&a.tokens, &b.tokens)
    }

    /// Which signal the configured weights actually use.
    pub fn method(&self) -> ScoreMethod {
        if self.structural_weight == 0.0 {
            ScoreMethod::Lexical
        } else if self.lexical_weight == 0.0 {
            ScoreMethod::Structural
        } else {
            ScoreMethod::Blended
        }
    }

    /// (hits, misses, entries); zeros when uncached.
    pub fn cache_stats(&self) -> (u64, u64, usize) {
        match &self.cache {
            Some(cache) => match cache.lock() {
                Ok(guard) => (guard.hits(), guard.misses(), guard.len()),
                Err(_) => (0, 0, 0),
            },
            None => (0, 0, 0),
        }
    }

    fn blend(&self, lexical: f64, structural: f64) -> f64 {
        clamp_unit(self.lexical_weight * lexical + self.structural_weight * structural)
    }
}

/// Clamp into [0,1]; NaN maps to 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementType;
    use crate::normalize::normalize;

    #[test]
    fn reflexive_and_symmetric() {
        let scorer = SimilarityScorer::new(&EngineConfig::default());
        let a = normalize("resonant inductive coupling between coils");
        let b = normalize("inductive coupling of a resonant coil pair");
        assert_eq!(scorer.score(&a, &a), 1.0);
        assert_eq!(scorer.score(&a, &b), scorer.score(&b, &a));
    }

    #[test]
    fn partial_overlap_falls_below_default_threshold() {
        let scorer = SimilarityScorer::new(&EngineConfig::default());
        let v = scorer.score(
            &normalize("resonant coupling"),
            &normalize("resonant inductive coupling"),
        );
        assert!((v - 2.0 / 3.0).abs() < 1e-9);
        assert!(!scorer.is_match(v));
    }

    #[test]
    fn empty_inputs_score_zero() {
        let scorer = SimilarityScorer::new(&EngineConfig::default());
        assert_eq!(scorer.score(&[], &normalize("coil")), 0.0);
        assert_eq!(scorer.score(&[], &[]), 0.0);
    }

    fn element(text: &str, element_type: ElementType) -> ClaimElement {
        ClaimElement {
            text: text.to_string(),
            tokens: normalize(text),
            element_type,
            source_claim: None,
        }
    }

    #[test]
    fn element_type_mismatch_loses_structural_credit() {
        let scorer = SimilarityScorer::new(&EngineConfig::default());
        let step = element("receiving a charge request", ElementType::Step);
        let apparatus = element("receiving a charge request", ElementType::Apparatus);
        assert_eq!(scorer.score_pair(&step, &step), 1.0);
        let mixed = scorer.score_pair(&step, &apparatus);
        assert!((mixed - 0.6).abs() < 1e-9);
        assert!(!scorer.is_match(mixed));
        assert_eq!(mixed, scorer.score_pair(&apparatus, &step));
        assert_eq!(scorer.score_pair(&element("", ElementType::Step), &step), 0.0);
    }

    #[test]
    fn method_follows_weights() {
        let mut cfg = EngineConfig::default();
        assert_eq!(SimilarityScorer::new(&cfg).method(), ScoreMethod::Blended);
        cfg.lexical_weight = 1.0;
        cfg.structural_weight = 0.0;
        assert_eq!(SimilarityScorer::new(&cfg).method(), ScoreMethod::Lexical);
        cfg.lexical_weight = 0.0;
        cfg.structural_weight = 1.0;
        assert_eq!(SimilarityScorer::new(&cfg).method(), ScoreMethod::Structural);
    }

    #[test]
    fn cached_scores_match_uncached() {
        let cfg = EngineConfig::default();
        let plain = SimilarityScorer::new(&cfg);
        let cached = SimilarityScorer::with_cache(&cfg);
        let a = normalize("battery pack coupled to a charging controller");
        let b = normalize("charging controller for a battery");
        let first = cached.score(&a, &b);
        let second = cached.score(&b, &a);
        assert_eq!(first, plain.score(&a, &b));
        assert_eq!(first, second);
        let (hits, misses, entries) = cached.cache_stats();
        assert_eq!((hits, misses, entries), (1, 1, 1));
    }
}
