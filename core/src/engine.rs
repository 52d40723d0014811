//! Per-technology FTO analysis: fan out one task per candidate patent,
//! collect, then aggregate.

use crate::assess::{assess_blocking, assess_invalidity};
use crate::claims::ClaimDecomposer;
use crate::config::EngineConfig;
use crate::error::{CoreError, CoreResult};
use crate::fto::{aggregate, summarize_prior_art, PriorArtSummary};
use crate::model::{
    BlockingAssessment, ClaimElement, ElementType, FtoVerdict, InvalidityAssessment,
    PatentRecord, PriorArtReference, RejectedPatent,
};
use crate::similarity::SimilarityScorer;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidatePatent {
    pub patent: PatentRecord,
    #[serde(default)]
    pub prior_art: Vec<PriorArtReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    pub technology: String,
    pub target: Vec<ClaimElement>,
    pub candidates: Vec<CandidatePatent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatentAnalysis {
    pub blocking: BlockingAssessment,
    pub invalidity: InvalidityAssessment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisOutcome {
    pub verdict: FtoVerdict,
    pub blocking: Vec<BlockingAssessment>,
    pub invalidity: Vec<InvalidityAssessment>,
    pub rejected: Vec<RejectedPatent>,
    pub prior_art_summary: PriorArtSummary,
}

pub struct FtoEngine {
    config: EngineConfig,
    decomposer: ClaimDecomposer,
}

impl FtoEngine {
    /// Fails on an invalid configuration; there is no partially built engine.
    pub fn new(config: EngineConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            decomposer: ClaimDecomposer::new()?,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn decomposer(&self) -> &ClaimDecomposer {
        &self.decomposer
    }

    /// One target element per phrase. Phrases that normalize to nothing are
    /// dropped.
    pub fn target_from_phrases<S: AsRef<str>>(&self, phrases: &[S]) -> Vec<ClaimElement> {
        phrases
            .iter()
            .filter_map(|p| {
                self.decomposer
                    .element_from_phrase(p.as_ref(), ElementType::Apparatus, None)
            })
            .collect()
    }

    /// Split a free-text technology description with the claim clause rules.
    pub fn target_from_description(&self, description: &str) -> Vec<ClaimElement> {
        let category = self.decomposer.claim_category(description);
        self.decomposer.split_elements(description, category, None)
    }

    pub fn analyze_patent(
        &self,
        target: &[ClaimElement],
        candidate: &CandidatePatent,
        scorer: &SimilarityScorer,
    ) -> CoreResult<PatentAnalysis> {
        let patent = &candidate.patent;
        if patent.identifier.trim().is_empty() {
            return Err(CoreError::malformed("", "empty patent identifier"));
        }
        let decomposed = self.decomposer.decompose(patent)?;
        let blocking = assess_blocking(target, patent, &decomposed, scorer, &self.config);
        let invalidity = assess_invalidity(
            patent,
            &decomposed,
            &candidate.prior_art,
            &self.decomposer,
            scorer,
            &self.config,
        );
        debug!(
            patent_id = %patent.identifier,
            blocking = blocking.score,
            invalidity = invalidity.score,
            "patent assessed"
        );
        Ok(PatentAnalysis {
            blocking,
            invalidity,
        })
    }

    /// Malformed patents are reported in `rejected` and left out of the
    /// verdict; the rest of the batch is unaffected.
    pub fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        info!(
            technology = %request.technology,
            candidates = request.candidates.len(),
            target_elements = request.target.len(),
            "fto analysis started"
        );
        let scorer = SimilarityScorer::with_cache(&self.config);

        let results: Vec<(String, CoreResult<PatentAnalysis>)> = request
            .candidates
            .par_iter()
            .map(|candidate| {
                (
                    candidate.patent.identifier.clone(),
                    self.analyze_patent(&request.target, candidate, &scorer),
                )
            })
            .collect();

        let mut blocking = Vec::new();
        let mut invalidity = Vec::new();
        let mut rejected = Vec::new();
        for (patent_id, result) in results {
            match result {
                Ok(analysis) => {
                    blocking.push(analysis.blocking);
                    invalidity.push(analysis.invalidity);
                }
                Err(e) => {
                    warn!(patent_id = %patent_id, error = %e, "patent rejected");
                    rejected.push(RejectedPatent {
                        patent_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let verdict = aggregate(&blocking, &invalidity, &request.technology, &self.config);
        let prior_art_summary = summarize_prior_art(&invalidity, &self.config);
        let (hits, misses, entries) = scorer.cache_stats();
        info!(
            technology = %request.technology,
            status = ?verdict.status,
            confidence = verdict.confidence,
            assessed = blocking.len(),
            rejected = rejected.len(),
            cache_hits = hits,
            cache_misses = misses,
            cache_entries = entries,
            "fto analysis finished"
        );

        AnalysisOutcome {
            verdict,
            blocking,
            invalidity,
            rejected,
            prior_art_summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Claim, FtoStatus, RecommendationType};
    use time::macros::date;

    fn wireless_patent(id: &str) -> PatentRecord {
        PatentRecord::new(
            id,
            "Resonant Wireless Charging of Vehicles",
            "A vehicle charging system using resonant coupling.",
            vec![Claim::independent(
                1,
                "A charging system comprising: wireless power transfer; resonant coupling; and a vehicle interface.",
            )],
            date!(2021 - 03 - 15),
        )
        .unwrap()
    }

    fn cyclic_patent() -> PatentRecord {
        PatentRecord {
            identifier: "US0000001B1".to_string(),
            title: "Broken".to_string(),
            abstract_text: String::new(),
            claims: vec![
                Claim {
                    index: 1,
                    text: "The system of claim 2, wherein a coil is used.".to_string(),
                    is_independent: false,
                    depends_on: Some(2),
                },
                Claim {
                    index: 2,
                    text: "The system of claim 1, wherein a pad is used.".to_string(),
                    is_independent: false,
                    depends_on: Some(1),
                },
            ],
            filing_date: date!(2020 - 01 - 01),
            issue_date: None,
            assignee: String::new(),
            classification_codes: Default::default(),
        }
    }

    #[test]
    fn wireless_charging_is_blocked() {
        let engine = FtoEngine::new(EngineConfig::default()).unwrap();
        let request = AnalysisRequest {
            technology: "wireless charging".to_string(),
            target: engine
                .target_from_phrases(&["wireless power transfer", "resonant inductive coupling"]),
            candidates: vec![CandidatePatent {
                patent: wireless_patent("US9876543B1"),
                prior_art: vec![],
            }],
        };
        let out = engine.analyze(&request);

        assert_eq!(out.blocking.len(), 1);
        assert!(out.blocking[0].score > 0.7);
        assert!(out.blocking[0].is_blocking);
        assert_eq!(out.blocking[0].matched_elements.len(), 1);
        assert_eq!(out.invalidity[0].score, 0.0);
        assert_eq!(out.verdict.status, FtoStatus::Blocked);
        let kinds: Vec<RecommendationType> =
            out.verdict.recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![RecommendationType::Licensing, RecommendationType::DesignAround]
        );
        assert_eq!(out.verdict.confidence, 1.0);
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn cyclic_patent_is_isolated() {
        let engine = FtoEngine::new(EngineConfig::default()).unwrap();
        let request = AnalysisRequest {
            technology: "wireless charging".to_string(),
            target: engine.target_from_phrases(&["wireless power transfer"]),
            candidates: vec![
                CandidatePatent {
                    patent: wireless_patent("US1111111B1"),
                    prior_art: vec![],
                },
                CandidatePatent {
                    patent: cyclic_patent(),
                    prior_art: vec![],
                },
                CandidatePatent {
                    patent: wireless_patent("US2222222B1"),
                    prior_art: vec![],
                },
            ],
        };
        let out = engine.analyze(&request);

        let assessed: Vec<&str> = out.blocking.iter().map(|b| b.patent_id.as_str()).collect();
        assert_eq!(assessed, vec!["US1111111B1", "US2222222B1"]);
        assert_eq!(out.invalidity.len(), 2);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].patent_id, "US0000001B1");
        assert!(out.rejected[0].reason.contains("cyclic"));
        assert_eq!(out.verdict.status, FtoStatus::Blocked);
    }

    #[test]
    fn rejects_invalid_weights() {
        let config = EngineConfig {
            lexical_weight: 0.5,
            structural_weight: 0.6,
            ..EngineConfig::default()
        };
        assert!(matches!(
            FtoEngine::new(config),
            Err(CoreError::Configuration(_))
        ));
    }

    #[test]
    fn description_target_uses_clause_rules() {
        let engine = FtoEngine::new(EngineConfig::default()).unwrap();
        let target = engine.target_from_description(
            "Wireless power transfer; resonant inductive coupling; and a vehicle interface",
        );
        let texts: Vec<&str> = target.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "wireless power transfer",
                "resonant inductive coupling",
                "vehicle interface"
            ]
        );
    }
}
