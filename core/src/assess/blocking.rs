use crate::claims::DecomposedClaims;
use crate::config::EngineConfig;
use crate::model::{
    BlockingAssessment, ClaimBlockingScore, ClaimElement, ClaimIndex, MatchedElement,
    PatentRecord,
};
use crate::similarity::{clamp_unit, SimilarityScorer};

/// Blocking risk of one candidate patent against the target element set.
///
/// Only independent claims are scored; a claim's score is its best
/// above-threshold element match, and the patent takes the best claim.
/// Among equally scored claims the one with fewer elements is reported as
/// dominant.
pub fn assess_blocking(
    target: &[ClaimElement],
    candidate: &PatentRecord,
    decomposed: &DecomposedClaims,
    scorer: &SimilarityScorer,
    config: &EngineConfig,
) -> BlockingAssessment {
    let mut claim_scores = Vec::new();
    let mut best: Option<(ClaimIndex, f64, usize, Vec<MatchedElement>)> = None;

    for claim in candidate.independent_claims() {
        let elements = decomposed
            .get(&claim.index)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let matches = match_elements(claim.index, elements, target, scorer);
        let score = matches.iter().map(|m| m.similarity).fold(0.0, f64::max);

        claim_scores.push(ClaimBlockingScore {
            claim_index: claim.index,
            score,
            element_count: elements.len(),
        });

        if score <= 0.0 {
            continue;
        }
        let replace = match &best {
            None => true,
            Some((_, best_score, best_count, _)) => {
                score > *best_score || (score == *best_score && elements.len() < *best_count)
            }
        };
        if replace {
            best = Some((claim.index, score, elements.len(), matches));
        }
    }

    let (dominant_claim, score, matched_elements) = match best {
        Some((index, score, _, mut matches)) => {
            matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
            (Some(index), clamp_unit(score), matches)
        }
        None => (None, 0.0, Vec::new()),
    };

    BlockingAssessment {
        patent_id: candidate.identifier.clone(),
        score,
        is_blocking: score > config.blocking_threshold,
        dominant_claim,
        matched_elements,
        claim_scores,
    }
}

fn match_elements(
    claim_index: ClaimIndex,
    elements: &[ClaimElement],
    target: &[ClaimElement],
    scorer: &SimilarityScorer,
) -> Vec<MatchedElement> {
    let mut matches = Vec::new();
    for element in elements {
        for wanted in target {
            let similarity = scorer.score_pair(element, wanted);
            if scorer.is_match(similarity) {
                matches.push(MatchedElement {
                    claim_index,
                    target_element: wanted.clone(),
                    candidate_text: element.text.clone(),
                    similarity,
                });
            }
        }
    }
    matches
}
