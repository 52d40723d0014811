use crate::claims::{ClaimDecomposer, DecomposedClaims};
use crate::config::EngineConfig;
use crate::model::{
    ClaimElement, ClaimIndex, ElementType, InvalidityAssessment, PatentRecord,
    PriorArtReference, RankedReference, SimilarityScore,
};
use crate::similarity::{clamp_unit, SimilarityScorer};

/// How strongly the supplied art undermines the patent's broadest
/// independent claim.
///
/// A reference is compared element by element: each claim element takes its
/// best match among the reference's elements and the reference scores the
/// mean over claim elements (every limitation has to be disclosed). The
/// reference text is split with the claim's own category so method steps
/// line up with described steps. Art dated
/// on or after the filing date has zero weight. Below-threshold references
/// are dropped. The patent scores the best remaining reference.
pub fn assess_invalidity(
    patent: &PatentRecord,
    decomposed: &DecomposedClaims,
    prior_art: &[PriorArtReference],
    decomposer: &ClaimDecomposer,
    scorer: &SimilarityScorer,
    config: &EngineConfig,
) -> InvalidityAssessment {
    let broadest = broadest_independent_claim(patent, decomposed);
    let mut excluded_by_date = 0usize;
    let mut ranked = Vec::new();

    if let Some((claim_index, claim_elements)) = broadest {
        let target_id = format!("{}#{}", patent.identifier, claim_index);
        let category = patent
            .claim(claim_index)
            .map(|claim| decomposer.independent_category(claim))
            .unwrap_or(ElementType::Apparatus);
        for reference in prior_art {
            if reference.publication_date >= patent.filing_date {
                excluded_by_date += 1;
                continue;
            }
            let reference_elements =
                decomposer.split_elements(&reference.text, category, None);
            let value = element_coverage(claim_elements, &reference_elements, scorer);
            if !scorer.is_match(value) {
                continue;
            }
            ranked.push(RankedReference {
                reference: reference.clone(),
                similarity: SimilarityScore {
                    source_id: reference.identifier.clone(),
                    target_id: target_id.clone(),
                    value,
                    method: scorer.method(),
                },
            });
        }
    } else {
        excluded_by_date = prior_art
            .iter()
            .filter(|r| r.publication_date >= patent.filing_date)
            .count();
    }

    // Most similar first; older art is stronger evidence on ties.
    ranked.sort_by(|a, b| {
        b.similarity
            .value
            .total_cmp(&a.similarity.value)
            .then_with(|| a.reference.publication_date.cmp(&b.reference.publication_date))
            .then_with(|| a.reference.identifier.cmp(&b.reference.identifier))
    });

    let score = ranked
        .first()
        .map(|r| clamp_unit(r.similarity.value))
        .unwrap_or(0.0);

    InvalidityAssessment {
        patent_id: patent.identifier.clone(),
        score,
        is_strong: score > config.strong_invalidity_threshold,
        broadest_claim: broadest.map(|(index, _)| index),
        supporting_references: ranked,
        references_considered: prior_art.len(),
        excluded_by_date,
    }
}

/// The independent claim with the fewest limitations, lowest index on ties.
/// Claims that decomposed to nothing are skipped.
pub fn broadest_independent_claim<'a>(
    patent: &PatentRecord,
    decomposed: &'a DecomposedClaims,
) -> Option<(ClaimIndex, &'a [ClaimElement])> {
    patent
        .independent_claims()
        .filter_map(|claim| {
            decomposed
                .get(&claim.index)
                .filter(|elements| !elements.is_empty())
                .map(|elements| (claim.index, elements.as_slice()))
        })
        .min_by(|a, b| a.1.len().cmp(&b.1.len()).then(a.0.cmp(&b.0)))
}

fn element_coverage(
    claim_elements: &[ClaimElement],
    reference_elements: &[ClaimElement],
    scorer: &SimilarityScorer,
) -> f64 {
    if claim_elements.is_empty() || reference_elements.is_empty() {
        return 0.0;
    }
    let total: f64 = claim_elements
        .iter()
        .map(|limitation| {
            reference_elements
                .iter()
                .map(|disclosed| scorer.score_pair(limitation, disclosed))
                .fold(0.0, f64::max)
        })
        .sum();
    clamp_unit(total / claim_elements.len() as f64)
}
