use crate::claims::patterns::PatternTable;
use crate::error::{CoreError, CoreResult};
use crate::model::{Claim, ClaimElement, ClaimIndex, ElementType, PatentRecord};
use crate::normalize::{fold_text, normalize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Effective element set per claim index. A dependent claim's entry starts
/// with every element of its parent's entry.
pub type DecomposedClaims = BTreeMap<ClaimIndex, Vec<ClaimElement>>;

const LEADING_FILLER: &[&str] = &["and ", "or ", "a ", "an ", "the ", "said ", "each "];

pub struct ClaimDecomposer {
    patterns: PatternTable,
}

impl ClaimDecomposer {
    pub fn new() -> CoreResult<Self> {
        Ok(Self {
            patterns: PatternTable::compile()?,
        })
    }

    pub fn decompose(&self, patent: &PatentRecord) -> CoreResult<DecomposedClaims> {
        let pid = patent.identifier.as_str();
        let by_index = index_claims(patent)?;
        let order = resolution_order(pid, &by_index)?;

        let mut categories: HashMap<ClaimIndex, ElementType> = HashMap::new();
        let mut out = DecomposedClaims::new();
        for index in order {
            let claim = by_index[&index];
            let (category, mut own) = match claim.depends_on {
                None => self.decompose_independent(claim),
                Some(parent) => {
                    let parent_category = categories
                        .get(&parent)
                        .copied()
                        .unwrap_or(ElementType::Apparatus);
                    self.decompose_dependent(claim, parent_category)
                }
            };
            categories.insert(index, category);

            let mut effective = match claim.depends_on {
                Some(parent) => out.get(&parent).cloned().unwrap_or_default(),
                None => Vec::new(),
            };
            own.retain(|e| {
                !effective
                    .iter()
                    .any(|p| p.tokens == e.tokens && p.element_type == e.element_type)
            });
            effective.extend(own);
            out.insert(index, effective);
        }
        Ok(out)
    }

    /// Split free text into elements with the same clause rules used for
    /// claim bodies. Used for target technology descriptions and prior art.
    pub fn split_elements(
        &self,
        text: &str,
        category: ElementType,
        source_claim: Option<ClaimIndex>,
    ) -> Vec<ClaimElement> {
        let folded = fold_text(text);
        let segments: Vec<&str> = self
            .patterns
            .clause_boundary
            .split(&folded)
            .filter(|s| !s.trim().is_empty())
            .collect();
        // Inside an enumeration a bare "and"/"or" separates items too, except
        // in parameter ranges such as "between 5 and 10 kw".
        let enumeration = segments.len() > 1;
        let mut elements = Vec::new();
        for segment in segments {
            let split_items = enumeration
                && self.patterns.classify(segment.trim(), category) != ElementType::Parameter;
            let items: Vec<&str> = if split_items {
                self.patterns.list_conjunction.split(segment).collect()
            } else {
                vec![segment]
            };
            for item in items {
                if let Some(element) = self.make_element(item, category, source_claim) {
                    elements.push(element);
                }
            }
        }
        elements
    }

    /// One element from a short phrase, without clause splitting.
    pub fn element_from_phrase(
        &self,
        phrase: &str,
        category: ElementType,
        source_claim: Option<ClaimIndex>,
    ) -> Option<ClaimElement> {
        self.make_element(&fold_text(phrase), category, source_claim)
    }

    pub fn claim_category(&self, preamble: &str) -> ElementType {
        if self.patterns.method_preamble.is_match(&fold_text(preamble)) {
            ElementType::Method
        } else {
            ElementType::Apparatus
        }
    }

    /// Category of an independent claim, read from its preamble.
    pub fn independent_category(&self, claim: &Claim) -> ElementType {
        let folded = self.strip_claim_number(&fold_text(&claim.text));
        let (preamble, body) = self.split_preamble(&folded);
        self.claim_category(if preamble.is_empty() { body } else { preamble })
    }

    fn decompose_independent(&self, claim: &Claim) -> (ElementType, Vec<ClaimElement>) {
        let folded = self.strip_claim_number(&fold_text(&claim.text));
        let (_, body) = self.split_preamble(&folded);
        let category = self.independent_category(claim);
        let elements = self.split_elements(body, category, Some(claim.index));
        (category, elements)
    }

    fn split_preamble<'a>(&self, folded: &'a str) -> (&'a str, &'a str) {
        match self.patterns.transition.find(folded) {
            Some(m) => (&folded[..m.start()], &folded[m.end()..]),
            None => ("", folded),
        }
    }

    fn decompose_dependent(
        &self,
        claim: &Claim,
        parent_category: ElementType,
    ) -> (ElementType, Vec<ClaimElement>) {
        let folded = self.strip_claim_number(&fold_text(&claim.text));
        let (category, body) = match self.patterns.dependency_preamble.find(&folded) {
            Some(m) => {
                let preamble = &folded[..m.end()];
                let category = if self.patterns.method_preamble.is_match(preamble) {
                    ElementType::Method
                } else {
                    parent_category
                };
                (category, &folded[m.end()..])
            }
            None => (parent_category, folded.as_str()),
        };
        let elements = self.split_elements(body, category, Some(claim.index));
        (category, elements)
    }

    fn strip_claim_number(&self, folded: &str) -> String {
        self.patterns.claim_number.replace(folded, "").into_owned()
    }

    fn make_element(
        &self,
        segment: &str,
        category: ElementType,
        source_claim: Option<ClaimIndex>,
    ) -> Option<ClaimElement> {
        let mut text = segment.trim_matches(|c: char| c.is_whitespace() || ",.;:".contains(c));
        loop {
            let before = text;
            for filler in LEADING_FILLER {
                if let Some(rest) = text.strip_prefix(filler) {
                    text = rest.trim_start();
                }
            }
            if before == text {
                break;
            }
        }
        let tokens = normalize(text);
        if tokens.is_empty() {
            return None;
        }
        Some(ClaimElement {
            element_type: self.patterns.classify(segment.trim(), category),
            text: text.to_string(),
            tokens,
            source_claim,
        })
    }
}

/// Convenience wrapper that compiles the pattern table per call.
pub fn decompose(patent: &PatentRecord) -> CoreResult<DecomposedClaims> {
    ClaimDecomposer::new()?.decompose(patent)
}

fn index_claims(patent: &PatentRecord) -> CoreResult<BTreeMap<ClaimIndex, &Claim>> {
    let pid = patent.identifier.as_str();
    let mut by_index = BTreeMap::new();
    for claim in &patent.claims {
        if claim.index == 0 {
            return Err(CoreError::malformed(pid, "claim indices are 1-based"));
        }
        if by_index.insert(claim.index, claim).is_some() {
            return Err(CoreError::malformed(
                pid,
                format!("duplicate claim index {}", claim.index),
            ));
        }
        match (claim.is_independent, claim.depends_on) {
            (true, Some(_)) => {
                return Err(CoreError::malformed(
                    pid,
                    format!("claim {} is marked independent but has a parent", claim.index),
                ))
            }
            (false, None) => {
                return Err(CoreError::malformed(
                    pid,
                    format!("dependent claim {} has no parent", claim.index),
                ))
            }
            _ => {}
        }
    }
    for claim in &patent.claims {
        if let Some(parent) = claim.depends_on {
            if !by_index.contains_key(&parent) {
                return Err(CoreError::malformed(
                    pid,
                    format!("claim {} depends on missing claim {}", claim.index, parent),
                ));
            }
        }
    }
    Ok(by_index)
}

/// Parents before children. Each claim has at most one parent, so walking the
/// parent chain and watching for a repeat is enough to find cycles.
fn resolution_order(
    pid: &str,
    by_index: &BTreeMap<ClaimIndex, &Claim>,
) -> CoreResult<Vec<ClaimIndex>> {
    let mut resolved: HashSet<ClaimIndex> = HashSet::new();
    let mut order = Vec::with_capacity(by_index.len());

    for &start in by_index.keys() {
        let mut path = Vec::new();
        let mut on_path = HashSet::new();
        let mut cursor = Some(start);
        while let Some(index) = cursor {
            if resolved.contains(&index) {
                break;
            }
            if !on_path.insert(index) {
                return Err(CoreError::malformed(
                    pid,
                    format!("cyclic claim dependency involving claim {}", index),
                ));
            }
            path.push(index);
            cursor = by_index.get(&index).and_then(|c| c.depends_on);
        }
        for index in path.into_iter().rev() {
            resolved.insert(index);
            order.push(index);
        }
    }

    for claim in by_index.values() {
        if let Some(parent) = claim.depends_on {
            if parent >= claim.index {
                return Err(CoreError::malformed(
                    pid,
                    format!(
                        "claim {} must depend on a lower claim index, got {}",
                        claim.index, parent
                    ),
                ));
            }
        }
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn record(claims: Vec<Claim>) -> PatentRecord {
        PatentRecord {
            identifier: "US1234567B2".to_string(),
            title: "Electric Vehicle Battery Management System".to_string(),
            abstract_text: String::new(),
            claims,
            filing_date: date!(2023 - 01 - 15),
            issue_date: None,
            assignee: "Example Corp".to_string(),
            classification_codes: Default::default(),
        }
    }

    #[test]
    fn splits_body_after_transition() {
        let patent = record(vec![Claim::independent(
            1,
            "1. A charging system comprising: wireless power transfer; resonant coupling; and a vehicle interface.",
        )]);
        let out = decompose(&patent).unwrap();
        let texts: Vec<&str> = out[&1].iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["wireless power transfer", "resonant coupling", "vehicle interface"]
        );
        assert!(out[&1]
            .iter()
            .all(|e| e.element_type == ElementType::Apparatus));
    }

    #[test]
    fn bare_conjunction_splits_enumerated_items() {
        let patent = record(vec![Claim::independent(
            1,
            "A charging system comprising: wireless power transfer; resonant coupling and vehicle interface.",
        )]);
        let out = decompose(&patent).unwrap();
        let texts: Vec<&str> = out[&1].iter().map(|e| e.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["wireless power transfer", "resonant coupling", "vehicle interface"]
        );

        let ranged = record(vec![Claim::independent(
            1,
            "A charger comprising: a coil; an output between 5 and 10 kw.",
        )]);
        let out = decompose(&ranged).unwrap();
        assert_eq!(out[&1].len(), 2);
        assert_eq!(out[&1][1].element_type, ElementType::Parameter);
    }

    #[test]
    fn dependent_claim_inherits_parent_elements() {
        let patent = record(vec![
            Claim::independent(1, "A charger comprising a coil; and a controller."),
            Claim::dependent(2, 1, "The charger of claim 1, wherein the coil is a litz wire coil."),
            Claim::dependent(3, 2, "The charger of claim 2, further comprising a ferrite shield."),
        ]);
        let out = decompose(&patent).unwrap();
        for (child, parent) in [(2, 1), (3, 2)] {
            for e in &out[&parent] {
                assert!(out[&child].contains(e), "claim {} lost {:?}", child, e.text);
            }
        }
        assert!(out[&3].len() > out[&2].len());
        assert_eq!(out[&3].last().unwrap().text, "ferrite shield");
        assert_eq!(out[&3].last().unwrap().source_claim, Some(3));
    }

    #[test]
    fn method_claims_tag_steps() {
        let patent = record(vec![Claim::independent(
            1,
            "A method of charging comprising: receiving a charge request; determining a coil offset; and charging the battery at a current of at least 16 A.",
        )]);
        let out = decompose(&patent).unwrap();
        let types: Vec<ElementType> = out[&1].iter().map(|e| e.element_type).collect();
        assert_eq!(
            types,
            vec![ElementType::Step, ElementType::Step, ElementType::Parameter]
        );
    }

    #[test]
    fn cyclic_dependency_is_malformed() {
        let patent = record(vec![
            Claim::independent(1, "A charger comprising a coil."),
            Claim::dependent(2, 3, "The charger of claim 3, wherein the coil is round."),
            Claim::dependent(3, 2, "The charger of claim 2, wherein the coil is flat."),
        ]);
        let err = decompose(&patent).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput { .. }));
        assert!(err.to_string().contains("cyclic"));
    }

    #[test]
    fn dangling_and_forward_references_are_malformed() {
        let dangling = record(vec![
            Claim::independent(1, "A charger comprising a coil."),
            Claim::dependent(2, 7, "The charger of claim 7, wherein the coil is round."),
        ]);
        assert!(decompose(&dangling).is_err());

        let forward = record(vec![
            Claim::dependent(1, 2, "The charger of claim 2, wherein the coil is round."),
            Claim::independent(2, "A charger comprising a coil."),
        ]);
        let err = decompose(&forward).unwrap_err();
        assert!(err.to_string().contains("lower claim index"));
    }
}
