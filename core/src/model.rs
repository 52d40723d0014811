use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use time::Date;

pub type ClaimIndex = u32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claim {
    /// 1-based, unique within the patent.
    pub index: ClaimIndex,
    pub text: String,
    pub is_independent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<ClaimIndex>,
}

impl Claim {
    pub fn independent(index: ClaimIndex, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            is_independent: true,
            depends_on: None,
        }
    }

    pub fn dependent(index: ClaimIndex, parent: ClaimIndex, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            is_independent: false,
            depends_on: Some(parent),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatentRecord {
    pub identifier: String,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    pub claims: Vec<Claim>,
    pub filing_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<Date>,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub classification_codes: BTreeSet<String>,
}

impl PatentRecord {
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        abstract_text: impl Into<String>,
        claims: Vec<Claim>,
        filing_date: Date,
    ) -> CoreResult<Self> {
        let record = Self {
            identifier: identifier.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
            claims,
            filing_date,
            issue_date: None,
            assignee: String::new(),
            classification_codes: BTreeSet::new(),
        };
        record.validate()?;
        Ok(record)
    }

    pub fn with_issue_date(mut self, issue_date: Date) -> Self {
        self.issue_date = Some(issue_date);
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = assignee.into();
        self
    }

    pub fn with_classifications<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classification_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Structural checks on the claim set. Back references must point to a
    /// strictly lower index, which also rules out cycles.
    pub fn validate(&self) -> CoreResult<()> {
        if self.identifier.trim().is_empty() {
            return Err(CoreError::malformed("<unknown>", "empty patent identifier"));
        }
        let mut seen = HashSet::new();
        for claim in &self.claims {
            if claim.index == 0 {
                return Err(CoreError::malformed(
                    &self.identifier,
                    "claim indices are 1-based",
                ));
            }
            if !seen.insert(claim.index) {
                return Err(CoreError::malformed(
                    &self.identifier,
                    format!("duplicate claim index {}", claim.index),
                ));
            }
        }
        for claim in &self.claims {
            match (claim.is_independent, claim.depends_on) {
                (true, Some(parent)) => {
                    return Err(CoreError::malformed(
                        &self.identifier,
                        format!(
                            "claim {} is marked independent but depends on claim {}",
                            claim.index, parent
                        ),
                    ))
                }
                (false, None) => {
                    return Err(CoreError::malformed(
                        &self.identifier,
                        format!("dependent claim {} has no parent", claim.index),
                    ))
                }
                (false, Some(parent)) => {
                    if parent >= claim.index {
                        return Err(CoreError::malformed(
                            &self.identifier,
                            format!(
                                "claim {} must depend on a lower claim index, got {}",
                                claim.index, parent
                            ),
                        ));
                    }
                    if !seen.contains(&parent) {
                        return Err(CoreError::malformed(
                            &self.identifier,
                            format!("claim {} depends on missing claim {}", claim.index, parent),
                        ));
                    }
                }
                (true, None) => {}
            }
        }
        Ok(())
    }

    pub fn claim(&self, index: ClaimIndex) -> Option<&Claim> {
        self.claims.iter().find(|c| c.index == index)
    }

    pub fn independent_claims(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter().filter(|c| c.is_independent)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Apparatus,
    Method,
    Step,
    Parameter,
}

/// One atomic limitation. `source_claim` is the claim that introduced it;
/// elements of a target technology profile have none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimElement {
    pub text: String,
    pub tokens: Vec<String>,
    pub element_type: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_claim: Option<ClaimIndex>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriorArtSource {
    Patent(Box<PatentRecord>),
    Literature {
        title: String,
        #[serde(default)]
        authors: Vec<String>,
        #[serde(default)]
        venue: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorArtReference {
    pub identifier: String,
    pub source: PriorArtSource,
    pub publication_date: Date,
    pub text: String,
}

impl PriorArtReference {
    pub fn literature(
        identifier: impl Into<String>,
        title: impl Into<String>,
        publication_date: Date,
        text: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            source: PriorArtSource::Literature {
                title: title.into(),
                authors: Vec::new(),
                venue: None,
            },
            publication_date,
            text: text.into(),
        }
    }

    /// A patent cited as art is published on its issue date, or its filing
    /// date when it never issued. Its text is the abstract plus all claims.
    pub fn from_patent(patent: PatentRecord) -> Self {
        let mut text = patent.abstract_text.clone();
        for claim in &patent.claims {
            text.push_str("; ");
            text.push_str(&claim.text);
        }
        Self {
            identifier: patent.identifier.clone(),
            publication_date: patent.issue_date.unwrap_or(patent.filing_date),
            source: PriorArtSource::Patent(Box::new(patent)),
            text,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMethod {
    Lexical,
    Structural,
    Blended,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityScore {
    pub source_id: String,
    pub target_id: String,
    pub value: f64,
    pub method: ScoreMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchedElement {
    pub claim_index: ClaimIndex,
    pub target_element: ClaimElement,
    pub candidate_text: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClaimBlockingScore {
    pub claim_index: ClaimIndex,
    pub score: f64,
    pub element_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockingAssessment {
    pub patent_id: String,
    pub score: f64,
    pub is_blocking: bool,
    pub dominant_claim: Option<ClaimIndex>,
    pub matched_elements: Vec<MatchedElement>,
    pub claim_scores: Vec<ClaimBlockingScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedReference {
    pub reference: PriorArtReference,
    pub similarity: SimilarityScore,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvalidityAssessment {
    pub patent_id: String,
    pub score: f64,
    pub is_strong: bool,
    pub broadest_claim: Option<ClaimIndex>,
    pub supporting_references: Vec<RankedReference>,
    pub references_considered: usize,
    /// References dated on or after the filing date.
    pub excluded_by_date: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FtoStatus {
    Clear,
    Blocked,
    NeedsReview,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Licensing,
    DesignAround,
    Reexamination,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patents: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FtoVerdict {
    pub technology: String,
    pub status: FtoStatus,
    pub confidence: f64,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RejectedPatent {
    pub patent_id: String,
    pub reason: String,
}
