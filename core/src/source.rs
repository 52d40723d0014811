use crate::engine::CandidatePatent;
use crate::error::CoreResult;
use crate::model::{PatentRecord, PriorArtReference};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Where patent records come from. Search, pagination and retries live
/// behind this boundary; the engine only sees the returned records.
pub trait PatentSource {
    fn fetch(&self, technology: &str) -> CoreResult<Vec<PatentRecord>>;

    fn prior_art(&self, _patent: &PatentRecord) -> CoreResult<Vec<PriorArtReference>> {
        Ok(Vec::new())
    }
}

// USPTO classes per technology area.
const CLASSIFICATION_MAP: &[(&str, &[&str])] = &[
    ("electric vehicles", &["320/132", "320/134", "320/108", "180/65.1"]),
    ("battery technology", &["429/1", "429/7", "429/9", "429/50"]),
    ("power electronics", &["363/1", "363/15", "363/17", "363/132"]),
    ("charging systems", &["320/107", "320/108", "320/109", "307/104"]),
    ("energy storage", &["429/1", "429/7", "429/9", "429/50"]),
    ("wireless power", &["307/104", "320/108", "343/741", "343/742"]),
    ("motor controllers", &["318/1", "318/400", "318/599", "318/800"]),
];

/// Classification codes for a technology area; empty for unknown areas.
pub fn classification_codes(technology: &str) -> Vec<&'static str> {
    let key = technology.trim().to_lowercase();
    CLASSIFICATION_MAP
        .iter()
        .find(|(area, _)| *area == key)
        .map(|(_, codes)| codes.to_vec())
        .unwrap_or_default()
}

/// First occurrence of each identifier wins; records without an identifier
/// are dropped.
pub fn dedup_by_identifier(records: Vec<PatentRecord>) -> Vec<PatentRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| !r.identifier.trim().is_empty())
        .filter(|r| seen.insert(r.identifier.clone()))
        .collect()
}

/// Fetch, dedup and attach prior art, ready for `FtoEngine::analyze`.
pub fn collect_candidates(
    source: &dyn PatentSource,
    technology: &str,
) -> CoreResult<Vec<CandidatePatent>> {
    let fetched = source.fetch(technology)?;
    let fetched_count = fetched.len();
    let patents = dedup_by_identifier(fetched);
    debug!(
        technology,
        fetched = fetched_count,
        kept = patents.len(),
        "patent records collected"
    );
    patents
        .into_iter()
        .map(|patent| {
            let prior_art = source.prior_art(&patent)?;
            Ok(CandidatePatent { patent, prior_art })
        })
        .collect()
}

/// Source over records already in memory. Fetch keeps the records that share
/// a classification code with the technology area; an unmapped area returns
/// every record.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPatentSource {
    patents: Vec<PatentRecord>,
    prior_art: BTreeMap<String, Vec<PriorArtReference>>,
}

impl InMemoryPatentSource {
    pub fn new(patents: Vec<PatentRecord>) -> Self {
        Self {
            patents,
            prior_art: BTreeMap::new(),
        }
    }

    pub fn with_prior_art(
        mut self,
        patent_id: impl Into<String>,
        references: Vec<PriorArtReference>,
    ) -> Self {
        self.prior_art
            .entry(patent_id.into())
            .or_default()
            .extend(references);
        self
    }
}

impl PatentSource for InMemoryPatentSource {
    fn fetch(&self, technology: &str) -> CoreResult<Vec<PatentRecord>> {
        let codes = classification_codes(technology);
        if codes.is_empty() {
            return Ok(self.patents.clone());
        }
        Ok(self
            .patents
            .iter()
            .filter(|p| codes.iter().any(|c| p.classification_codes.contains(*c)))
            .cloned()
            .collect())
    }

    fn prior_art(&self, patent: &PatentRecord) -> CoreResult<Vec<PriorArtReference>> {
        Ok(self
            .prior_art
            .get(&patent.identifier)
            .cloned()
            .unwrap_or_default())
    }
}
