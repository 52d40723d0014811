use crate::determinism::run_id::report_id_for;
use crate::engine::{AnalysisOutcome, AnalysisRequest};
use crate::error::CoreResult;
use crate::fto::PriorArtSummary;
use crate::model::{BlockingAssessment, FtoVerdict, InvalidityAssessment, RejectedPatent};
use serde::{Deserialize, Serialize};
use time::Date;

/// One technology-area run, as handed to the reporting side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FtoReport {
    pub report_id: String,
    pub technology: String,
    pub company: String,
    pub analysis_date: Date,
    pub patent_count: usize,
    pub blocking_patents: Vec<String>,
    pub verdict: FtoVerdict,
    pub blocking: Vec<BlockingAssessment>,
    pub invalidity: Vec<InvalidityAssessment>,
    pub rejected: Vec<RejectedPatent>,
    pub prior_art_summary: PriorArtSummary,
}

impl FtoReport {
    /// The report id depends only on the request, so rerunning the same
    /// input yields the same id.
    pub fn build(
        request: &AnalysisRequest,
        company: &str,
        analysis_date: Date,
        outcome: AnalysisOutcome,
    ) -> CoreResult<Self> {
        let blocking_patents = outcome
            .blocking
            .iter()
            .filter(|b| b.is_blocking)
            .map(|b| b.patent_id.clone())
            .collect();
        Ok(Self {
            report_id: report_id_for(request)?,
            technology: request.technology.clone(),
            company: company.to_string(),
            analysis_date,
            patent_count: request.candidates.len(),
            blocking_patents,
            verdict: outcome.verdict,
            blocking: outcome.blocking,
            invalidity: outcome.invalidity,
            rejected: outcome.rejected,
            prior_art_summary: outcome.prior_art_summary,
        })
    }
}
