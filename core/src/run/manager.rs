use crate::audit::event::{
    Actor, AuditEvent, ANALYSIS_STARTED, PATENT_ASSESSED, PATENT_REJECTED, REPORT_WRITTEN,
    STAGE_CHANGED, VERDICT_ISSUED,
};
use crate::audit::log::AuditLog;
use crate::determinism::json_canonical;
use crate::determinism::run_id::{run_id_ulid, sha256_hex};
use crate::engine::{AnalysisRequest, FtoEngine};
use crate::error::{CoreError, CoreResult};
use crate::report::FtoReport;
use crate::run::lifecycle::{check_transition, ClearingStage};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

pub const REPORT_FILE: &str = "fto_report.json";
pub const AUDIT_LOG_FILE: &str = "audit_log.ndjson";

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: FtoReport,
    pub report_path: PathBuf,
    pub report_sha256: String,
}

/// Drives one technology area from collected candidates to a written
/// report. The audit log belongs to the run, not to the engine.
pub struct ClearingRun {
    pub audit: AuditLog,
    pub stage: ClearingStage,
    run_id: String,
}

impl ClearingRun {
    pub fn new(audit: AuditLog) -> Self {
        Self {
            audit,
            stage: ClearingStage::Collected,
            run_id: run_id_ulid(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn execute(
        &mut self,
        engine: &FtoEngine,
        request: &AnalysisRequest,
        company: &str,
        out_dir: &Path,
    ) -> CoreResult<RunOutcome> {
        check_transition(self.stage, ClearingStage::Analyzed)?;
        let technology = request.technology.as_str();

        let config_bytes = json_canonical::to_canonical_bytes(engine.config())?;
        self.emit(
            technology,
            ANALYSIS_STARTED,
            Actor::User,
            json!({
                "candidate_count": request.candidates.len(),
                "target_element_count": request.target.len(),
                "config_sha256": sha256_hex(&config_bytes)
            }),
        )?;

        let outcome = engine.analyze(request);
        self.transition(technology, ClearingStage::Analyzed, "per-patent assessments collected")?;
        for (b, i) in outcome.blocking.iter().zip(&outcome.invalidity) {
            self.emit(
                technology,
                PATENT_ASSESSED,
                Actor::System,
                json!({
                    "patent_id": b.patent_id,
                    "blocking_score": b.score,
                    "is_blocking": b.is_blocking,
                    "invalidity_score": i.score,
                    "supporting_reference_count": i.supporting_references.len()
                }),
            )?;
        }
        for r in &outcome.rejected {
            self.emit(
                technology,
                PATENT_REJECTED,
                Actor::System,
                json!({ "patent_id": r.patent_id, "reason": r.reason }),
            )?;
        }

        self.transition(technology, ClearingStage::Aggregated, "verdict computed")?;
        let verdict = &outcome.verdict;
        self.emit(
            technology,
            VERDICT_ISSUED,
            Actor::System,
            json!({
                "status": verdict.status,
                "confidence": verdict.confidence,
                "recommendation_types": verdict
                    .recommendations
                    .iter()
                    .map(|r| r.kind)
                    .collect::<Vec<_>>()
            }),
        )?;

        let analysis_date = OffsetDateTime::now_utc().date();
        let report = FtoReport::build(request, company, analysis_date, outcome)?;
        fs::create_dir_all(out_dir)?;
        let report_path = out_dir.join(REPORT_FILE);
        let bytes = serde_json::to_vec_pretty(&report)?;
        fs::write(&report_path, &bytes)?;
        let report_sha256 = sha256_hex(&bytes);

        self.transition(technology, ClearingStage::Reported, "report written")?;
        self.emit(
            technology,
            REPORT_WRITTEN,
            Actor::System,
            json!({
                "report_id": report.report_id,
                "report_path": report_path.to_string_lossy(),
                "report_sha256": report_sha256
            }),
        )?;
        info!(
            run_id = %self.run_id,
            report_id = %report.report_id,
            path = %report_path.display(),
            "fto report written"
        );

        Ok(RunOutcome {
            report,
            report_path,
            report_sha256,
        })
    }

    fn transition(&mut self, technology: &str, to: ClearingStage, reason: &str) -> CoreResult<()> {
        check_transition(self.stage, to)?;
        self.emit(
            technology,
            STAGE_CHANGED,
            Actor::System,
            json!({
                "from_stage": format!("{:?}", self.stage),
                "to_stage": format!("{:?}", to),
                "reason": reason
            }),
        )?;
        self.stage = to;
        Ok(())
    }

    fn emit(
        &mut self,
        technology: &str,
        event_type: &str,
        actor: Actor,
        details: serde_json::Value,
    ) -> CoreResult<()> {
        let event = AuditEvent::new(
            now_rfc3339_utc()?,
            event_type,
            &self.run_id,
            technology,
            actor,
            details,
        );
        self.audit.append(event)?;
        Ok(())
    }
}

fn now_rfc3339_utc() -> CoreResult<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| CoreError::InvalidInput(format!("timestamp formatting failed: {}", e)))
}
