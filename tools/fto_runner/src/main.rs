use fto_core::audit::log::AuditLog;
use fto_core::engine::{AnalysisRequest, CandidatePatent, FtoEngine};
use fto_core::model::FtoStatus;
use fto_core::run::manager::{ClearingRun, AUDIT_LOG_FILE};
use fto_core::{CoreError, CoreResult, EngineConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct RunInput {
    technology: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    target_phrases: Vec<String>,
    #[serde(default)]
    target_description: Option<String>,
    #[serde(default)]
    candidates: Vec<CandidatePatent>,
}

fn main() {
    // fto_runner <input.json> <out_dir> [config.json]
    //
    // Writes fto_report.json and audit_log.ndjson under out_dir, prints the
    // verdict and exits 1 when the technology is BLOCKED.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("usage: fto_runner <input.json> <out_dir> [config.json]");
        std::process::exit(2);
    }
    let input = PathBuf::from(&args[1]);
    let out_dir = PathBuf::from(&args[2]);
    let config = args.get(3).map(PathBuf::from);

    match run(&input, &out_dir, config.as_deref()) {
        Ok(FtoStatus::Blocked) => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("FTO_RUN FAILED {}", e);
            std::process::exit(2);
        }
    }
}

fn run(input: &Path, out_dir: &Path, config: Option<&Path>) -> CoreResult<FtoStatus> {
    let config = match config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = FtoEngine::new(config)?;

    let raw = std::fs::read_to_string(input)?;
    let input: RunInput = serde_json::from_str(&raw)?;
    let mut target = engine.target_from_phrases(&input.target_phrases);
    if let Some(description) = &input.target_description {
        target.extend(engine.target_from_description(description));
    }
    if target.is_empty() {
        return Err(CoreError::InvalidInput(
            "input needs target_phrases or target_description".to_string(),
        ));
    }
    let request = AnalysisRequest {
        technology: input.technology,
        target,
        candidates: input.candidates,
    };

    let audit = AuditLog::open_or_create(out_dir.join(AUDIT_LOG_FILE))?;
    let mut run = ClearingRun::new(audit);
    let outcome = run.execute(&engine, &request, &input.company, out_dir)?;

    let report = &outcome.report;
    println!(
        "FTO {} status={:?} confidence={:.3} report_id={}",
        report.technology, report.verdict.status, report.verdict.confidence, report.report_id
    );
    for b in &report.blocking {
        println!(
            "PATENT {} blocking={:.3} blocking_flag={}",
            b.patent_id, b.score, b.is_blocking
        );
    }
    for r in &report.rejected {
        println!("REJECTED {} {}", r.patent_id, r.reason);
    }
    for rec in &report.verdict.recommendations {
        println!("RECOMMEND {:?} {:?} {}", rec.kind, rec.priority, rec.description);
    }
    println!(
        "REPORT {} sha256={}",
        outcome.report_path.display(),
        outcome.report_sha256
    );
    Ok(report.verdict.status)
}
