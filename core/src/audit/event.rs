use crate::determinism::json_canonical;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEvent {
    pub ts_utc: String, // RFC3339 UTC
    pub event_type: String,
    pub run_id: String,
    pub technology: String,
    pub actor: Actor,
    pub details: serde_json::Value,
    pub prev_event_hash: String, // hex 64
    pub event_hash: String,      // hex 64
}

impl AuditEvent {
    /// Unchained event; `AuditLog::append` fills in both hashes.
    pub fn new(
        ts_utc: impl Into<String>,
        event_type: &str,
        run_id: &str,
        technology: &str,
        actor: Actor,
        details: serde_json::Value,
    ) -> Self {
        Self {
            ts_utc: ts_utc.into(),
            event_type: event_type.to_string(),
            run_id: run_id.to_string(),
            technology: technology.to_string(),
            actor,
            details,
            prev_event_hash: String::new(),
            event_hash: String::new(),
        }
    }
}

pub const ZERO_HASH_64: &str = "0000000000000000000000000000000000000000000000000000000000000000";

pub const ANALYSIS_STARTED: &str = "ANALYSIS_STARTED";
pub const STAGE_CHANGED: &str = "STAGE_CHANGED";
pub const PATENT_ASSESSED: &str = "PATENT_ASSESSED";
pub const PATENT_REJECTED: &str = "PATENT_REJECTED";
pub const VERDICT_ISSUED: &str = "VERDICT_ISSUED";
pub const REPORT_WRITTEN: &str = "REPORT_WRITTEN";

// event_hash = SHA-256 over the canonical bytes of the whole envelope, with
// event_hash itself set to ZERO_HASH_64 while hashing.
pub fn compute_event_hash(event: &AuditEvent) -> CoreResult<String> {
    let mut e = event.clone();
    e.event_hash = ZERO_HASH_64.to_string();
    let bytes = json_canonical::to_canonical_bytes(&e)?;
    let mut h = Sha256::new();
    h.update(bytes);
    Ok(hex::encode(h.finalize()))
}

pub fn finalize_event(mut event: AuditEvent) -> CoreResult<AuditEvent> {
    if !is_hex_64(&event.prev_event_hash) {
        return Err(CoreError::InvalidInput(
            "prev_event_hash must be 64 hex chars".to_string(),
        ));
    }
    validate_event_taxonomy(&event)?;
    event.event_hash = compute_event_hash(&event)?;
    Ok(event)
}

pub(crate) fn is_hex_64(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_event_taxonomy(event: &AuditEvent) -> CoreResult<()> {
    let Some(required) = required_detail_keys(&event.event_type) else {
        return Err(CoreError::InvalidInput(format!(
            "unknown event_type {}",
            event.event_type
        )));
    };
    for k in required {
        if event.details.get(k).is_none() {
            return Err(CoreError::InvalidInput(format!(
                "event {} missing details.{}",
                event.event_type, k
            )));
        }
    }
    Ok(())
}

fn required_detail_keys(event_type: &str) -> Option<&'static [&'static str]> {
    let keys: &'static [&'static str] = match event_type {
        ANALYSIS_STARTED => &["candidate_count", "target_element_count", "config_sha256"],
        STAGE_CHANGED => &["from_stage", "to_stage", "reason"],
        PATENT_ASSESSED => &[
            "patent_id",
            "blocking_score",
            "is_blocking",
            "invalidity_score",
            "supporting_reference_count",
        ],
        PATENT_REJECTED => &["patent_id", "reason"],
        VERDICT_ISSUED => &["status", "confidence", "recommendation_types"],
        REPORT_WRITTEN => &["report_id", "report_path", "report_sha256"],
        _ => return None,
    };
    Some(keys)
}
