use crate::determinism::json_canonical;
use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use sha2::{Digest, Sha256};
use ulid::Ulid;

/// `fto_` plus the first 32 hex chars of a fingerprint.
pub fn report_id_from_fingerprint_hex32(fingerprint_hex: &str) -> CoreResult<String> {
    let hex = fingerprint_hex.trim();
    if hex.len() < 32 || !hex.chars().take(32).all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidInput(
            "report fingerprint must be hex with length >= 32".to_string(),
        ));
    }
    Ok(format!("fto_{}", hex[..32].to_ascii_lowercase()))
}

/// Deterministic report id over the canonical JSON of the analysis input.
pub fn report_id_for<T: Serialize>(input: &T) -> CoreResult<String> {
    let bytes = json_canonical::to_canonical_bytes(input)?;
    report_id_from_fingerprint_hex32(&sha256_hex(&bytes))
}

pub fn run_id_ulid() -> String {
    format!("r_{}", Ulid::new())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut h = Sha256::new();
    h.update(bytes);
    hex::encode(h.finalize())
}
