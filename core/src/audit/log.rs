use crate::audit::event::{compute_event_hash, finalize_event, AuditEvent, ZERO_HASH_64};
use crate::error::{CoreError, CoreResult};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Append-only NDJSON audit log; each line chains to the previous one by
/// hash.
pub struct AuditLog {
    path: PathBuf,
    last_hash: String,
}

impl AuditLog {
    /// Opening an existing log verifies the whole chain before resuming it.
    pub fn open_or_create(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(&path)?;
            return Ok(Self {
                path,
                last_hash: ZERO_HASH_64.to_string(),
            });
        }
        let events = read_events(&path)?;
        let last_hash = verify_chain(&events)?;
        Ok(Self { path, last_hash })
    }

    pub fn append(&mut self, mut event: AuditEvent) -> CoreResult<AuditEvent> {
        event.prev_event_hash = self.last_hash.clone();
        let event = finalize_event(event)?;
        let line = serde_json::to_string(&event)?;
        let mut f = OpenOptions::new().append(true).open(&self.path)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        self.last_hash = event.event_hash.clone();
        Ok(event)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }
}

pub fn read_events(path: impl AsRef<Path>) -> CoreResult<Vec<AuditEvent>> {
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        events.push(serde_json::from_str(&line)?);
    }
    Ok(events)
}

/// Check links and hashes in order; returns the hash of the last event.
pub fn verify_chain(events: &[AuditEvent]) -> CoreResult<String> {
    let mut prev = ZERO_HASH_64.to_string();
    for (i, event) in events.iter().enumerate() {
        if event.prev_event_hash != prev {
            return Err(CoreError::InvalidInput(format!(
                "audit chain broken at line {}",
                i + 1
            )));
        }
        if compute_event_hash(event)? != event.event_hash {
            return Err(CoreError::InvalidInput(format!(
                "audit event hash mismatch at line {}",
                i + 1
            )));
        }
        prev = event.event_hash.clone();
    }
    Ok(prev)
}
