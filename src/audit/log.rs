//! Flat-file audit log, one JSON record per line.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::audit::AuditRecord;

/// Separates serialized records. Compact JSON escapes it inside strings.
pub const RECORD_DELIMITER: char = '\n';

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit log I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("audit record could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("serialized audit record contains the record delimiter")]
    DelimiterInRecord,
}

/// A primary result together with the outcome of its audit side effect.
#[derive(Debug)]
pub struct Audited<T> {
    pub value: T,
    pub audit: Result<AuditRecord, AuditError>,
}

impl<T> Audited<T> {
    pub fn is_recorded(&self) -> bool {
        self.audit.is_ok()
    }
}

/// Shared audit log. Every operation holds the same lock, so concurrent
/// appends never interleave and reads never observe a partial record.
pub struct RequestAuditor {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RequestAuditor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record to the end of the log.
    pub async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let line = serialize_record(record)?;

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// All readable records in insertion order. A missing log is empty.
    pub async fn list(&self) -> Result<Vec<AuditRecord>, AuditError> {
        let _guard = self.lock.lock().await;
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(parse_records(&content))
    }

    /// Truncate the log. Clearing an empty or missing log succeeds.
    pub async fn clear(&self) -> Result<(), AuditError> {
        let _guard = self.lock.lock().await;
        fs::write(&self.path, b"").await?;
        Ok(())
    }
}

/// Serialize a record followed by the delimiter.
pub fn serialize_record(record: &AuditRecord) -> Result<String, AuditError> {
    let mut line = serde_json::to_string(record)?;
    if line.contains(RECORD_DELIMITER) {
        return Err(AuditError::DelimiterInRecord);
    }
    line.push(RECORD_DELIMITER);
    Ok(line)
}

/// Split log content on the delimiter, skipping empty and malformed fragments.
pub fn parse_records(content: &str) -> Vec<AuditRecord> {
    content
        .split(RECORD_DELIMITER)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .filter_map(|fragment| match serde_json::from_str(fragment) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Skipping malformed audit entry");
                None
            }
        })
        .collect()
}
