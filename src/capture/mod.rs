use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Syntactic check only: local-part "@" domain "." tld. Deliverability is
/// out of scope.
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern")
    })
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("capture store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture record serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRecord {
    pub email: String,
    pub captured_at: DateTime<Utc>,
}

impl CaptureRecord {
    /// Validates the address and stamps it with the current UTC time.
    pub fn new(email: &str) -> Result<Self, CaptureError> {
        let email = email.trim();
        if !email_pattern().is_match(email) {
            return Err(CaptureError::InvalidEmail(email.to_string()));
        }
        Ok(Self {
            email: email.to_string(),
            captured_at: Utc::now(),
        })
    }
}

/// Append-only record of captured addresses. The engine never touches this;
/// it belongs entirely to the presentation layer.
pub trait CaptureStore: Send + Sync {
    fn append(&self, record: &CaptureRecord) -> Result<(), CaptureError>;
}

/// JSON-lines file store, one record per line. No locking: appends of a
/// single short line are the only write pattern the gate needs.
#[derive(Debug, Clone)]
pub struct FileCaptureStore {
    path: PathBuf,
}

impl FileCaptureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptureStore for FileCaptureStore {
    fn append(&self, record: &CaptureRecord) -> Result<(), CaptureError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        for email in ["user@example.com", "a.b+c@sub.domain.org", "  padded@host.io  "] {
            assert!(CaptureRecord::new(email).is_ok(), "rejected {email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "plain", "no-at.example.com", "user@no-tld", "two@@x.com", "a b@x.com"] {
            assert!(
                matches!(CaptureRecord::new(email), Err(CaptureError::InvalidEmail(_))),
                "accepted {email}"
            );
        }
    }

    #[test]
    fn file_store_appends_one_json_line_per_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FileCaptureStore::new(dir.path().join("captured.jsonl"));

        for email in ["first@example.com", "second@example.com"] {
            let record = CaptureRecord::new(email).expect("valid email");
            store.append(&record).expect("append must succeed");
        }

        let contents = std::fs::read_to_string(store.path()).expect("store file exists");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: CaptureRecord = serde_json::from_str(lines[0]).expect("valid record json");
        assert_eq!(first.email, "first@example.com");
        let second: CaptureRecord = serde_json::from_str(lines[1]).expect("valid record json");
        assert_eq!(second.email, "second@example.com");
    }
}
