//! Per-file and per-run reports
//!
//! A report is produced for every input, success or failure, so no
//! failure can go unobserved.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

use super::errors::{ErrorKind, PipelineError};
use crate::migrate::SkippedRule;
use crate::schema::RenameRule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedField {
    pub from: String,
    pub to: String,
    pub rule: RenameRule,
}

/// Summary of one successfully migrated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub records: usize,
    /// Migrated schema field names, in order
    pub fields: Vec<String>,
    pub removed: Vec<String>,
    pub renamed: Vec<RenamedField>,
    pub rewrites: usize,
    pub skipped: Vec<SkippedRule>,
    pub bytes: u64,
    /// CRC32 of the output file, hex
    pub checksum: String,
    /// Leading migrated records
    pub preview: Vec<JsonValue>,
}

/// Summary of one failed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub input: PathBuf,
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
}

impl FileFailure {
    pub fn new(input: PathBuf, error: &PipelineError) -> Self {
        Self {
            input,
            kind: error.kind(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Migrated(FileReport),
    Failed(FileFailure),
}

impl FileOutcome {
    pub fn input(&self) -> &PathBuf {
        match self {
            FileOutcome::Migrated(report) => &report.input,
            FileOutcome::Failed(failure) => &failure.input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Migrated(_))
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub files: Vec<FileOutcome>,
    /// Inputs never attempted because the run aborted
    pub not_attempted: Vec<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn aborted(&self) -> bool {
        !self.not_attempted.is_empty()
    }

    /// True when every input was migrated
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && !self.aborted()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileFailure> {
        self.files.iter().filter_map(|f| match f {
            FileOutcome::Failed(failure) => Some(failure),
            FileOutcome::Migrated(_) => None,
        })
    }

    /// Compact summary without per-file details
    pub fn summary(&self) -> JsonValue {
        serde_json::json!({
            "files": self.files.len(),
            "succeeded": self.succeeded(),
            "failed": self.failed(),
            "not_attempted": self.not_attempted,
            "started_at": self.started_at.to_rfc3339(),
            "finished_at": self.finished_at.to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerError;
    use std::path::Path;

    fn failure(path: &str) -> FileOutcome {
        let err: PipelineError = ContainerError::invalid(Path::new(path), "bad magic").into();
        FileOutcome::Failed(FileFailure::new(PathBuf::from(path), &err))
    }

    fn success(path: &str) -> FileOutcome {
        FileOutcome::Migrated(FileReport {
            input: PathBuf::from(path),
            output: PathBuf::from(format!("{}new", path)),
            records: 1,
            fields: vec!["Name".into()],
            removed: Vec::new(),
            renamed: Vec::new(),
            rewrites: 0,
            skipped: Vec::new(),
            bytes: 10,
            checksum: "00000000".into(),
            preview: Vec::new(),
        })
    }

    #[test]
    fn test_counts() {
        let now = Utc::now();
        let report = RunReport {
            files: vec![success("a.avro"), failure("b.avro"), success("c.avro")],
            not_attempted: Vec::new(),
            started_at: now,
            finished_at: now,
        };
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert_eq!(
            report.failures().map(|f| f.kind).collect::<Vec<_>>(),
            vec![ErrorKind::ReadError]
        );
        assert_eq!(report.summary()["failed"], 1);
    }

    #[test]
    fn test_outcome_serializes_with_status() {
        let json = serde_json::to_value(failure("b.avro")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "read_error");
        assert_eq!(json["code"], "AVROFIX_READ_ERROR");

        let json = serde_json::to_value(success("a.avro")).unwrap();
        assert_eq!(json["status"], "migrated");
        assert_eq!(json["output"], "a.avronew");
    }
}
