//! Pipeline error taxonomy
//!
//! Every per-file failure is one of four kinds: read, schema conflict,
//! record/schema mismatch, or write. Configuration problems are reported
//! before any file is touched.

use serde::Serialize;
use thiserror::Error;

use crate::container::ContainerError;
use crate::migrate::{MigrateError, MigrateErrorCode};
use crate::schema::SchemaError;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error kind reported per file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ReadError,
    SchemaConflictError,
    RecordSchemaMismatchError,
    WriteError,
    ConfigError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ReadError => "ReadError",
            ErrorKind::SchemaConflictError => "SchemaConflictError",
            ErrorKind::RecordSchemaMismatchError => "RecordSchemaMismatchError",
            ErrorKind::WriteError => "WriteError",
            ErrorKind::ConfigError => "ConfigError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Migrate(#[from] MigrateError),

    #[error("[ERROR] AVROFIX_CONFIG_ERROR: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Config(message.into())
    }

    /// Which of the per-file error kinds this is
    ///
    /// Record-level failures all report as `RecordSchemaMismatchError`:
    /// a checked rename that finds its source missing or its target taken
    /// leaves a record whose keys disagree with the migrated schema. The
    /// precise cause stays available through `code()`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Container(e) if e.is_write() => ErrorKind::WriteError,
            PipelineError::Container(_) => ErrorKind::ReadError,
            PipelineError::Schema(e) if e.is_conflict() => ErrorKind::SchemaConflictError,
            // Malformed or unsupported schemas only arise while reading
            PipelineError::Schema(_) => ErrorKind::ReadError,
            PipelineError::Migrate(e) => match e.code() {
                MigrateErrorCode::RecordSchemaMismatch
                | MigrateErrorCode::RecordKeyMissing
                | MigrateErrorCode::RecordKeyExists => ErrorKind::RecordSchemaMismatchError,
            },
            PipelineError::Config(_) => ErrorKind::ConfigError,
        }
    }

    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Container(e) => e.code().code(),
            PipelineError::Schema(e) => e.code().code(),
            PipelineError::Migrate(e) => e.code().code(),
            PipelineError::Config(_) => "AVROFIX_CONFIG_ERROR",
        }
    }
}
