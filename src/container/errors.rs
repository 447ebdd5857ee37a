//! Container error types
//!
//! Error codes:
//! - AVROFIX_READ_ERROR (ERROR severity)
//! - AVROFIX_WRITE_ERROR (ERROR severity)
//!
//! Both are per-file: the run skips or aborts according to its policy,
//! but the process itself stays healthy.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Container error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerErrorCode {
    /// Input absent, unreadable, or not a valid container
    ReadError,
    /// Output could not be produced
    WriteError,
}

impl ContainerErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ContainerErrorCode::ReadError => "AVROFIX_READ_ERROR",
            ContainerErrorCode::WriteError => "AVROFIX_WRITE_ERROR",
        }
    }
}

impl fmt::Display for ContainerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Container error with full context
#[derive(Debug)]
pub struct ContainerError {
    code: ContainerErrorCode,
    /// File the error concerns
    path: PathBuf,
    message: String,
    /// Optional details (record index, decoder message)
    details: Option<String>,
    /// Underlying I/O error if applicable
    source: Option<io::Error>,
}

impl ContainerError {
    /// Read failure caused by an I/O error.
    pub fn read_io(path: &Path, message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ContainerErrorCode::ReadError,
            path: path.to_path_buf(),
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Input is not a valid container or holds unsupported content.
    pub fn invalid(path: &Path, message: impl Into<String>) -> Self {
        Self {
            code: ContainerErrorCode::ReadError,
            path: path.to_path_buf(),
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// A data block failed to decode.
    pub fn corrupt_block(path: &Path, record_index: usize, reason: impl Into<String>) -> Self {
        Self {
            code: ContainerErrorCode::ReadError,
            path: path.to_path_buf(),
            message: reason.into(),
            details: Some(format!("record_index: {}", record_index)),
            source: None,
        }
    }

    /// Write failure caused by an I/O error.
    pub fn write_io(path: &Path, message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ContainerErrorCode::WriteError,
            path: path.to_path_buf(),
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Write failure without an I/O source (encoding, path derivation).
    pub fn write_failed(path: &Path, message: impl Into<String>) -> Self {
        Self {
            code: ContainerErrorCode::WriteError,
            path: path.to_path_buf(),
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn code(&self) -> ContainerErrorCode {
        self.code
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn is_read(&self) -> bool {
        self.code == ContainerErrorCode::ReadError
    }

    pub fn is_write(&self) -> bool {
        self.code == ContainerErrorCode::WriteError
    }
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ERROR] {}: {}: {}",
            self.code.code(),
            self.path.display(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ContainerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;
