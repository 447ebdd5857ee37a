//! CLI-specific error types
//!
//! Per-file migration failures are reported on stdout and do not surface
//! here; a CliError is what makes the process exit non-zero.

use std::fmt;
use std::io;

use crate::container::ContainerError;
use crate::pipeline::PipelineError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, input discovery)
    IoError,
    /// Nothing to process
    NoInputs,
    /// At least one file failed
    RunFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AVROFIX_CLI_CONFIG_ERROR",
            Self::IoError => "AVROFIX_CLI_IO_ERROR",
            Self::NoInputs => "AVROFIX_CLI_NO_INPUTS",
            Self::RunFailed => "AVROFIX_CLI_RUN_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn no_inputs(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::NoInputs, msg)
    }

    /// `failed` of `total` files did not complete
    pub fn run_failed(failed: usize, total: usize) -> Self {
        Self::new(
            CliErrorCode::RunFailed,
            format!("{} of {} files failed", failed, total),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Config(message) => Self::config_error(message),
            other => Self::io_error(other.to_string()),
        }
    }
}

impl From<ContainerError> for CliError {
    fn from(e: ContainerError) -> Self {
        Self::io_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_keeps_message() {
        let err: CliError = PipelineError::config("output_suffix must not be empty").into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert_eq!(
            err.to_string(),
            "AVROFIX_CLI_CONFIG_ERROR: output_suffix must not be empty"
        );
    }

    #[test]
    fn test_run_failed_message() {
        let err = CliError::run_failed(1, 3);
        assert_eq!(err.code_str(), "AVROFIX_CLI_RUN_FAILED");
        assert_eq!(err.message(), "1 of 3 files failed");
    }
}
