//! Schema error types
//!
//! Error codes:
//! - AVROFIX_SCHEMA_CONFLICT (REJECT)
//! - AVROFIX_SCHEMA_MALFORMED (REJECT)
//! - AVROFIX_SCHEMA_UNSUPPORTED (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The file is rejected, the run continues
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Two fields end up with the same name
    SchemaConflict,
    /// Schema JSON does not describe a record with named fields
    SchemaMalformed,
    /// Top-level schema is not a flat record
    SchemaUnsupported,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::SchemaConflict => "AVROFIX_SCHEMA_CONFLICT",
            SchemaErrorCode::SchemaMalformed => "AVROFIX_SCHEMA_MALFORMED",
            SchemaErrorCode::SchemaUnsupported => "AVROFIX_SCHEMA_UNSUPPORTED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    /// Field names involved, in schema order
    fields: Vec<String>,
}

impl SchemaError {
    /// Two distinct original fields normalize to the same final name.
    pub fn conflict(target: impl Into<String>, first: impl Into<String>, second: impl Into<String>) -> Self {
        let target = target.into();
        let first = first.into();
        let second = second.into();
        Self {
            code: SchemaErrorCode::SchemaConflict,
            message: format!(
                "fields '{}' and '{}' both normalize to '{}'",
                first, second, target
            ),
            fields: vec![first, second],
        }
    }

    /// The same field name appears more than once in a schema.
    pub fn duplicate_field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::SchemaConflict,
            message: format!("field '{}' is declared more than once", name),
            fields: vec![name],
        }
    }

    /// Schema JSON could not be interpreted.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SchemaMalformed,
            message: reason.into(),
            fields: Vec::new(),
        }
    }

    /// Top-level schema is something other than a record.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SchemaUnsupported,
            message: format!("top-level schema must be a record, found '{}'", kind.into()),
            fields: Vec::new(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field names involved
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Whether this is a naming conflict
    pub fn is_conflict(&self) -> bool {
        self.code == SchemaErrorCode::SchemaConflict
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
