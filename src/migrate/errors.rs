//! Record migration error types
//!
//! Error codes:
//! - AVROFIX_RECORD_SCHEMA_MISMATCH (REJECT)
//! - AVROFIX_RECORD_KEY_MISSING (REJECT)
//! - AVROFIX_RECORD_KEY_EXISTS (REJECT)

use std::fmt;

/// Record migration error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateErrorCode {
    /// Migrated key set differs from the target schema
    RecordSchemaMismatch,
    /// Checked rename or insert referenced an absent key
    RecordKeyMissing,
    /// Checked rename or insert would overwrite an existing key
    RecordKeyExists,
}

impl MigrateErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            MigrateErrorCode::RecordSchemaMismatch => "AVROFIX_RECORD_SCHEMA_MISMATCH",
            MigrateErrorCode::RecordKeyMissing => "AVROFIX_RECORD_KEY_MISSING",
            MigrateErrorCode::RecordKeyExists => "AVROFIX_RECORD_KEY_EXISTS",
        }
    }
}

impl fmt::Display for MigrateErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Key difference between a record and the schema it must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    /// Schema fields the record lacks
    pub missing: Vec<String>,
    /// Record keys the schema does not declare
    pub orphans: Vec<String>,
}

impl KeyDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.orphans.is_empty()
    }
}

impl fmt::Display for KeyDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "missing [{}], orphan [{}]",
            self.missing.join(", "),
            self.orphans.join(", ")
        )
    }
}

/// Record migration error with context
#[derive(Debug, Clone)]
pub struct MigrateError {
    code: MigrateErrorCode,
    message: String,
    /// Indices of every offending record
    records: Vec<usize>,
    /// Key difference of the first offending record
    diff: Option<KeyDiff>,
}

impl MigrateError {
    /// One or more migrated records do not match the target schema.
    ///
    /// `mismatches` holds every offending record index with its key
    /// difference; the message describes the first.
    pub fn schema_mismatch(mismatches: Vec<(usize, KeyDiff)>) -> Self {
        let records: Vec<usize> = mismatches.iter().map(|(index, _)| *index).collect();
        let (first_index, first_diff) = mismatches
            .into_iter()
            .next()
            .unwrap_or_default();

        Self {
            code: MigrateErrorCode::RecordSchemaMismatch,
            message: format!(
                "{} record(s) do not match the migrated schema; first at index {}: {}",
                records.len(),
                first_index,
                first_diff
            ),
            records,
            diff: Some(first_diff),
        }
    }

    /// Key expected by a checked operation is absent.
    pub fn key_missing(key: impl Into<String>) -> Self {
        Self {
            code: MigrateErrorCode::RecordKeyMissing,
            message: format!("record has no key '{}'", key.into()),
            records: Vec::new(),
            diff: None,
        }
    }

    /// Key a checked operation would create already exists.
    pub fn key_exists(key: impl Into<String>) -> Self {
        Self {
            code: MigrateErrorCode::RecordKeyExists,
            message: format!("record already has key '{}'", key.into()),
            records: Vec::new(),
            diff: None,
        }
    }

    /// Attaches the record index this error occurred at.
    pub fn at_record(mut self, index: usize) -> Self {
        if self.records.is_empty() {
            self.message = format!("record {}: {}", index, self.message);
            self.records.push(index);
        }
        self
    }

    pub fn code(&self) -> MigrateErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Indices of the records this error concerns
    pub fn records(&self) -> &[usize] {
        &self.records
    }

    /// Key difference of the first offending record, for mismatches
    pub fn diff(&self) -> Option<&KeyDiff> {
        self.diff.as_ref()
    }
}

impl fmt::Display for MigrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REJECT] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for MigrateError {}

/// Result type for record operations
pub type MigrateResult<T> = Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_lists_all_indices() {
        let err = MigrateError::schema_mismatch(vec![
            (
                2,
                KeyDiff {
                    missing: vec!["Number".into()],
                    orphans: vec!["number".into()],
                },
            ),
            (7, KeyDiff::default()),
        ]);

        assert_eq!(err.code(), MigrateErrorCode::RecordSchemaMismatch);
        assert_eq!(err.records(), &[2, 7]);
        assert_eq!(err.diff().unwrap().missing, vec!["Number".to_string()]);

        let display = format!("{}", err);
        assert!(display.contains("AVROFIX_RECORD_SCHEMA_MISMATCH"));
        assert!(display.contains("index 2"));
        assert!(display.contains("orphan [number]"));
    }

    #[test]
    fn test_at_record_sets_index_once() {
        let err = MigrateError::key_missing("Name").at_record(4).at_record(9);
        assert_eq!(err.records(), &[4]);
        assert!(err.message().starts_with("record 4"));
    }
}
