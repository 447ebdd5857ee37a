//! Migration configuration
//!
//! Loaded from an optional JSON file. Every field has a default, and the
//! defaults reproduce the stock migration:
//!
//! - spaces and periods in field names become underscores
//! - `number` becomes `Number`
//! - `ingestion_date` is dropped
//! - `Name` values are cut to start at `Mega`
//! - outputs are written next to inputs with `new` appended

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{PipelineError, PipelineResult};
use crate::migrate::{default_rewrites, ValueRewriteRule};
use crate::schema::NormalizationRules;

/// What the run does after a file fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Report the failure and move on to the next file
    #[default]
    Continue,
    /// Stop the run at the first failure
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Field naming rules
    #[serde(default)]
    pub rules: NormalizationRules,

    /// Value rewrites, applied after renaming
    #[serde(default = "default_rewrites")]
    pub value_rewrites: Vec<ValueRewriteRule>,

    /// Appended to the input file name to form the output path
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Extension of input files when scanning a directory
    #[serde(default = "default_input_extension")]
    pub input_extension: String,

    /// Migrated records included in each file report
    #[serde(default = "default_preview_records")]
    pub preview_records: usize,

    #[serde(default)]
    pub on_error: ErrorPolicy,
}

fn default_output_suffix() -> String {
    "new".to_string()
}
fn default_input_extension() -> String {
    "avro".to_string()
}
fn default_preview_records() -> usize {
    5
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            rules: NormalizationRules::default(),
            value_rewrites: default_rewrites(),
            output_suffix: default_output_suffix(),
            input_extension: default_input_extension(),
            preview_records: default_preview_records(),
            on_error: ErrorPolicy::default(),
        }
    }
}

impl MigrationConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate configuration JSON
    pub fn from_json_str(content: &str) -> PipelineResult<Self> {
        let config: MigrationConfig = serde_json::from_str(content)
            .map_err(|e| PipelineError::config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if self.output_suffix.is_empty() {
            return Err(PipelineError::config(
                "output_suffix must not be empty; outputs would overwrite inputs",
            ));
        }
        if self.output_suffix.contains('/') || self.output_suffix.contains('\\') {
            return Err(PipelineError::config(format!(
                "output_suffix '{}' must not contain path separators",
                self.output_suffix
            )));
        }
        if self.input_extension.is_empty() {
            return Err(PipelineError::config("input_extension must not be empty"));
        }

        self.rules.validate().map_err(PipelineError::config)?;

        for rule in &self.value_rewrites {
            rule.validate().map_err(PipelineError::config)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = MigrationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.output_suffix, "new");
        assert_eq!(config.preview_records, 5);
        assert_eq!(config.on_error, ErrorPolicy::Continue);
    }

    #[test]
    fn test_overrides() {
        let config = MigrationConfig::from_json_str(
            r#"{
                "rules": {"removed_fields": ["loaded_at"], "exact_renames": []},
                "value_rewrites": [],
                "output_suffix": ".fixed",
                "on_error": "abort"
            }"#,
        )
        .unwrap();

        assert_eq!(config.rules.removed_fields, vec!["loaded_at".to_string()]);
        assert!(config.rules.exact_renames.is_empty());
        assert_eq!(config.rules.reserved_chars, vec![' ', '.']);
        assert!(config.value_rewrites.is_empty());
        assert_eq!(config.output_suffix, ".fixed");
        assert_eq!(config.on_error, ErrorPolicy::Abort);
    }

    #[test]
    fn test_empty_suffix_rejected() {
        let err = MigrationConfig::from_json_str(r#"{"output_suffix": ""}"#).unwrap_err();
        assert!(err.to_string().contains("output_suffix"));
    }

    #[test]
    fn test_separator_in_suffix_rejected() {
        assert!(MigrationConfig::from_json_str(r#"{"output_suffix": "/x"}"#).is_err());
    }

    #[test]
    fn test_bad_rules_rejected() {
        let err = MigrationConfig::from_json_str(r#"{"rules": {"replacement": "."}}"#).unwrap_err();
        assert!(err.to_string().contains("reserved"));

        let err = MigrationConfig::from_json_str(
            r#"{"value_rewrites": [{"kind": "marker_prefix", "field": "Name", "marker": ""}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty marker"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(MigrationConfig::from_json_str(r#"{"on_error": "retry"}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("avrofix.json");
        fs::write(&path, r#"{"preview_records": 2}"#).unwrap();

        let config = MigrationConfig::load(&path).unwrap();
        assert_eq!(config.preview_records, 2);

        let missing = MigrationConfig::load(&tmp.path().join("absent.json")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read config"));
    }
}
