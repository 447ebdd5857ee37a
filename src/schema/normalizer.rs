//! Schema normalizer
//!
//! Produces the corrected field list together with the name mapping that
//! the record migrator replays, so schema and records cannot diverge.
//!
//! The new field list is built in a single select-and-transform pass over
//! the original fields; the input schema is never mutated.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::errors::{SchemaError, SchemaResult};
use super::rules::NormalizationRules;
use super::types::RecordSchema;

/// The rule that produced a rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameRule {
    /// Reserved character substitution only
    ReservedChars,
    /// Exact-match rename (possibly after substitution)
    Exact,
}

impl RenameRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenameRule::ReservedChars => "reserved_chars",
            RenameRule::Exact => "exact",
        }
    }
}

impl fmt::Display for RenameRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happens to one original field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FieldAction {
    /// Name already canonical
    Keep,
    /// Field moves to a new name
    Rename { to: String, rule: RenameRule },
    /// Field is dropped
    Remove,
}

/// Mapping entry for one original field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    pub original: String,
    #[serde(flatten)]
    pub action: FieldAction,
}

impl FieldMapping {
    /// Final name, or `None` when the field is removed
    pub fn target(&self) -> Option<&str> {
        match &self.action {
            FieldAction::Keep => Some(&self.original),
            FieldAction::Rename { to, .. } => Some(to),
            FieldAction::Remove => None,
        }
    }
}

/// Ordered old-name to new-name table, one entry per original field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameMapping {
    entries: Vec<FieldMapping>,
}

impl NameMapping {
    pub fn entries(&self) -> &[FieldMapping] {
        &self.entries
    }

    /// Returns the action for an original field name
    pub fn action_of(&self, original: &str) -> Option<&FieldAction> {
        self.entries
            .iter()
            .find(|entry| entry.original == original)
            .map(|entry| &entry.action)
    }

    /// Final name of an original field; `None` if removed or unknown
    pub fn target_of(&self, original: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.original == original)
            .and_then(FieldMapping::target)
    }

    /// Original names of removed fields
    pub fn removed(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.action == FieldAction::Remove)
            .map(|entry| entry.original.as_str())
            .collect()
    }

    /// Rename pairs produced by one rule kind
    pub fn renames_by_rule(&self, rule: RenameRule) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|entry| match &entry.action {
                FieldAction::Rename { to, rule: r } if *r == rule => {
                    Some((entry.original.clone(), to.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Retained field names after migration, in schema order
    pub fn target_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(FieldMapping::target)
            .map(str::to_string)
            .collect()
    }

    /// Whether migration leaves every field as it was
    pub fn is_identity(&self) -> bool {
        self.entries.iter().all(|entry| entry.action == FieldAction::Keep)
    }
}

/// Normalized schema plus the mapping that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub schema: RecordSchema,
    pub mapping: NameMapping,
}

/// Applies [`NormalizationRules`] to record schemas.
#[derive(Debug, Clone)]
pub struct SchemaNormalizer {
    rules: NormalizationRules,
}

impl SchemaNormalizer {
    pub fn new(rules: NormalizationRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &NormalizationRules {
        &self.rules
    }

    /// Decides the fate of a single field name.
    pub fn map_name(&self, original: &str) -> FieldAction {
        let substituted = self.rules.substitute_reserved(original);
        let (target, rule) = match self.rules.exact_target(&substituted) {
            Some(exact) => (exact.to_string(), RenameRule::Exact),
            None => (substituted, RenameRule::ReservedChars),
        };

        if self.rules.is_removed(original, &target) {
            FieldAction::Remove
        } else if target == original {
            FieldAction::Keep
        } else {
            FieldAction::Rename { to: target, rule }
        }
    }

    /// Normalizes a schema.
    ///
    /// # Errors
    ///
    /// Returns `AVROFIX_SCHEMA_CONFLICT` if the input declares a name twice
    /// or two retained fields end up with the same final name.
    pub fn normalize(&self, schema: &RecordSchema) -> SchemaResult<Normalized> {
        schema.ensure_unique_names()?;

        let entries: Vec<FieldMapping> = schema
            .fields
            .iter()
            .map(|field| FieldMapping {
                original: field.name.clone(),
                action: self.map_name(&field.name),
            })
            .collect();

        let mut claimed: HashMap<&str, &str> = HashMap::with_capacity(entries.len());
        for entry in &entries {
            if let Some(target) = entry.target() {
                if let Some(first) = claimed.insert(target, &entry.original) {
                    return Err(SchemaError::conflict(target, first, &entry.original));
                }
            }
        }

        let fields = schema
            .fields
            .iter()
            .zip(&entries)
            .filter_map(|(field, entry)| match &entry.action {
                FieldAction::Keep => Some(field.clone()),
                FieldAction::Rename { to, .. } => Some(field.renamed(to)),
                FieldAction::Remove => None,
            })
            .collect();

        Ok(Normalized {
            schema: schema.with_fields(fields),
            mapping: NameMapping { entries },
        })
    }
}

impl Default for SchemaNormalizer {
    fn default() -> Self {
        Self::new(NormalizationRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::rules::ExactRename;
    use crate::schema::types::FieldDescriptor;
    use serde_json::json;

    fn schema_of(names: &[&str]) -> RecordSchema {
        RecordSchema::new(
            "Pokemon",
            names
                .iter()
                .map(|n| FieldDescriptor::with_type(*n, json!("string")))
                .collect(),
        )
    }

    #[test]
    fn test_full_field_list() {
        let schema = schema_of(&[
            "Type 1",
            "Type 2",
            "Sp.Atk",
            "Sp.Def",
            "number",
            "ingestion_date",
            "Name",
        ]);
        let normalized = SchemaNormalizer::default().normalize(&schema).unwrap();

        assert_eq!(
            normalized.schema.field_names(),
            vec!["Type_1", "Type_2", "Sp_Atk", "Sp_Def", "Number", "Name"]
        );
        assert_eq!(normalized.mapping.removed(), vec!["ingestion_date"]);
        assert_eq!(normalized.mapping.target_of("Sp.Atk"), Some("Sp_Atk"));
        assert_eq!(normalized.mapping.target_of("Name"), Some("Name"));
        assert_eq!(normalized.mapping.target_of("ingestion_date"), None);
        assert_eq!(
            normalized.mapping.target_names(),
            normalized.schema.field_names()
        );
    }

    #[test]
    fn test_exact_rename_only_on_exact_match() {
        let normalizer = SchemaNormalizer::default();
        assert_eq!(
            normalizer.map_name("number"),
            FieldAction::Rename {
                to: "Number".into(),
                rule: RenameRule::Exact
            }
        );
        assert_eq!(
            normalizer.map_name("Number Plate"),
            FieldAction::Rename {
                to: "Number_Plate".into(),
                rule: RenameRule::ReservedChars
            }
        );
        assert_eq!(normalizer.map_name("Number"), FieldAction::Keep);
    }

    #[test]
    fn test_substitution_runs_before_exact_match() {
        let rules = NormalizationRules {
            exact_renames: vec![ExactRename::new("sp_atk", "SpecialAttack")],
            ..NormalizationRules::default()
        };
        let normalizer = SchemaNormalizer::new(rules);
        assert_eq!(
            normalizer.map_name("sp.atk"),
            FieldAction::Rename {
                to: "SpecialAttack".into(),
                rule: RenameRule::Exact
            }
        );
    }

    #[test]
    fn test_removal_wins_over_rename() {
        let normalizer = SchemaNormalizer::default();
        assert_eq!(normalizer.map_name("ingestion date"), FieldAction::Remove);
        assert_eq!(normalizer.map_name("ingestion.date"), FieldAction::Remove);
    }

    #[test]
    fn test_conflict_between_two_renames() {
        let schema = schema_of(&["Foo Bar", "Foo.Bar"]);
        let err = SchemaNormalizer::default().normalize(&schema).unwrap_err();
        assert!(err.is_conflict());
        assert!(err.message().contains("Foo_Bar"));
    }

    #[test]
    fn test_conflict_with_unchanged_field() {
        let schema = schema_of(&["Foo_Bar", "Foo Bar"]);
        let err = SchemaNormalizer::default().normalize(&schema).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_removed_field_does_not_conflict() {
        // Both normalize to ingestion_date, but neither survives.
        let schema = schema_of(&["ingestion_date", "ingestion date", "Name"]);
        let normalized = SchemaNormalizer::default().normalize(&schema).unwrap();
        assert_eq!(normalized.schema.field_names(), vec!["Name"]);
        assert_eq!(normalized.mapping.removed().len(), 2);
    }

    #[test]
    fn test_input_schema_untouched() {
        let schema = schema_of(&["Type 1", "ingestion_date"]);
        let before = schema.clone();
        let _ = SchemaNormalizer::default().normalize(&schema).unwrap();
        assert_eq!(schema, before);
    }

    #[test]
    fn test_renames_grouped_by_rule() {
        let schema = schema_of(&["Type 1", "number", "Sp.Atk", "Name"]);
        let mapping = SchemaNormalizer::default().normalize(&schema).unwrap().mapping;

        assert_eq!(
            mapping.renames_by_rule(RenameRule::ReservedChars),
            vec![
                ("Type 1".to_string(), "Type_1".to_string()),
                ("Sp.Atk".to_string(), "Sp_Atk".to_string())
            ]
        );
        assert_eq!(
            mapping.renames_by_rule(RenameRule::Exact),
            vec![("number".to_string(), "Number".to_string())]
        );
        assert!(!mapping.is_identity());
    }

    #[test]
    fn test_already_normalized_schema_is_identity() {
        let schema = schema_of(&["Type_1", "Number", "Name"]);
        let normalized = SchemaNormalizer::default().normalize(&schema).unwrap();
        assert!(normalized.mapping.is_identity());
        assert_eq!(normalized.schema, schema);
    }

    #[test]
    fn test_type_spec_passes_through() {
        let schema = RecordSchema::new(
            "R",
            vec![FieldDescriptor::with_type("Sp.Atk", json!(["null", "long"]))],
        );
        let normalized = SchemaNormalizer::default().normalize(&schema).unwrap();
        assert_eq!(
            normalized.schema.field("Sp_Atk").unwrap().type_spec(),
            Some(&json!(["null", "long"]))
        );
    }
}
