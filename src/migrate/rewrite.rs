//! Value rewrite rules
//!
//! A rewrite is guarded by a predicate on the current value and never
//! touches the key set, so it cannot break schema/record consistency.

use apache_avro::types::Value;
use serde::{Deserialize, Serialize};

use super::record::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueRewriteRule {
    /// Drop everything before the first occurrence of `marker` in a string
    /// field, when the marker occurs past the start of the value.
    MarkerPrefix {
        /// Field name after migration
        field: String,
        marker: String,
    },
}

impl ValueRewriteRule {
    pub fn marker_prefix(field: impl Into<String>, marker: impl Into<String>) -> Self {
        ValueRewriteRule::MarkerPrefix {
            field: field.into(),
            marker: marker.into(),
        }
    }

    /// The field this rule reads and writes
    pub fn field(&self) -> &str {
        match self {
            ValueRewriteRule::MarkerPrefix { field, .. } => field,
        }
    }

    /// Rewritten value, or `None` when the guard does not hold.
    pub fn rewrite(&self, value: &str) -> Option<String> {
        match self {
            ValueRewriteRule::MarkerPrefix { marker, .. } => match value.find(marker.as_str()) {
                Some(position) if position > 0 => Some(value[position..].to_string()),
                _ => None,
            },
        }
    }

    /// Applies the rule to a record. Returns whether the record changed.
    ///
    /// Absent fields and non-string values are left alone.
    pub fn apply(&self, record: &mut Record) -> bool {
        let Some(text) = record.get_mut(self.field()).and_then(string_mut) else {
            return false;
        };
        match self.rewrite(text) {
            Some(rewritten) => {
                *text = rewritten;
                true
            }
            None => false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            ValueRewriteRule::MarkerPrefix { field, marker } => {
                if field.is_empty() {
                    return Err("marker_prefix rule with an empty field name".to_string());
                }
                if marker.is_empty() {
                    return Err(format!("marker_prefix rule on '{}' has an empty marker", field));
                }
                Ok(())
            }
        }
    }
}

/// Default rewrites: repair `Name` values stored with junk before `Mega`.
pub fn default_rewrites() -> Vec<ValueRewriteRule> {
    vec![ValueRewriteRule::marker_prefix("Name", "Mega")]
}

/// Mutable string inside a value, looking through a union branch.
fn string_mut(value: &mut Value) -> Option<&mut String> {
    match value {
        Value::String(text) => Some(text),
        Value::Union(_, inner) => string_mut(inner),
        _ => None,
    }
}
