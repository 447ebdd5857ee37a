//! Field naming rules
//!
//! Applied per field in a fixed order: reserved character substitution,
//! then exact-match renames, then removal. Removal wins over any rename.

use serde::{Deserialize, Serialize};

/// Exact-match rename of one field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactRename {
    /// Name after reserved character substitution
    pub from: String,
    /// Canonical name
    pub to: String,
}

impl ExactRename {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// The rule table driving schema normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationRules {
    /// Characters that may not appear in a field name
    #[serde(default = "default_reserved_chars")]
    pub reserved_chars: Vec<char>,

    /// Substitute for every reserved character
    #[serde(default = "default_replacement")]
    pub replacement: char,

    /// Exact-match renames, checked after substitution
    #[serde(default = "default_exact_renames")]
    pub exact_renames: Vec<ExactRename>,

    /// Fields dropped from the schema and every record
    #[serde(default = "default_removed_fields")]
    pub removed_fields: Vec<String>,
}

fn default_reserved_chars() -> Vec<char> {
    vec![' ', '.']
}
fn default_replacement() -> char {
    '_'
}
fn default_exact_renames() -> Vec<ExactRename> {
    vec![ExactRename::new("number", "Number")]
}
fn default_removed_fields() -> Vec<String> {
    vec!["ingestion_date".to_string()]
}

impl Default for NormalizationRules {
    fn default() -> Self {
        Self {
            reserved_chars: default_reserved_chars(),
            replacement: default_replacement(),
            exact_renames: default_exact_renames(),
            removed_fields: default_removed_fields(),
        }
    }
}

impl NormalizationRules {
    /// Rules that change nothing.
    pub fn empty() -> Self {
        Self {
            reserved_chars: Vec::new(),
            replacement: default_replacement(),
            exact_renames: Vec::new(),
            removed_fields: Vec::new(),
        }
    }

    /// Whether the name contains any reserved character
    pub fn has_reserved(&self, name: &str) -> bool {
        name.chars().any(|c| self.reserved_chars.contains(&c))
    }

    /// Replaces every reserved character with the replacement character.
    ///
    /// Idempotent as long as the replacement is not itself reserved.
    pub fn substitute_reserved(&self, name: &str) -> String {
        name.chars()
            .map(|c| {
                if self.reserved_chars.contains(&c) {
                    self.replacement
                } else {
                    c
                }
            })
            .collect()
    }

    /// Canonical name for an exact match, if any.
    pub fn exact_target(&self, name: &str) -> Option<&str> {
        self.exact_renames
            .iter()
            .find(|rule| rule.from == name)
            .map(|rule| rule.to.as_str())
    }

    /// Whether a field with this name is to be dropped.
    ///
    /// Matches the original name or the name after renaming, so a field
    /// cannot escape removal by being renamed in the same pass.
    pub fn is_removed(&self, original: &str, renamed: &str) -> bool {
        self.removed_fields
            .iter()
            .any(|removed| removed == original || removed == renamed)
    }

    /// Checks the rule table for contradictions.
    pub fn validate(&self) -> Result<(), String> {
        if self.reserved_chars.contains(&self.replacement) {
            return Err(format!(
                "replacement character '{}' is itself reserved",
                self.replacement
            ));
        }

        for rule in &self.exact_renames {
            if rule.from.is_empty() || rule.to.is_empty() {
                return Err("exact rename with an empty name".to_string());
            }
            if self.has_reserved(&rule.from) {
                return Err(format!(
                    "exact rename source '{}' contains a reserved character; exact renames match names after substitution",
                    rule.from
                ));
            }
            if self.has_reserved(&rule.to) {
                return Err(format!(
                    "exact rename target '{}' contains a reserved character",
                    rule.to
                ));
            }
            if self.removed_fields.contains(&rule.to) {
                return Err(format!(
                    "exact rename target '{}' is also marked for removal",
                    rule.to
                ));
            }
        }

        for (i, rule) in self.exact_renames.iter().enumerate() {
            if self.exact_renames[..i].iter().any(|earlier| earlier.from == rule.from) {
                return Err(format!("field '{}' has more than one exact rename", rule.from));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution_replaces_every_occurrence() {
        let rules = NormalizationRules::default();
        assert_eq!(rules.substitute_reserved("Type 1"), "Type_1");
        assert_eq!(rules.substitute_reserved("Sp.Atk"), "Sp_Atk");
        assert_eq!(rules.substitute_reserved("a b.c d"), "a_b_c_d");
        assert_eq!(rules.substitute_reserved("plain"), "plain");
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let rules = NormalizationRules::default();
        for name in ["Type 1", "Sp.Def", "x. .y", "Number Plate", "clean_name"] {
            let once = rules.substitute_reserved(name);
            let twice = rules.substitute_reserved(&once);
            assert_eq!(once, twice);
            assert!(!rules.has_reserved(&once));
        }
    }

    #[test]
    fn test_exact_target_is_exact() {
        let rules = NormalizationRules::default();
        assert_eq!(rules.exact_target("number"), Some("Number"));
        assert_eq!(rules.exact_target("Number Plate"), None);
        assert_eq!(rules.exact_target("numbers"), None);
        assert_eq!(rules.exact_target("Number"), None);
    }

    #[test]
    fn test_removal_matches_either_name() {
        let rules = NormalizationRules::default();
        assert!(rules.is_removed("ingestion_date", "ingestion_date"));
        assert!(rules.is_removed("ingestion date", "ingestion_date"));
        assert!(!rules.is_removed("Name", "Name"));
    }

    #[test]
    fn test_default_rules_validate() {
        assert!(NormalizationRules::default().validate().is_ok());
        assert!(NormalizationRules::empty().validate().is_ok());
    }

    #[test]
    fn test_reserved_replacement_rejected() {
        let rules = NormalizationRules {
            replacement: ' ',
            ..NormalizationRules::default()
        };
        assert!(rules.validate().unwrap_err().contains("reserved"));
    }

    #[test]
    fn test_rename_into_removed_rejected() {
        let rules = NormalizationRules {
            exact_renames: vec![ExactRename::new("ts", "ingestion_date")],
            ..NormalizationRules::default()
        };
        assert!(rules.validate().unwrap_err().contains("removal"));
    }

    #[test]
    fn test_reserved_rename_source_rejected() {
        let rules = NormalizationRules {
            exact_renames: vec![ExactRename::new("Sp.Atk", "SpecialAttack")],
            ..NormalizationRules::default()
        };
        let err = rules.validate().unwrap_err();
        assert!(err.contains("Sp.Atk"));

        let substituted = NormalizationRules {
            exact_renames: vec![ExactRename::new("Sp_Atk", "SpecialAttack")],
            ..NormalizationRules::default()
        };
        assert!(substituted.validate().is_ok());
    }

    #[test]
    fn test_deserialize_uses_defaults() {
        let rules: NormalizationRules = serde_json::from_str(r#"{"removed_fields": []}"#).unwrap();
        assert!(rules.removed_fields.is_empty());
        assert_eq!(rules.reserved_chars, vec![' ', '.']);
        assert_eq!(rules.exact_target("number"), Some("Number"));
    }
}
