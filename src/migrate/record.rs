//! Ordered record representation
//!
//! A record is an ordered list of (field name, value) pairs with unique
//! names. Renames and inserts are checked: they never overwrite an
//! existing key and never invent a missing one.

use std::collections::HashSet;

use apache_avro::types::Value;
use serde_json::Value as JsonValue;

use super::errors::{KeyDiff, MigrateError, MigrateResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from pairs, rejecting duplicate names.
    pub fn from_pairs<K: Into<String>>(
        pairs: impl IntoIterator<Item = (K, Value)>,
    ) -> MigrateResult<Self> {
        let mut record = Self::new();
        for (key, value) in pairs {
            record.insert(key, value)?;
        }
        Ok(record)
    }

    /// Wraps a decoded Avro record. Returns `None` for any other datum.
    pub fn from_avro(value: Value) -> Option<Self> {
        match value {
            Value::Record(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Converts back into an Avro record datum.
    pub fn into_avro(self) -> Value {
        Value::Record(self.fields)
    }

    /// Appends a new key.
    ///
    /// # Errors
    ///
    /// Returns `AVROFIX_RECORD_KEY_EXISTS` if the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> MigrateResult<()> {
        let key = key.into();
        if self.contains(&key) {
            return Err(MigrateError::key_exists(key));
        }
        self.fields.push((key, value));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.fields.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Keys in record order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Re-keys several fields at once, each value keeping its position.
    ///
    /// All renames take effect together, so chains (`a→b`, `b→c`) and
    /// swaps (`a→b`, `b→a`) succeed. On error the record is untouched.
    ///
    /// # Errors
    ///
    /// - `AVROFIX_RECORD_KEY_MISSING` if a source key is absent
    /// - `AVROFIX_RECORD_KEY_EXISTS` if a target is held by a key that is
    ///   not itself renamed away, or two renames share a target
    pub fn rename_all(&mut self, pairs: &[(String, String)]) -> MigrateResult<()> {
        let sources: HashSet<&str> = pairs.iter().map(|(from, _)| from.as_str()).collect();
        let mut targets: HashSet<&str> = HashSet::with_capacity(pairs.len());

        for (from, to) in pairs {
            if !self.contains(from) {
                return Err(MigrateError::key_missing(from.as_str()));
            }
            if !targets.insert(to.as_str()) {
                return Err(MigrateError::key_exists(to.as_str()));
            }
            if self.contains(to) && !sources.contains(to.as_str()) {
                return Err(MigrateError::key_exists(to.as_str()));
            }
        }

        for (key, _) in &mut self.fields {
            if let Some((_, to)) = pairs.iter().find(|(from, _)| from == key) {
                *key = to.clone();
            }
        }
        Ok(())
    }

    /// Removes a key, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(position).1)
    }

    /// Compares the key set against the expected field names.
    pub fn key_diff(&self, expected: &[String]) -> KeyDiff {
        let present: HashSet<&str> = self.keys().collect();
        let wanted: HashSet<&str> = expected.iter().map(String::as_str).collect();

        KeyDiff {
            missing: expected
                .iter()
                .filter(|name| !present.contains(name.as_str()))
                .cloned()
                .collect(),
            orphans: self
                .keys()
                .filter(|key| !wanted.contains(key))
                .map(str::to_string)
                .collect(),
        }
    }

    /// Whether the key set equals the expected names exactly
    pub fn key_set_matches(&self, expected: &[String]) -> bool {
        self.len() == expected.len() && self.key_diff(expected).is_empty()
    }

    /// Rebuilds the field order to follow `order`.
    ///
    /// Keys not named in `order` keep their relative order at the end.
    pub fn reorder(&mut self, order: &[String]) {
        let mut remaining = std::mem::take(&mut self.fields);
        let mut ordered = Vec::with_capacity(remaining.len());
        for name in order {
            if let Some(position) = remaining.iter().position(|(k, _)| k == name) {
                ordered.push(remaining.remove(position));
            }
        }
        ordered.append(&mut remaining);
        self.fields = ordered;
    }

    /// Renders the record as a JSON object in field order.
    pub fn to_json(&self) -> JsonValue {
        let object = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value_to_json(value)))
            .collect();
        JsonValue::Object(object)
    }
}

/// Renders an Avro value for display, falling back to its debug form.
pub fn value_to_json(value: &Value) -> JsonValue {
    match JsonValue::try_from(value.clone()) {
        Ok(json) => json,
        Err(_) => JsonValue::String(format!("{:?}", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        Record::from_pairs(vec![
            ("Type 1", Value::String("Fire".into())),
            ("number", Value::Long(6)),
            ("Name", Value::String("Charizard".into())),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = Record::from_pairs(vec![("a", Value::Null), ("a", Value::Int(1))]).unwrap_err();
        assert_eq!(err.code().code(), "AVROFIX_RECORD_KEY_EXISTS");
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut record = sample();
        record.rename_all(&[("number".into(), "Number".into())]).unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Type 1", "Number", "Name"]);
        assert_eq!(record.get("Number"), Some(&Value::Long(6)));
        assert!(!record.contains("number"));
    }

    #[test]
    fn test_rename_all_chain_and_swap() {
        let mut chain = Record::from_pairs(vec![("foo", Value::Int(1)), ("bar", Value::Int(2))]).unwrap();
        chain
            .rename_all(&[("foo".into(), "bar".into()), ("bar".into(), "baz".into())])
            .unwrap();
        assert_eq!(chain.keys().collect::<Vec<_>>(), vec!["bar", "baz"]);
        assert_eq!(chain.get("bar"), Some(&Value::Int(1)));
        assert_eq!(chain.get("baz"), Some(&Value::Int(2)));

        let mut swap = Record::from_pairs(vec![("a", Value::Int(1)), ("b", Value::Int(2))]).unwrap();
        swap.rename_all(&[("a".into(), "b".into()), ("b".into(), "a".into())])
            .unwrap();
        assert_eq!(swap.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(swap.get("a"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_rename_all_is_checked() {
        let mut record = sample();
        let err = record
            .rename_all(&[("number".into(), "Number".into()), ("Type 1".into(), "Name".into())])
            .unwrap_err();
        assert_eq!(err.code().code(), "AVROFIX_RECORD_KEY_EXISTS");

        let err = record
            .rename_all(&[("number".into(), "X".into()), ("Name".into(), "X".into())])
            .unwrap_err();
        assert_eq!(err.code().code(), "AVROFIX_RECORD_KEY_EXISTS");

        let err = record.rename_all(&[("gone".into(), "x".into())]).unwrap_err();
        assert_eq!(err.code().code(), "AVROFIX_RECORD_KEY_MISSING");
        assert_eq!(record, sample());
    }

    #[test]
    fn test_remove() {
        let mut record = sample();
        assert_eq!(record.remove("number"), Some(Value::Long(6)));
        assert_eq!(record.remove("number"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_key_diff() {
        let record = sample();
        let expected = vec!["Type_1".to_string(), "number".to_string(), "Name".to_string()];
        let diff = record.key_diff(&expected);
        assert_eq!(diff.missing, vec!["Type_1".to_string()]);
        assert_eq!(diff.orphans, vec!["Type 1".to_string()]);
        assert!(!record.key_set_matches(&expected));

        let exact = vec!["Name".to_string(), "Type 1".to_string(), "number".to_string()];
        assert!(record.key_set_matches(&exact));
    }

    #[test]
    fn test_reorder() {
        let mut record = sample();
        record.reorder(&["Name".to_string(), "Type 1".to_string()]);
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["Name", "Type 1", "number"]);
    }

    #[test]
    fn test_avro_round_trip() {
        let record = sample();
        let back = Record::from_avro(record.clone().into_avro()).unwrap();
        assert_eq!(back, record);
        assert!(Record::from_avro(Value::Int(3)).is_none());
    }

    #[test]
    fn test_to_json_keeps_order() {
        let json = sample().to_json();
        assert_eq!(json, json!({"Type 1": "Fire", "number": 6, "Name": "Charizard"}));
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Type 1", "number", "Name"]);
    }
}
