//! Read-only verifier
//!
//! Reuses the container reader to print a file's schema field list and its
//! leading records. Never opens anything for writing.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::container::{checksum_file, format_checksum, read_container, ContainerResult};
use crate::observability::Logger;

/// Records shown per file unless configured otherwise
pub const DEFAULT_VERIFY_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectedField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_spec: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub path: PathBuf,
    pub fields: Vec<InspectedField>,
    pub records: usize,
    pub checksum: String,
    pub preview: Vec<JsonValue>,
}

impl Inspection {
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct Verifier {
    limit: usize,
}

impl Verifier {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn inspect(&self, path: &Path) -> ContainerResult<Inspection> {
        let (schema, records) = read_container(path)?;
        let checksum = format_checksum(checksum_file(path)?);

        let fields = schema
            .fields
            .iter()
            .map(|field| InspectedField {
                name: field.name.clone(),
                type_spec: field.type_spec().cloned().unwrap_or(JsonValue::Null),
            })
            .collect();

        let preview = records
            .iter()
            .take(self.limit)
            .map(|record| record.to_json())
            .collect();

        let path_str = path.display().to_string();
        let count = records.len().to_string();
        Logger::info(
            "VERIFY_FILE",
            &[
                ("path", path_str.as_str()),
                ("records", count.as_str()),
                ("checksum", checksum.as_str()),
            ],
        );

        Ok(Inspection {
            path: path.to_path_buf(),
            fields,
            records: records.len(),
            checksum,
            preview,
        })
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new(DEFAULT_VERIFY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerWriter;
    use crate::migrate::Record;
    use crate::schema::{FieldDescriptor, RecordSchema};
    use apache_avro::types::Value;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_sample(path: &Path, count: i64) {
        let schema = RecordSchema::new(
            "Pokemon",
            vec![
                FieldDescriptor::with_type("Name", json!("string")),
                FieldDescriptor::with_type("Number", json!("long")),
            ],
        );
        let records: Vec<Record> = (1..=count)
            .map(|n| {
                Record::from_pairs(vec![
                    ("Name", Value::String(format!("mon{}", n))),
                    ("Number", Value::Long(n)),
                ])
                .unwrap()
            })
            .collect();
        ContainerWriter::new(path).write(&schema, &records).unwrap();
    }

    #[test]
    fn test_inspect_limits_preview() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dex.avronew");
        write_sample(&path, 10);

        let inspection = Verifier::default().inspect(&path).unwrap();
        assert_eq!(inspection.field_names(), vec!["Name", "Number"]);
        assert_eq!(inspection.fields[1].type_spec, json!("long"));
        assert_eq!(inspection.records, 10);
        assert_eq!(inspection.preview.len(), DEFAULT_VERIFY_LIMIT);
        assert_eq!(inspection.preview[0], json!({"Name": "mon1", "Number": 1}));
    }

    #[test]
    fn test_inspect_does_not_modify_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dex.avronew");
        write_sample(&path, 3);
        let before = fs::read(&path).unwrap();

        let inspection = Verifier::new(100).inspect(&path).unwrap();
        assert_eq!(inspection.preview.len(), 3);
        assert_eq!(fs::read(&path).unwrap(), before);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_inspect_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = Verifier::default().inspect(&tmp.path().join("gone.avro")).unwrap_err();
        assert!(err.is_read());
    }
}
