//! Container writer with atomic finalize
//!
//! The output file is never visible in a partial state:
//! 1. Encode the container into memory
//! 2. Write it to a temporary sibling file and fsync
//! 3. Rename the temporary file onto the final path (atomic on POSIX)
//! 4. fsync the parent directory
//!
//! On any failure the temporary file is removed and the final path is
//! left exactly as it was.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use apache_avro::Writer;
use serde::Serialize;
use uuid::Uuid;

use super::checksum::compute_checksum;
use super::errors::{ContainerError, ContainerResult};
use crate::migrate::Record;
use crate::schema::RecordSchema;

/// Appends `suffix` to the file name of `input`.
///
/// `db/pokemon.avro` with suffix `new` becomes `db/pokemon.avronew`.
pub fn derive_output_path(input: &Path, suffix: &str) -> ContainerResult<PathBuf> {
    if suffix.is_empty() {
        return Err(ContainerError::write_failed(
            input,
            "Output suffix is empty; output would overwrite the input",
        ));
    }

    let file_name = input.file_name().ok_or_else(|| {
        ContainerError::write_failed(input, "Input path has no file name")
    })?;

    let mut output_name = OsString::from(file_name);
    output_name.push(suffix);
    Ok(input.with_file_name(output_name))
}

/// Temporary sibling path used while an output is being written.
fn temp_path_for(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(format!(".{}.tmp", Uuid::new_v4()));
    output.with_file_name(name)
}

/// Facts about a finalized output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReceipt {
    pub path: PathBuf,
    pub records: usize,
    pub bytes: u64,
    /// CRC32 of the finalized file
    pub checksum: u32,
}

pub struct ContainerWriter {
    output_path: PathBuf,
}

impl ContainerWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    /// Serializes the schema and records into the output path.
    ///
    /// # Errors
    ///
    /// Returns `AVROFIX_WRITE_ERROR` if the schema or a record cannot be
    /// encoded, or on any I/O failure. The final path is untouched then.
    pub fn write(&self, schema: &RecordSchema, records: &[Record]) -> ContainerResult<WriteReceipt> {
        let bytes = self.encode(schema, records)?;
        let checksum = compute_checksum(&bytes);

        let temp_path = temp_path_for(&self.output_path);
        if let Err(e) = self.commit(&temp_path, &bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        Ok(WriteReceipt {
            path: self.output_path.clone(),
            records: records.len(),
            bytes: bytes.len() as u64,
            checksum,
        })
    }

    fn encode(&self, schema: &RecordSchema, records: &[Record]) -> ContainerResult<Vec<u8>> {
        let avro_schema = schema.to_avro().map_err(|e| {
            ContainerError::write_failed(&self.output_path, format!("Cannot encode schema: {}", e))
        })?;

        let mut writer = Writer::new(&avro_schema, Vec::new());
        for (index, record) in records.iter().enumerate() {
            writer.append(record.clone().into_avro()).map_err(|e| {
                ContainerError::write_failed(
                    &self.output_path,
                    format!("Failed to encode record {}: {}", index, e),
                )
            })?;
        }

        writer.into_inner().map_err(|e| {
            ContainerError::write_failed(
                &self.output_path,
                format!("Failed to finish container: {}", e),
            )
        })
    }

    fn commit(&self, temp_path: &Path, bytes: &[u8]) -> ContainerResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)
            .map_err(|e| {
                ContainerError::write_io(
                    &self.output_path,
                    format!("Failed to create temp file: {}", temp_path.display()),
                    e,
                )
            })?;

        file.write_all(bytes).map_err(|e| {
            ContainerError::write_io(&self.output_path, "Failed to write temp file", e)
        })?;

        file.sync_all().map_err(|e| {
            ContainerError::write_io(&self.output_path, "fsync failed on temp file", e)
        })?;
        drop(file);

        fs::rename(temp_path, &self.output_path).map_err(|e| {
            ContainerError::write_io(&self.output_path, "Failed to move temp file into place", e)
        })?;

        // Make the rename durable
        if let Some(parent) = self.output_path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;
    use apache_avro::types::Value;
    use serde_json::json;
    use tempfile::TempDir;

    fn schema() -> RecordSchema {
        RecordSchema::new(
            "Pokemon",
            vec![
                FieldDescriptor::with_type("Name", json!("string")),
                FieldDescriptor::with_type("Number", json!("long")),
            ],
        )
    }

    fn record(name: &str, number: i64) -> Record {
        Record::from_pairs(vec![
            ("Name", Value::String(name.into())),
            ("Number", Value::Long(number)),
        ])
        .unwrap()
    }

    #[test]
    fn test_derive_output_path_appends_suffix() {
        let out = derive_output_path(Path::new("database/pokemon.avro"), "new").unwrap();
        assert_eq!(out, PathBuf::from("database/pokemon.avronew"));
        assert_ne!(out, PathBuf::from("database/pokemon.avro"));
    }

    #[test]
    fn test_derive_output_path_rejects_empty_suffix() {
        let err = derive_output_path(Path::new("a.avro"), "").unwrap_err();
        assert!(err.is_write());
    }

    #[test]
    fn test_write_receipt_matches_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.avronew");
        let receipt = ContainerWriter::new(&path)
            .write(&schema(), &[record("Bulbasaur", 1), record("Ivysaur", 2)])
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(receipt.records, 2);
        assert_eq!(receipt.bytes, bytes.len() as u64);
        assert_eq!(receipt.checksum, compute_checksum(&bytes));
        assert_eq!(&bytes[..4], b"Obj\x01");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.avronew");
        ContainerWriter::new(&path)
            .write(&schema(), &[record("Bulbasaur", 1)])
            .unwrap();

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["out.avronew".to_string()]);
    }

    #[test]
    fn test_bad_record_leaves_no_output() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.avronew");

        // Number declared long, given a string
        let bad = Record::from_pairs(vec![
            ("Name", Value::String("Missingno".into())),
            ("Number", Value::String("??".into())),
        ])
        .unwrap();

        let err = ContainerWriter::new(&path).write(&schema(), &[bad]).unwrap_err();
        assert!(err.is_write());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_write_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("no_such_dir").join("out.avronew");
        let err = ContainerWriter::new(&path)
            .write(&schema(), &[record("Bulbasaur", 1)])
            .unwrap_err();
        assert!(err.is_write());
        assert!(!path.exists());
    }

    #[test]
    fn test_overwrites_previous_output_atomically() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.avronew");
        fs::write(&path, b"stale").unwrap();

        ContainerWriter::new(&path)
            .write(&schema(), &[record("Bulbasaur", 1)])
            .unwrap();
        assert_eq!(&fs::read(&path).unwrap()[..4], b"Obj\x01");
    }
}
