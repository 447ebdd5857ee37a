//! Container reader
//!
//! Opens an Avro object container file and yields its writer schema and
//! the fully materialized record sequence.
//!
//! - Missing or unreadable file → AVROFIX_READ_ERROR
//! - Bad magic, bad header, non-record writer schema → AVROFIX_READ_ERROR
//! - Corrupt data block → AVROFIX_READ_ERROR with the record index reached
//!
//! The file handle is owned by the reader and released when it is dropped,
//! on success and on every error path alike.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use apache_avro::Reader;

use super::errors::{ContainerError, ContainerResult};
use crate::migrate::Record;
use crate::schema::{allow_legacy_field_names, RecordSchema};

pub struct ContainerReader {
    path: PathBuf,
    schema: RecordSchema,
    reader: Reader<'static, BufReader<File>>,
}

impl fmt::Debug for ContainerReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerReader")
            .field("path", &self.path)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ContainerReader {
    /// Opens a container file and parses its header.
    pub fn open(path: &Path) -> ContainerResult<Self> {
        allow_legacy_field_names();

        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ContainerError::read_io(path, "Container file not found", e)
            } else {
                ContainerError::read_io(path, "Failed to open container file", e)
            }
        })?;

        let reader = Reader::new(BufReader::new(file)).map_err(|e| {
            ContainerError::invalid(path, format!("Not a valid Avro container: {}", e))
        })?;

        let schema = RecordSchema::from_avro(reader.writer_schema())
            .map_err(|e| ContainerError::invalid(path, format!("Unsupported writer schema: {}", e)))?;

        Ok(Self {
            path: path.to_path_buf(),
            schema,
            reader,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the writer schema
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Decodes every remaining record.
    ///
    /// Consumes the reader, closing the file whether or not decoding succeeds.
    pub fn read_all(self) -> ContainerResult<Vec<Record>> {
        let Self { path, reader, .. } = self;
        let mut records = Vec::new();

        for (index, item) in reader.enumerate() {
            let value = item.map_err(|e| ContainerError::corrupt_block(&path, index, e.to_string()))?;
            let record = Record::from_avro(value).ok_or_else(|| {
                ContainerError::corrupt_block(&path, index, "Decoded datum is not a record")
            })?;
            records.push(record);
        }

        Ok(records)
    }

    /// Splits into schema and records.
    pub fn into_parts(self) -> ContainerResult<(RecordSchema, Vec<Record>)> {
        let schema = self.schema.clone();
        let records = self.read_all()?;
        Ok((schema, records))
    }
}

/// Reads a whole container file: writer schema plus records.
pub fn read_container(path: &Path) -> ContainerResult<(RecordSchema, Vec<Record>)> {
    ContainerReader::open(path)?.into_parts()
}
