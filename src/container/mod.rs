//! Container subsystem for avrofix
//!
//! Reads and writes Avro object container files: a header carrying the
//! writer schema followed by blocks of encoded records.
//!
//! # Design Principles
//!
//! - Inputs are only ever opened for reading
//! - Outputs go to a derived path, never the input path
//! - Outputs appear atomically or not at all
//! - Every finalized output is checksummed

mod checksum;
mod errors;
mod reader;
mod writer;

pub use checksum::{checksum_file, compute_checksum, format_checksum};
pub use errors::{ContainerError, ContainerErrorCode, ContainerResult};
pub use reader::{read_container, ContainerReader};
pub use writer::{derive_output_path, ContainerWriter, WriteReceipt};
