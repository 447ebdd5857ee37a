//! avrofix - field-name normalization for Avro object container files
//!
//! Reads each container, rewrites its schema field names so they satisfy
//! Avro naming rules, migrates every record to match, and writes a new
//! container next to the input. Inputs are never modified.

pub mod cli;
pub mod container;
pub mod migrate;
pub mod observability;
pub mod pipeline;
pub mod schema;
