//! Schema subsystem for avrofix
//!
//! Interprets Avro writer schemas as ordered field lists and normalizes
//! field names.
//!
//! # Design Principles
//!
//! - Field type specifications are opaque and never rewritten
//! - Field order is preserved, minus removed fields
//! - Name collisions are rejected, never resolved by dropping data
//! - Deterministic normalization

mod errors;
mod normalizer;
mod rules;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use normalizer::{
    FieldAction, FieldMapping, NameMapping, Normalized, RenameRule, SchemaNormalizer,
};
pub use rules::{ExactRename, NormalizationRules};
pub use types::{allow_legacy_field_names, FieldDescriptor, RecordSchema};
