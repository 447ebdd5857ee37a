//! Record migration subsystem for avrofix
//!
//! Applies the name mapping computed by the schema normalizer to every
//! record, plus value rewrite rules, and enforces that each migrated
//! record's key set equals the migrated schema's field names.

mod errors;
mod migrator;
mod record;
mod rewrite;

pub use errors::{KeyDiff, MigrateError, MigrateErrorCode, MigrateResult};
pub use migrator::{GroupOutcome, Migration, RecordMigrator, RenameGroup, SkippedRule};
pub use record::{value_to_json, Record};
pub use rewrite::{default_rewrites, ValueRewriteRule};
