//! Migration pipeline for avrofix
//!
//! Drives read → normalize → migrate → write over a list of input files,
//! one file at a time, and provides the read-only verifier.
//!
//! # Error policy
//!
//! Errors are per file. A failing file never gets an output and is always
//! reported with its path and error kind. The run then continues with the
//! next file (`continue`, the default) or stops (`abort`).

mod config;
mod discovery;
mod driver;
mod errors;
mod report;
mod verifier;

pub use config::{ErrorPolicy, MigrationConfig};
pub use discovery::discover_inputs;
pub use driver::MigrationPipeline;
pub use errors::{ErrorKind, PipelineError, PipelineResult};
pub use report::{FileFailure, FileOutcome, FileReport, RenamedField, RunReport};
pub use verifier::{InspectedField, Inspection, Verifier, DEFAULT_VERIFY_LIMIT};
