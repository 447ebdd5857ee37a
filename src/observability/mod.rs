//! Observability subsystem for avrofix
//!
//! Structured JSON logging to stderr plus timed observation scopes.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on migration results
//! 3. No background threads
//! 4. Deterministic field ordering
//!
//! # Usage
//!
//! ```ignore
//! use avrofix::observability::{Logger, ObservationScope};
//!
//! Logger::info("FILE_READ", &[("path", "db/a.avro"), ("records", "42")]);
//!
//! let scope = ObservationScope::with_fields("MIGRATE_FILE", &[("path", "db/a.avro")]);
//! scope.complete();
//! ```

mod logger;
mod scope;

pub use logger::{Logger, Severity};
pub use scope::ObservationScope;
