//! CLI module for avrofix
//!
//! Provides command-line interface for:
//! - migrate: Normalize container files into new outputs
//! - verify: Print schema and leading records of container files
//! - rules: Print the effective migration rules

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{migrate, rules, run, run_command, verify};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_json, write_response};
