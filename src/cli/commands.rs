//! CLI command implementations
//!
//! `migrate` prints one JSON object per input as soon as the file is done,
//! then a summary. A failing file is reported and, under the default
//! policy, the next file is still processed; the command itself fails at
//! the end if any file did.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::pipeline::{
    discover_inputs, ErrorPolicy, FileOutcome, MigrationConfig, MigrationPipeline, Verifier,
};
use crate::schema::allow_legacy_field_names;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    allow_legacy_field_names();

    match cmd {
        Command::Migrate {
            config,
            dir,
            suffix,
            preview,
            fail_fast,
            files,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(suffix) = suffix {
                config.output_suffix = suffix;
            }
            if let Some(preview) = preview {
                config.preview_records = preview;
            }
            if fail_fast {
                config.on_error = ErrorPolicy::Abort;
            }
            migrate(config, &dir, files)
        }
        Command::Verify {
            dir,
            extension,
            limit,
            files,
        } => verify(&dir, &extension, limit, files),
        Command::Rules { config } => rules(config.as_deref()),
    }
}

/// Defaults when no file is given
fn load_config(path: Option<&Path>) -> CliResult<MigrationConfig> {
    match path {
        Some(path) => Ok(MigrationConfig::load(path)?),
        None => Ok(MigrationConfig::default()),
    }
}

/// Explicit files win over directory scanning.
fn resolve_inputs(dir: &Path, extension: &str, files: Vec<PathBuf>) -> CliResult<Vec<PathBuf>> {
    if !files.is_empty() {
        return Ok(files);
    }

    let inputs = discover_inputs(dir, extension)?;
    if inputs.is_empty() {
        return Err(CliError::no_inputs(format!(
            "No .{} files found in {}",
            extension,
            dir.display()
        )));
    }
    Ok(inputs)
}

/// Migrate every input and report each file on stdout
pub fn migrate(config: MigrationConfig, dir: &Path, files: Vec<PathBuf>) -> CliResult<()> {
    let pipeline = MigrationPipeline::new(config)?;
    let inputs = resolve_inputs(dir, &pipeline.config().input_extension, files)?;

    let mut output_failure: Option<CliError> = None;
    let report = pipeline.run_with(&inputs, |outcome| {
        if output_failure.is_some() {
            return;
        }
        if let Err(e) = write_outcome(outcome) {
            output_failure = Some(e);
        }
    });
    if let Some(e) = output_failure {
        return Err(e);
    }

    write_response(json!({ "summary": report.summary() }))?;

    if !report.is_success() {
        return Err(CliError::run_failed(
            report.failed() + report.not_attempted.len(),
            inputs.len(),
        ));
    }
    Ok(())
}

fn write_outcome(outcome: &FileOutcome) -> CliResult<()> {
    match outcome {
        FileOutcome::Migrated(report) => write_response(serde_json::to_value(report)?),
        FileOutcome::Failed(failure) => {
            write_error(&failure.code, &failure.message, Some(failure.input.as_path()))
        }
    }
}

/// Print schema fields and leading records of each file
pub fn verify(dir: &Path, extension: &str, limit: usize, files: Vec<PathBuf>) -> CliResult<()> {
    let inputs = resolve_inputs(dir, extension, files)?;
    let verifier = Verifier::new(limit);

    let mut failed = 0;
    for path in &inputs {
        match verifier.inspect(path) {
            Ok(inspection) => write_response(serde_json::to_value(&inspection)?)?,
            Err(e) => {
                failed += 1;
                write_error(e.code().code(), &e.to_string(), Some(path.as_path()))?;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::run_failed(failed, inputs.len()));
    }
    Ok(())
}

/// Print the effective rule table
pub fn rules(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    write_response(json!({
        "rules": config.rules,
        "value_rewrites": config.value_rewrites,
        "output_suffix": config.output_suffix,
        "input_extension": config.input_extension,
        "on_error": config.on_error,
    }))
}
