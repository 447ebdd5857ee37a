//! Migration driver
//!
//! Processes inputs one at a time: read, normalize, migrate, write. Each
//! file's sequence is the unit of atomicity; a failure on one file never
//! produces an output for it and never affects another file.
//!
//! After a failure the run either continues with the next file or stops,
//! per [`ErrorPolicy`]. Either way the failure is logged and reported.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::config::{ErrorPolicy, MigrationConfig};
use super::errors::PipelineResult;
use super::report::{FileFailure, FileOutcome, FileReport, RenamedField, RunReport};
use crate::container::{
    derive_output_path, format_checksum, read_container, ContainerError, ContainerResult,
    ContainerWriter,
};
use crate::migrate::RecordMigrator;
use crate::observability::{Logger, ObservationScope};
use crate::schema::{FieldAction, SchemaNormalizer};

/// Resolves a path for identity comparison; the file itself need not exist.
///
/// The parent directory is canonicalized so `db/./a.avro`, `./db/a.avro`
/// and symlinked directories all compare equal.
fn resolve_path(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

pub struct MigrationPipeline {
    config: MigrationConfig,
    normalizer: SchemaNormalizer,
}

impl MigrationPipeline {
    /// Validates the configuration and builds a pipeline.
    pub fn new(config: MigrationConfig) -> PipelineResult<Self> {
        config.validate()?;
        let normalizer = SchemaNormalizer::new(config.rules.clone());
        Ok(Self { config, normalizer })
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Output path for an input under the configured suffix
    pub fn output_path_for(&self, input: &Path) -> ContainerResult<PathBuf> {
        derive_output_path(input, &self.config.output_suffix)
    }

    /// Migrates a single file. Its output may not overwrite the input.
    pub fn migrate_file(&self, input: &Path) -> PipelineResult<FileReport> {
        self.migrate_one(input, &HashSet::new())
    }

    fn migrate_one(&self, input: &Path, all_inputs: &HashSet<PathBuf>) -> PipelineResult<FileReport> {
        let path = input.display().to_string();
        let scope = ObservationScope::with_fields("MIGRATE_FILE", &[("path", path.as_str())]);

        match self.migrate_inner(input, &path, all_inputs) {
            Ok(report) => {
                let records = report.records.to_string();
                let output = report.output.display().to_string();
                scope.complete_with_fields(&[("records", records.as_str()), ("output", output.as_str())]);
                Ok(report)
            }
            Err(e) => {
                scope.fail(e.code(), &e.to_string());
                Err(e)
            }
        }
    }

    fn migrate_inner(
        &self,
        input: &Path,
        path: &str,
        all_inputs: &HashSet<PathBuf>,
    ) -> PipelineResult<FileReport> {
        let output = self.output_path_for(input)?;
        let target = resolve_path(&output);
        if target == resolve_path(input) || all_inputs.contains(&target) {
            return Err(ContainerError::write_failed(
                &output,
                format!("Output path collides with input file {}", output.display()),
            )
            .into());
        }

        let (schema, records) = read_container(input)?;
        let record_count = records.len().to_string();
        let field_count = schema.fields.len().to_string();
        Logger::info(
            "FILE_READ",
            &[
                ("path", path),
                ("records", record_count.as_str()),
                ("fields", field_count.as_str()),
            ],
        );

        let normalized = self.normalizer.normalize(&schema)?;
        let renamed: Vec<RenamedField> = normalized
            .mapping
            .entries()
            .iter()
            .filter_map(|entry| match &entry.action {
                FieldAction::Rename { to, rule } => Some(RenamedField {
                    from: entry.original.clone(),
                    to: to.clone(),
                    rule: *rule,
                }),
                _ => None,
            })
            .collect();
        let removed: Vec<String> = normalized
            .mapping
            .removed()
            .into_iter()
            .map(str::to_string)
            .collect();

        let fields = normalized.schema.field_names().join(",");
        let renamed_count = renamed.len().to_string();
        let removed_list = removed.join(",");
        Logger::info(
            "SCHEMA_NORMALIZED",
            &[
                ("path", path),
                ("fields", fields.as_str()),
                ("renamed", renamed_count.as_str()),
                ("removed", removed_list.as_str()),
            ],
        );

        let migrator = RecordMigrator::new(&normalized.mapping, &self.config.value_rewrites);
        let migration = migrator.migrate(records, &normalized.schema)?;
        for skipped in &migration.skipped {
            let record = skipped.record.to_string();
            let missing = skipped.missing.join(",");
            Logger::warn(
                "RULE_SKIPPED",
                &[
                    ("path", path),
                    ("record", record.as_str()),
                    ("rule", skipped.rule.as_str()),
                    ("missing", missing.as_str()),
                ],
            );
        }

        let receipt = ContainerWriter::new(&output).write(&normalized.schema, &migration.records)?;
        let checksum = format_checksum(receipt.checksum);
        let output_path = output.display().to_string();
        let written = receipt.records.to_string();
        let bytes = receipt.bytes.to_string();
        Logger::info(
            "FILE_WRITTEN",
            &[
                ("path", output_path.as_str()),
                ("records", written.as_str()),
                ("bytes", bytes.as_str()),
                ("checksum", checksum.as_str()),
            ],
        );

        let preview = migration
            .records
            .iter()
            .take(self.config.preview_records)
            .map(|record| record.to_json())
            .collect();

        Ok(FileReport {
            input: input.to_path_buf(),
            output,
            records: migration.records.len(),
            fields: normalized.schema.field_names(),
            removed,
            renamed,
            rewrites: migration.rewrites,
            skipped: migration.skipped,
            bytes: receipt.bytes,
            checksum,
            preview,
        })
    }

    /// Migrates every input in order.
    pub fn run(&self, inputs: &[PathBuf]) -> RunReport {
        self.run_with(inputs, |_| {})
    }

    /// Migrates every input in order, handing each outcome to `on_file`
    /// as soon as it is known.
    pub fn run_with<F>(&self, inputs: &[PathBuf], mut on_file: F) -> RunReport
    where
        F: FnMut(&FileOutcome),
    {
        let started_at = Utc::now();
        let all_inputs: HashSet<PathBuf> = inputs.iter().map(|p| resolve_path(p)).collect();
        let mut files = Vec::with_capacity(inputs.len());
        let mut not_attempted = Vec::new();

        for (position, input) in inputs.iter().enumerate() {
            let outcome = match self.migrate_one(input, &all_inputs) {
                Ok(report) => FileOutcome::Migrated(report),
                Err(e) => {
                    let path = input.display().to_string();
                    let message = e.to_string();
                    Logger::error(
                        "FILE_FAILED",
                        &[
                            ("path", path.as_str()),
                            ("kind", e.kind().as_str()),
                            ("code", e.code()),
                            ("message", message.as_str()),
                        ],
                    );
                    FileOutcome::Failed(FileFailure::new(input.clone(), &e))
                }
            };

            on_file(&outcome);
            let failed = !outcome.is_success();
            files.push(outcome);

            if failed && self.config.on_error == ErrorPolicy::Abort {
                not_attempted = inputs[position + 1..].to_vec();
                break;
            }
        }

        let report = RunReport {
            files,
            not_attempted,
            started_at,
            finished_at: Utc::now(),
        };

        let files = report.files.len().to_string();
        let succeeded = report.succeeded().to_string();
        let failed = report.failed().to_string();
        let skipped = report.not_attempted.len().to_string();
        Logger::info(
            "RUN_COMPLETE",
            &[
                ("files", files.as_str()),
                ("succeeded", succeeded.as_str()),
                ("failed", failed.as_str()),
                ("not_attempted", skipped.as_str()),
            ],
        );

        report
    }
}
