//! Record migrator
//!
//! Replays a [`NameMapping`] on every record, then applies value rewrites.
//! Records are processed independently; count and relative order are
//! preserved.
//!
//! Per record:
//! 1. Drop removed fields
//! 2. Re-key renamed fields of every applicable rename group together
//! 3. Apply value rewrites (addressed by migrated field name)
//!
//! After all records are migrated, every record's key set is checked
//! against the migrated schema. All mismatching records are collected and
//! reported together; the migration then fails as a whole.

use serde::Serialize;

use super::errors::{KeyDiff, MigrateError, MigrateResult};
use super::record::Record;
use super::rewrite::ValueRewriteRule;
use crate::schema::{NameMapping, RecordSchema, RenameRule};

/// Renames produced by one rule kind, attempted together on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameGroup {
    rule: RenameRule,
    pairs: Vec<(String, String)>,
}

/// Applicability of a rename group to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// All source keys present; every rename applies
    Applied,
    /// No source key present; the record is left as-is
    Absent,
    /// Some source keys present, others missing; the group is skipped
    Partial { missing: Vec<String> },
}

impl RenameGroup {
    pub fn new(rule: RenameRule, pairs: Vec<(String, String)>) -> Self {
        Self { rule, pairs }
    }

    /// Groups the renames of a mapping by rule, skipping empty groups.
    pub fn from_mapping(mapping: &NameMapping) -> Vec<RenameGroup> {
        [RenameRule::ReservedChars, RenameRule::Exact]
            .into_iter()
            .map(|rule| RenameGroup::new(rule, mapping.renames_by_rule(rule)))
            .filter(|group| !group.pairs.is_empty())
            .collect()
    }

    pub fn rule(&self) -> RenameRule {
        self.rule
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Checks which source keys the record carries.
    pub fn check(&self, record: &Record) -> GroupOutcome {
        let missing: Vec<String> = self
            .pairs
            .iter()
            .filter(|(from, _)| !record.contains(from))
            .map(|(from, _)| from.clone())
            .collect();

        if missing.is_empty() {
            GroupOutcome::Applied
        } else if missing.len() == self.pairs.len() {
            GroupOutcome::Absent
        } else {
            GroupOutcome::Partial { missing }
        }
    }

    /// Applies the group if all source keys are present.
    pub fn apply(&self, record: &mut Record) -> MigrateResult<GroupOutcome> {
        let outcome = self.check(record);
        if outcome == GroupOutcome::Applied {
            record.rename_all(&self.pairs)?;
        }
        Ok(outcome)
    }
}

/// A rename group that was skipped for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    /// Index of the record in the input file
    pub record: usize,
    /// Rule kind of the skipped group
    pub rule: RenameRule,
    /// Source keys the record lacked
    pub missing: Vec<String>,
}

/// Output of migrating one file's records.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub records: Vec<Record>,
    pub skipped: Vec<SkippedRule>,
    /// Number of value rewrites that changed a record
    pub rewrites: usize,
}

pub struct RecordMigrator<'a> {
    mapping: &'a NameMapping,
    groups: Vec<RenameGroup>,
    rewrites: &'a [ValueRewriteRule],
}

impl<'a> RecordMigrator<'a> {
    pub fn new(mapping: &'a NameMapping, rewrites: &'a [ValueRewriteRule]) -> Self {
        Self {
            mapping,
            groups: RenameGroup::from_mapping(mapping),
            rewrites,
        }
    }

    pub fn groups(&self) -> &[RenameGroup] {
        &self.groups
    }

    /// Migrates a single record.
    ///
    /// Returns the migrated record, skipped groups, and rewrite count.
    pub fn migrate_record(
        &self,
        index: usize,
        mut record: Record,
    ) -> MigrateResult<(Record, Vec<SkippedRule>, usize)> {
        for removed in self.mapping.removed() {
            record.remove(removed);
        }

        // Applicable groups are renamed in one pass, so a target may name
        // a key that another rename moves away.
        let mut skipped = Vec::new();
        let mut pairs = Vec::new();
        for group in &self.groups {
            match group.check(&record) {
                GroupOutcome::Applied => pairs.extend(group.pairs.iter().cloned()),
                GroupOutcome::Absent => {}
                GroupOutcome::Partial { missing } => skipped.push(SkippedRule {
                    record: index,
                    rule: group.rule,
                    missing,
                }),
            }
        }
        record
            .rename_all(&pairs)
            .map_err(|e| e.at_record(index))?;

        let rewrites = self
            .rewrites
            .iter()
            .filter(|rule| rule.apply(&mut record))
            .count();

        Ok((record, skipped, rewrites))
    }

    /// Migrates every record and checks each against `target`.
    ///
    /// # Errors
    ///
    /// - `AVROFIX_RECORD_SCHEMA_MISMATCH` listing every record whose key set
    ///   differs from the target schema's field names
    /// - `AVROFIX_RECORD_KEY_EXISTS` if a rename would overwrite a key
    pub fn migrate(&self, records: Vec<Record>, target: &RecordSchema) -> MigrateResult<Migration> {
        let expected = target.field_names();
        let mut migrated = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();
        let mut rewrites = 0;
        let mut mismatches: Vec<(usize, KeyDiff)> = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let (mut record, record_skipped, record_rewrites) = self.migrate_record(index, record)?;
            skipped.extend(record_skipped);
            rewrites += record_rewrites;

            if record.key_set_matches(&expected) {
                record.reorder(&expected);
            } else {
                mismatches.push((index, record.key_diff(&expected)));
            }
            migrated.push(record);
        }

        if !mismatches.is_empty() {
            return Err(MigrateError::schema_mismatch(mismatches));
        }

        Ok(Migration {
            records: migrated,
            skipped,
            rewrites,
        })
    }
}
