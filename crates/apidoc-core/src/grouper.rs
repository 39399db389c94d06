//! Version grouper and diff engine.
//!
//! Documentable blocks are partitioned by `(group, name)`, each partition is
//! sorted by semantic version, and every entry after the first carries the
//! field-level changes against its predecessor.

use crate::block::Block;
use crate::context::Context;
use crate::define::block_version;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::merge;
use crate::version::Version;
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Sections compared between versions, in report order.
pub const COMPARED_SECTIONS: &[&str] = &[
    "parameter", "header", "query", "body", "success", "error", "params", "throws",
];

// -- Types --------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

/// One field that differs between two consecutive versions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub section: String,
    pub field: String,
    pub change: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VersionDiff {
    pub changes: Vec<FieldChange>,
}

impl VersionDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn fields(&self, change: ChangeKind) -> impl Iterator<Item = &str> {
        self.changes
            .iter()
            .filter(move |c| c.change == change)
            .map(|c| c.field.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionEntry {
    pub version: Version,
    pub block: Block,
    /// `None` for the oldest version.
    pub diff: Option<VersionDiff>,
}

/// All versions of one `(group, name)`, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionedEndpoint {
    pub group: String,
    pub name: String,
    pub versions: Vec<VersionEntry>,
}

impl VersionedEndpoint {
    pub fn latest(&self) -> Option<&VersionEntry> {
        self.versions.last()
    }
}

// -- Grouping -----------------------------------------------------------------

/// Partition and sort `blocks`. Input order decides which of two blocks with
/// the same version wins: the later one.
pub fn group(blocks: Vec<Block>, ctx: &Context, diagnostics: &mut Diagnostics) -> Vec<VersionedEndpoint> {
    let mut partitions: BTreeMap<(String, String), BTreeMap<Version, Block>> = BTreeMap::new();

    for block in blocks {
        let key = (block.group().to_string(), block.name().to_string());
        let version = block_version(&block, ctx);
        let versions = partitions.entry(key).or_default();
        if let Some(earlier) = versions.get(&version) {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticKind::DuplicateVersion,
                    format!(
                        "{}/{} version {} is also declared in {} (block {}); the later declaration wins",
                        block.group(),
                        block.name(),
                        version,
                        earlier.filename,
                        earlier.index
                    ),
                )
                .in_file(block.filename.clone())
                .at_block(block.index),
            );
        }
        versions.insert(version, block);
    }

    let mut endpoints: Vec<VersionedEndpoint> = partitions
        .into_iter()
        .map(|((group, name), versions)| VersionedEndpoint {
            group,
            name,
            versions: versions
                .into_iter()
                .map(|(version, block)| VersionEntry {
                    version,
                    block,
                    diff: None,
                })
                .collect(),
        })
        .collect();

    endpoints.par_iter_mut().for_each(attach_diffs);
    tracing::debug!(endpoints = endpoints.len(), "grouped versions");
    endpoints
}

fn attach_diffs(endpoint: &mut VersionedEndpoint) {
    for i in 1..endpoint.versions.len() {
        let diff = diff_blocks(&endpoint.versions[i - 1].block, &endpoint.versions[i].block);
        endpoint.versions[i].diff = Some(diff);
    }
}

// -- Diff ---------------------------------------------------------------------

/// Key of a list entry for comparison.
fn entry_key(entry: &Value) -> Option<&str> {
    merge::identity(entry).or_else(|| entry.get("type").and_then(Value::as_str))
}

/// Entries of one section in declaration order. Grouped sections
/// (`<section>.fields.<group>`) are flattened across groups.
fn section_entries<'a>(block: &'a Block, section: &str) -> Vec<(&'a str, &'a Value)> {
    let entries: Vec<&Value> = match block.local.get(section) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(obj)) => match obj.get("fields") {
            Some(Value::Object(groups)) => groups
                .values()
                .filter_map(Value::as_array)
                .flatten()
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    let mut keyed: Vec<(&str, &Value)> = Vec::new();
    for entry in entries {
        if let Some(key) = entry_key(entry) {
            if !keyed.iter().any(|(k, _)| *k == key) {
                keyed.push((key, entry));
            }
        }
    }
    keyed
}

/// Field-level differences from `older` to `newer`. Neither block is modified.
pub fn diff_blocks(older: &Block, newer: &Block) -> VersionDiff {
    let mut changes = Vec::new();
    for section in COMPARED_SECTIONS {
        let before = section_entries(older, section);
        let after = section_entries(newer, section);
        let change = |field: &str, kind: ChangeKind, old: Option<&Value>, new: Option<&Value>| FieldChange {
            section: section.to_string(),
            field: field.to_string(),
            change: kind,
            before: old.cloned(),
            after: new.cloned(),
        };

        for (field, old) in &before {
            match after.iter().find(|(k, _)| k == field) {
                None => changes.push(change(*field, ChangeKind::Removed, Some(*old), None)),
                Some((_, new)) if new != old => {
                    changes.push(change(*field, ChangeKind::Changed, Some(*old), Some(*new)))
                }
                Some(_) => {}
            }
        }
        for (field, new) in &after {
            if !before.iter().any(|(k, _)| k == field) {
                changes.push(change(*field, ChangeKind::Added, None, Some(*new)));
            }
        }
    }
    VersionDiff { changes }
}
