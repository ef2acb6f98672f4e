//! Schema diff engine
//!
//! Compares two introspected schema snapshots and produces the structural
//! delta consumed by the DDL synthesizer. Output ordering follows input
//! ordering, never hash order, so the same snapshots always produce the
//! same diff.

use crate::schema::{SchemaColumn, SchemaForeignKey, SchemaTable};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A modified column with its before/after states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDiff {
    pub column: String,
    pub before: SchemaColumn,
    pub after: SchemaColumn,
}

/// Changes within a single table present in both snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableDiff {
    pub table: String,
    pub columns_added: Vec<SchemaColumn>,
    pub columns_removed: Vec<String>,
    pub columns_modified: Vec<ColumnDiff>,
    pub foreign_keys_added: Vec<SchemaForeignKey>,
    pub foreign_keys_removed: Vec<SchemaForeignKey>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.columns_added.is_empty()
            && self.columns_removed.is_empty()
            && self.columns_modified.is_empty()
            && self.foreign_keys_added.is_empty()
            && self.foreign_keys_removed.is_empty()
    }
}

/// Structural delta between two schema snapshots.
///
/// A table appears in exactly one of `tables_added`, `tables_removed`, or
/// `tables_modified`; tables with no changes are omitted entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiff {
    pub tables_added: Vec<SchemaTable>,
    pub tables_removed: Vec<String>,
    pub tables_modified: Vec<TableDiff>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.tables_added.is_empty()
            && self.tables_removed.is_empty()
            && self.tables_modified.is_empty()
    }
}

/// Compare two snapshots, keyed by case-insensitive table/column name.
pub fn diff_schemas(before: &[SchemaTable], after: &[SchemaTable]) -> SchemaDiff {
    let before_map: HashMap<String, &SchemaTable> =
        before.iter().map(|t| (key(&t.name), t)).collect();
    let after_map: HashMap<String, &SchemaTable> =
        after.iter().map(|t| (key(&t.name), t)).collect();

    let tables_added: Vec<SchemaTable> = after
        .iter()
        .filter(|t| !before_map.contains_key(&key(&t.name)))
        .cloned()
        .collect();

    let tables_removed: Vec<String> = before
        .iter()
        .filter(|t| !after_map.contains_key(&key(&t.name)))
        .map(|t| t.name.clone())
        .collect();

    let tables_modified: Vec<TableDiff> = before
        .iter()
        .filter_map(|bt| {
            after_map
                .get(&key(&bt.name))
                .map(|at| diff_table(bt, at))
                .filter(|d| !d.is_empty())
        })
        .collect();

    debug!(
        added = tables_added.len(),
        removed = tables_removed.len(),
        modified = tables_modified.len(),
        "schema diff computed"
    );

    SchemaDiff {
        tables_added,
        tables_removed,
        tables_modified,
    }
}

fn diff_table(before: &SchemaTable, after: &SchemaTable) -> TableDiff {
    let before_cols: HashMap<String, &SchemaColumn> =
        before.columns.iter().map(|c| (key(&c.name), c)).collect();
    let after_cols: HashMap<String, &SchemaColumn> =
        after.columns.iter().map(|c| (key(&c.name), c)).collect();

    let columns_added: Vec<SchemaColumn> = after
        .columns
        .iter()
        .filter(|c| !before_cols.contains_key(&key(&c.name)))
        .cloned()
        .collect();

    let columns_removed: Vec<String> = before
        .columns
        .iter()
        .filter(|c| !after_cols.contains_key(&key(&c.name)))
        .map(|c| c.name.clone())
        .collect();

    let columns_modified: Vec<ColumnDiff> = before
        .columns
        .iter()
        .filter_map(|bc| {
            after_cols.get(&key(&bc.name)).and_then(|ac| {
                if bc != *ac {
                    Some(ColumnDiff {
                        column: bc.name.clone(),
                        before: bc.clone(),
                        after: (*ac).clone(),
                    })
                } else {
                    None
                }
            })
        })
        .collect();

    // Foreign keys are matched by constraint name; a changed definition
    // surfaces as removed + added so the synthesizer re-creates it.
    let before_fks: HashMap<String, &SchemaForeignKey> =
        before.foreign_keys.iter().map(|fk| (key(&fk.name), fk)).collect();
    let after_fks: HashMap<String, &SchemaForeignKey> =
        after.foreign_keys.iter().map(|fk| (key(&fk.name), fk)).collect();

    let foreign_keys_added: Vec<SchemaForeignKey> = after
        .foreign_keys
        .iter()
        .filter(|fk| match before_fks.get(&key(&fk.name)) {
            Some(existing) => *existing != *fk,
            None => true,
        })
        .cloned()
        .collect();

    let foreign_keys_removed: Vec<SchemaForeignKey> = before
        .foreign_keys
        .iter()
        .filter(|fk| match after_fks.get(&key(&fk.name)) {
            Some(current) => *current != *fk,
            None => true,
        })
        .cloned()
        .collect();

    TableDiff {
        table: before.name.clone(),
        columns_added,
        columns_removed,
        columns_modified,
        foreign_keys_added,
        foreign_keys_removed,
    }
}

fn key(name: &str) -> String {
    name.to_lowercase()
}
