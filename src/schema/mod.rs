//! Schema Module
//!
//! Structures describing an introspected database schema, the structural
//! diff between two schema snapshots, and the DDL synthesis that turns a
//! diff back into an ordered migration script.
//!
//! Snapshots are produced by the external validation runner and arrive here
//! as read-only input, either as typed values or as JSON documents.

pub mod ddl;
pub mod diff;

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};

pub use ddl::{
    generate_add_column, generate_add_foreign_key, generate_alter_column_type,
    generate_create_table, generate_drop_column, generate_drop_constraint,
    generate_drop_default, generate_drop_not_null, generate_drop_table,
    generate_migration_from_diff, generate_set_default, generate_set_not_null, quote_ident,
    quote_literal,
};
pub use diff::{diff_schemas, ColumnDiff, SchemaDiff, TableDiff};

/// An introspected table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
}

/// An introspected foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaForeignKey {
    /// Constraint name; a deterministic fallback name is derived when empty
    #[serde(default)]
    pub name: String,
    /// Referencing column on the owning table
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// An introspected table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaTable {
    pub name: String,
    pub columns: Vec<SchemaColumn>,
    #[serde(default)]
    pub foreign_keys: Vec<SchemaForeignKey>,
}

/// Parse a JSON schema snapshot (array of tables) produced by the
/// introspection collaborator.
pub fn parse_snapshot(json: &str) -> EngineResult<Vec<SchemaTable>> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a pre-computed JSON schema diff document.
pub fn parse_diff(json: &str) -> EngineResult<SchemaDiff> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let json = r#"[
            {
                "name": "users",
                "columns": [
                    {"name": "id", "dataType": "integer", "nullable": false, "isPrimaryKey": true},
                    {"name": "email", "dataType": "text", "nullable": true}
                ],
                "foreignKeys": []
            }
        ]"#;
        let tables = parse_snapshot(json).expect("valid snapshot");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns[0].name, "id");
        assert!(tables[0].columns[0].is_primary_key);
        assert!(!tables[0].columns[1].is_primary_key);
    }

    #[test]
    fn invalid_snapshot_is_an_error() {
        assert!(parse_snapshot("{not json").is_err());
        assert!(parse_snapshot(r#"{"name": "not an array"}"#).is_err());
    }
}
