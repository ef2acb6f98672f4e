//! Migration data models
//!
//! Defines the structure for versioned SQL migrations fed into the engine.
//! Migrations are immutable inputs: the engine derives artifacts from them
//! and never mutates them.

use crate::graph::{MigrationRisk, TableRef};
use crate::lint::{analyze_sql, SqlAnalysis};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single versioned migration belonging to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Migration {
    pub id: Uuid,
    /// Ordinal version, unique within a project. Validated by the caller.
    pub version: i64,
    /// Human-readable description
    pub description: String,
    /// Forward (apply) SQL body
    pub up_sql: String,
    /// Backward (rollback) SQL body
    pub down_sql: String,
    /// When the migration was created
    pub created_at: DateTime<Utc>,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up_sql: impl Into<String>,
        down_sql: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            version,
            description: description.into(),
            up_sql: up_sql.into(),
            down_sql: down_sql.into(),
            created_at: Utc::now(),
        }
    }
}

/// Per-migration analysis bundle consumed by the validation runner for UI
/// annotation while a migration set is being executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationAnnotation {
    pub migration_id: Uuid,
    pub version: i64,
    /// Tables this migration touches, deduplicated by (table, action)
    pub tables: Vec<TableRef>,
    /// Lint findings for the UP SQL
    pub analysis: SqlAnalysis,
    /// Derived risk classification
    pub risk: MigrationRisk,
}

/// Run the reference extractor and risk analyzer over one migration.
pub fn annotate_migration(migration: &Migration) -> MigrationAnnotation {
    let tables = crate::graph::extract_table_refs(&migration.up_sql);
    let analysis = analyze_sql(&migration.up_sql);
    let risk = MigrationRisk::from_refs(&tables);

    MigrationAnnotation {
        migration_id: migration.id,
        version: migration.version,
        tables,
        analysis,
        risk,
    }
}
