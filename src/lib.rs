//! MigraFlow Engine - SQL Migration Analysis & Synthesis
//!
//! The analysis core of the MigraFlow governance platform: pure functions
//! that read raw migration SQL (or a pair of introspected schema snapshots)
//! and derive risk classifications, dependency graphs, rollback SQL,
//! dry-run previews, and forward DDL.
//!
//! ANALYSIS PIPELINE:
//! - Split: statement boundaries with line tracking (string-aware)
//! - Lint: ordered rule table scoring each SQL body low → critical
//! - Graph: table references and migration-to-migration dependencies
//! - Rollback: best-effort inverse SQL with explicit manual placeholders
//! - Dry run: per-statement preview with reversibility and risk estimate
//! - Synthesis: schema diff → ordered DDL migration script
//!
//! Everything here is synchronous, deterministic, and total: the engine
//! never executes SQL, never touches the network, and never panics on
//! malformed input. The HTTP API, persistence, and the ephemeral-database
//! validation runner live in separate services and consume these functions
//! over plain call/return.

pub mod error;
pub mod graph;
pub mod lint;
pub mod migration;
pub mod rollback;
pub mod schema;
pub mod simulation;
pub mod splitter;

pub use error::{EngineError, EngineResult};
pub use graph::{
    build_dependency_graph, extract_table_refs, DependencyGraph, EdgeKind, MigrationEdge,
    MigrationNode, MigrationRisk, TableAction, TableRef,
};
pub use lint::{analyze_sql, LintIssue, LintRule, RiskLevel, RuleCategory, SqlAnalysis, SqlLinter};
pub use migration::{annotate_migration, Migration, MigrationAnnotation};
pub use rollback::{
    generate_rollback_sql, plan_rollback, RollbackStatement, StatementKind,
};
pub use schema::{
    diff_schemas, generate_add_column, generate_add_foreign_key, generate_alter_column_type,
    generate_create_table, generate_drop_column, generate_drop_constraint, generate_drop_default,
    generate_drop_not_null, generate_drop_table, generate_migration_from_diff,
    generate_set_default, generate_set_not_null, parse_diff, parse_snapshot, quote_ident,
    quote_literal, ColumnDiff, SchemaColumn, SchemaDiff, SchemaForeignKey, SchemaTable, TableDiff,
};
pub use simulation::{analyze_dry_run, DryRunOperation, DryRunReport, OperationType};
pub use splitter::{normalize_sql, split_statements, SqlStatement};
