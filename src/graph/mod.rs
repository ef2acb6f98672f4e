//! Dependency Graph Module
//!
//! "Which migration owns which table, and who touches it later?"
//! This module provides:
//! - Table reference extraction from migration SQL (create/drop/alter/read/write)
//! - A migration-to-migration dependency graph keyed by shared tables
//! - A table ownership multimap for ERD and graph visualizations

pub mod builder;
pub mod refs;

pub use builder::{
    build_dependency_graph, DependencyGraph, EdgeKind, MigrationEdge, MigrationNode,
};
pub use refs::{extract_table_refs, MigrationRisk, TableAction, TableRef};
