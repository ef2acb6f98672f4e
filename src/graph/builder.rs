//! Migration dependency graph builder
//!
//! Derives a directed graph of migration-to-migration dependencies keyed by
//! shared tables: the migration that first creates a table owns it, and every
//! later migration referencing that table depends on the owner.

use crate::graph::refs::{extract_table_refs, MigrationRisk, TableAction, TableRef};
use crate::migration::Migration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

/// A migration in the dependency graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationNode {
    pub migration_id: Uuid,
    pub version: i64,
    pub description: String,
    /// Tables this migration touches, deduplicated by (table, action)
    pub tables: Vec<TableRef>,
    /// Derived, never stored independently
    pub risk_level: MigrationRisk,
}

/// Why one migration depends on another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// Consumer reads or re-creates a table the producer created
    CreatesFor,
    /// Consumer alters or writes the producer's table
    ModifiesAfter,
    /// Consumer drops the producer's table
    DropsCreated,
}

/// A dependency edge between two migrations, keyed by the shared table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationEdge {
    pub from: Uuid,
    pub to: Uuid,
    pub table: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

/// Complete dependency graph over one project's migrations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGraph {
    pub nodes: Vec<MigrationNode>,
    pub edges: Vec<MigrationEdge>,
    /// table -> ids of every migration touching it, in version order.
    /// Consumed directly by ERD/graph visualizations.
    pub table_owners: BTreeMap<String, Vec<Uuid>>,
}

/// Build the dependency graph for a set of migrations.
///
/// Migrations are ordered by ascending version. The first migration to
/// create a table owns it for the rest of the timeline; ownership is never
/// reassigned even if a later migration re-creates the table.
pub fn build_dependency_graph(migrations: &[Migration]) -> DependencyGraph {
    let mut ordered: Vec<&Migration> = migrations.iter().collect();
    ordered.sort_by_key(|m| m.version);

    debug!(count = ordered.len(), "building migration dependency graph");

    let mut nodes = Vec::with_capacity(ordered.len());
    let mut edges: Vec<MigrationEdge> = Vec::new();
    let mut seen_edges: HashSet<(Uuid, Uuid, String)> = HashSet::new();
    // table -> first migration that created it (first writer wins)
    let mut creators: HashMap<String, Uuid> = HashMap::new();
    let mut table_owners: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();

    for migration in &ordered {
        let tables = extract_table_refs(&migration.up_sql);

        for table_ref in &tables {
            // Edges point from the creating migration to this one. A table
            // created and referenced inside the same migration is not a
            // dependency on anything.
            if let Some(&creator) = creators.get(&table_ref.table) {
                if creator != migration.id {
                    let kind = match table_ref.action {
                        TableAction::Drop => EdgeKind::DropsCreated,
                        TableAction::Read | TableAction::Create => EdgeKind::CreatesFor,
                        TableAction::Alter | TableAction::Write => EdgeKind::ModifiesAfter,
                    };
                    let key = (creator, migration.id, table_ref.table.clone());
                    if seen_edges.insert(key) {
                        edges.push(MigrationEdge {
                            from: creator,
                            to: migration.id,
                            table: table_ref.table.clone(),
                            kind,
                        });
                    }
                }
            }

            let owners = table_owners.entry(table_ref.table.clone()).or_default();
            if !owners.contains(&migration.id) {
                owners.push(migration.id);
            }
        }

        // Register creations after the edge pass so a migration never
        // depends on itself.
        for table_ref in &tables {
            if table_ref.action == TableAction::Create {
                creators
                    .entry(table_ref.table.clone())
                    .or_insert(migration.id);
            }
        }

        let risk_level = MigrationRisk::from_refs(&tables);
        nodes.push(MigrationNode {
            migration_id: migration.id,
            version: migration.version,
            description: migration.description.clone(),
            tables,
            risk_level,
        });
    }

    DependencyGraph {
        nodes,
        edges,
        table_owners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn migration(version: i64, description: &str, up_sql: &str) -> Migration {
        Migration::new(version, description, up_sql, "")
    }

    #[test]
    fn create_then_alter_produces_modifies_after_edge() {
        let m1 = migration(1, "create users", "CREATE TABLE users (id int);");
        let m2 = migration(2, "add email", "ALTER TABLE users ADD COLUMN email text;");
        let graph = build_dependency_graph(&[m1.clone(), m2.clone()]);

        assert_eq!(graph.edges.len(), 1);
        let edge = &graph.edges[0];
        assert_eq!(edge.from, m1.id);
        assert_eq!(edge.to, m2.id);
        assert_eq!(edge.table, "users");
        assert_eq!(edge.kind, EdgeKind::ModifiesAfter);

        assert_eq!(graph.nodes[0].risk_level, MigrationRisk::Safe);
        assert_eq!(graph.nodes[1].risk_level, MigrationRisk::Caution);
    }

    #[test]
    fn drop_of_created_table_is_typed_drops_created() {
        let m1 = migration(1, "create tmp", "CREATE TABLE tmp (id int);");
        let m2 = migration(2, "drop tmp", "DROP TABLE tmp;");
        let graph = build_dependency_graph(&[m1, m2]);

        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].kind, EdgeKind::DropsCreated);
        assert_eq!(graph.nodes[1].risk_level, MigrationRisk::Destructive);
    }

    #[test]
    fn foreign_key_reference_is_typed_creates_for() {
        let m1 = migration(1, "create users", "CREATE TABLE users (id int PRIMARY KEY);");
        let m2 = migration(
            2,
            "create orders",
            "CREATE TABLE orders (id int, user_id int REFERENCES users (id));",
        );
        let graph = build_dependency_graph(&[m1, m2]);

        let edge = graph
            .edges
            .iter()
            .find(|e| e.table == "users")
            .expect("users edge");
        assert_eq!(edge.kind, EdgeKind::CreatesFor);
    }

    #[test]
    fn unsorted_input_is_ordered_by_version() {
        let m2 = migration(2, "alter", "ALTER TABLE t ADD COLUMN x int;");
        let m1 = migration(1, "create", "CREATE TABLE t (id int);");
        let graph = build_dependency_graph(&[m2.clone(), m1.clone()]);

        assert_eq!(graph.nodes[0].migration_id, m1.id);
        assert_eq!(graph.nodes[1].migration_id, m2.id);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].from, m1.id);
    }

    #[test]
    fn same_migration_references_do_not_self_edge() {
        let m1 = migration(
            1,
            "create and seed",
            "CREATE TABLE t (id int);\nINSERT INTO t VALUES (1);",
        );
        let graph = build_dependency_graph(&[m1]);
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn duplicate_edges_collapse() {
        let m1 = migration(1, "create", "CREATE TABLE t (id int);");
        let m2 = migration(
            2,
            "alter twice",
            "ALTER TABLE t ADD COLUMN a int;\nUPDATE t SET a = 1;",
        );
        let graph = build_dependency_graph(&[m1, m2]);
        // alter + write on the same table yield a single edge
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn first_creator_wins_ownership() {
        let m1 = migration(1, "create", "CREATE TABLE t (id int);");
        let m2 = migration(2, "drop", "DROP TABLE t;");
        let m3 = migration(3, "recreate", "CREATE TABLE t (id bigint);");
        let m1_id = m1.id;
        let m3_id = m3.id;
        let graph = build_dependency_graph(&[m1, m2, m3]);

        // m3 re-creates t, so it depends on the original creator
        let edge = graph
            .edges
            .iter()
            .find(|e| e.to == m3_id)
            .expect("recreate edge");
        assert_eq!(edge.from, m1_id);
        assert_eq!(edge.kind, EdgeKind::CreatesFor);
    }

    #[test]
    fn table_owners_follow_version_order() {
        let m1 = migration(1, "create", "CREATE TABLE t (id int);");
        let m2 = migration(2, "alter", "ALTER TABLE t ADD COLUMN x int;");
        let ids = vec![m1.id, m2.id];
        let graph = build_dependency_graph(&[m1, m2]);

        assert_eq!(graph.table_owners.get("t"), Some(&ids));
    }

    #[test]
    fn empty_input_yields_empty_graph() {
        let graph = build_dependency_graph(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(graph.table_owners.is_empty());
    }
}
