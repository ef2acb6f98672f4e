//! Table reference extraction
//!
//! Scans migration SQL for the tables it touches and how it touches them.
//! Matching runs over normalized text (comments blanked, literals replaced),
//! so table names mentioned in strings or comments are not picked up.

use crate::splitter::normalize_sql;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a migration touches a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableAction {
    Create,
    Drop,
    Alter,
    Read,
    Write,
}

/// One (table, action) pair extracted from a migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    /// Normalized lowercase identifier, de-quoted
    pub table: String,
    pub action: TableAction,
}

/// Derived risk classification for a whole migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationRisk {
    Safe,
    Caution,
    Destructive,
}

impl MigrationRisk {
    /// `Destructive` iff any drop, else `Caution` iff any alter/write,
    /// else `Safe`.
    pub fn from_refs(refs: &[TableRef]) -> Self {
        if refs.iter().any(|r| r.action == TableAction::Drop) {
            MigrationRisk::Destructive
        } else if refs
            .iter()
            .any(|r| matches!(r.action, TableAction::Alter | TableAction::Write))
        {
            MigrationRisk::Caution
        } else {
            MigrationRisk::Safe
        }
    }
}

const IDENT: &str = r#""?[A-Za-z_][A-Za-z0-9_$]*"?(?:\."?[A-Za-z_][A-Za-z0-9_$]*"?)?"#;

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bCREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?({IDENT})"
    ))
    .unwrap()
});
static DROP_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bDROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?([^;]+)").unwrap());
static ALTER_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bALTER\s+TABLE\s+(?:ONLY\s+)?(?:IF\s+EXISTS\s+)?({IDENT})"
    ))
    .unwrap()
});
static INSERT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\bINSERT\s+INTO\s+({IDENT})")).unwrap());
static UPDATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\bUPDATE\s+(?:ONLY\s+)?({IDENT})\s+SET\b")).unwrap()
});
static DELETE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\bDELETE\s+FROM\s+(?:ONLY\s+)?({IDENT})")).unwrap()
});
static REFERENCES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\bREFERENCES\s+({IDENT})")).unwrap());

/// Lowercase and de-quote a possibly schema-qualified identifier.
fn normalize_table_name(raw: &str) -> String {
    raw.split('.')
        .map(|part| part.trim_matches('"').to_lowercase())
        .collect::<Vec<_>>()
        .join(".")
}

/// Extract every (table, action) pair from one migration's SQL.
///
/// Results are deduplicated by (table, action) and keep first-seen order,
/// so repeated statements against the same table collapse to one entry.
pub fn extract_table_refs(sql: &str) -> Vec<TableRef> {
    let normalized = normalize_sql(sql);
    let mut refs: Vec<TableRef> = Vec::new();
    let mut seen: HashSet<(String, TableAction)> = HashSet::new();

    let mut push = |table: String, action: TableAction, refs: &mut Vec<TableRef>| {
        if table.is_empty() {
            return;
        }
        if seen.insert((table.clone(), action)) {
            refs.push(TableRef { table, action });
        }
    };

    for caps in CREATE_TABLE_RE.captures_iter(&normalized) {
        if let Some(m) = caps.get(1) {
            push(normalize_table_name(m.as_str()), TableAction::Create, &mut refs);
        }
    }

    // DROP TABLE accepts a comma-separated list; each table gets its own ref
    for caps in DROP_TABLE_RE.captures_iter(&normalized) {
        if let Some(list) = caps.get(1) {
            for piece in list.as_str().split(',') {
                if let Some(token) = piece.split_whitespace().next() {
                    push(normalize_table_name(token), TableAction::Drop, &mut refs);
                }
            }
        }
    }

    for caps in ALTER_TABLE_RE.captures_iter(&normalized) {
        if let Some(m) = caps.get(1) {
            push(normalize_table_name(m.as_str()), TableAction::Alter, &mut refs);
        }
    }

    for caps in INSERT_RE.captures_iter(&normalized) {
        if let Some(m) = caps.get(1) {
            push(normalize_table_name(m.as_str()), TableAction::Write, &mut refs);
        }
    }

    for caps in UPDATE_RE.captures_iter(&normalized) {
        if let Some(m) = caps.get(1) {
            push(normalize_table_name(m.as_str()), TableAction::Write, &mut refs);
        }
    }

    for caps in DELETE_RE.captures_iter(&normalized) {
        if let Some(m) = caps.get(1) {
            push(normalize_table_name(m.as_str()), TableAction::Write, &mut refs);
        }
    }

    // Foreign key targets count as reads: the migration depends on them
    for caps in REFERENCES_RE.captures_iter(&normalized) {
        if let Some(m) = caps.get(1) {
            push(normalize_table_name(m.as_str()), TableAction::Read, &mut refs);
        }
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table_yields_create_ref() {
        let refs = extract_table_refs("CREATE TABLE IF NOT EXISTS Users (id int);");
        assert_eq!(refs, vec![TableRef { table: "users".into(), action: TableAction::Create }]);
    }

    #[test]
    fn drop_list_yields_one_ref_per_table() {
        let refs = extract_table_refs("DROP TABLE IF EXISTS a, b, c CASCADE;");
        let tables: Vec<&str> = refs.iter().map(|r| r.table.as_str()).collect();
        assert_eq!(tables, vec!["a", "b", "c"]);
        assert!(refs.iter().all(|r| r.action == TableAction::Drop));
    }

    #[test]
    fn alter_refs_deduplicate() {
        let sql = "ALTER TABLE users ADD COLUMN a int;\nALTER TABLE users ADD COLUMN b int;";
        let refs = extract_table_refs(sql);
        assert_eq!(refs, vec![TableRef { table: "users".into(), action: TableAction::Alter }]);
    }

    #[test]
    fn dml_yields_write_refs() {
        let sql = "INSERT INTO audit (id) VALUES (1);\nUPDATE users SET x = 1;\nDELETE FROM sessions;";
        let refs = extract_table_refs(sql);
        let writes: Vec<&str> = refs
            .iter()
            .filter(|r| r.action == TableAction::Write)
            .map(|r| r.table.as_str())
            .collect();
        assert_eq!(writes, vec!["audit", "users", "sessions"]);
    }

    #[test]
    fn references_target_is_a_read() {
        let sql = "CREATE TABLE orders (id int, user_id int REFERENCES users (id));";
        let refs = extract_table_refs(sql);
        assert!(refs.contains(&TableRef { table: "orders".into(), action: TableAction::Create }));
        assert!(refs.contains(&TableRef { table: "users".into(), action: TableAction::Read }));
    }

    #[test]
    fn quoted_and_qualified_names_are_normalized() {
        let refs = extract_table_refs("ALTER TABLE \"Public\".\"UserAccounts\" ADD COLUMN x int;");
        assert_eq!(refs[0].table, "public.useraccounts");
    }

    #[test]
    fn table_names_in_strings_are_ignored() {
        let refs = extract_table_refs("INSERT INTO log (msg) VALUES ('DROP TABLE users');");
        assert!(refs.iter().all(|r| r.action != TableAction::Drop));
    }

    #[test]
    fn risk_classification_ladder() {
        let safe = extract_table_refs("CREATE TABLE t (id int);");
        assert_eq!(MigrationRisk::from_refs(&safe), MigrationRisk::Safe);

        let caution = extract_table_refs("ALTER TABLE t ADD COLUMN x int;");
        assert_eq!(MigrationRisk::from_refs(&caution), MigrationRisk::Caution);

        let destructive = extract_table_refs("DROP TABLE t;");
        assert_eq!(MigrationRisk::from_refs(&destructive), MigrationRisk::Destructive);
    }

    #[test]
    fn empty_input_yields_no_refs() {
        assert!(extract_table_refs("").is_empty());
    }
}
