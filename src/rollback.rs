//! Rollback synthesizer
//!
//! Generates best-effort reverse ("down") SQL from a migration's UP SQL.
//! Each statement is matched against a fixed, ordered pattern table; the
//! earliest matching pattern wins. Statements with no mechanical inverse
//! (drops, type changes, dropped defaults) produce a `-- TODO` manual
//! placeholder instead of failing — a placeholder is valid output signalling
//! that human intervention is required.

use crate::splitter::split_statements;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Classification of an UP statement for rollback purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    CreateTable,
    DropTable,
    AddColumn,
    DropColumn,
    RenameColumn,
    RenameTable,
    AlterColumnType,
    SetNotNull,
    DropNotNull,
    SetDefault,
    DropDefault,
    AddConstraint,
    DropConstraint,
    CreateIndex,
    DropIndex,
    CreateEnum,
    CreateView,
    DropView,
    Unknown,
}

/// One UP statement with its synthesized inverse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackStatement {
    #[serde(rename = "type")]
    pub kind: StatementKind,
    /// The original UP statement (without terminating semicolon)
    pub original: String,
    /// Executable rollback SQL, or a `-- TODO` comment block when the
    /// inverse cannot be derived
    pub rollback: String,
}

impl RollbackStatement {
    /// True when the rollback text is a manual placeholder rather than
    /// executable SQL.
    pub fn requires_manual_action(&self) -> bool {
        self.rollback.starts_with("-- TODO")
    }
}

const ROLLBACK_HEADER: &str =
    "-- Rollback migration generated by migraflow-engine\n-- Review carefully before executing.";

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<t>[\w".]+)"#).unwrap()
});
static DROP_TABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^DROP\s+TABLE\b").unwrap());
static ADD_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?(?P<t>[\w".]+)\s+ADD\s+COLUMN\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<c>[\w"]+)"#,
    )
    .unwrap()
});
static DROP_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?[\w".]+\s+DROP\s+COLUMN\b"#).unwrap()
});
static RENAME_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?(?P<t>[\w".]+)\s+RENAME\s+COLUMN\s+(?P<a>[\w"]+)\s+TO\s+(?P<b>[\w"]+)"#,
    )
    .unwrap()
});
static RENAME_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?(?P<t>[\w".]+)\s+RENAME\s+TO\s+(?P<b>[\w"]+)"#)
        .unwrap()
});
static ALTER_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bALTER\s+COLUMN\s+[\w"]+\s+(?:SET\s+DATA\s+)?TYPE\b"#).unwrap()
});
static SET_NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?(?P<t>[\w".]+)\s+ALTER\s+COLUMN\s+(?P<c>[\w"]+)\s+SET\s+NOT\s+NULL"#,
    )
    .unwrap()
});
static DROP_NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?(?P<t>[\w".]+)\s+ALTER\s+COLUMN\s+(?P<c>[\w"]+)\s+DROP\s+NOT\s+NULL"#,
    )
    .unwrap()
});
static SET_DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?(?P<t>[\w".]+)\s+ALTER\s+COLUMN\s+(?P<c>[\w"]+)\s+SET\s+DEFAULT\b"#,
    )
    .unwrap()
});
static DROP_DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?[\w".]+\s+ALTER\s+COLUMN\s+[\w"]+\s+DROP\s+DEFAULT\b"#,
    )
    .unwrap()
});
static ADD_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?(?P<t>[\w".]+)\s+ADD\s+CONSTRAINT\s+(?P<n>[\w"]+)"#,
    )
    .unwrap()
});
static DROP_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?[\w".]+\s+DROP\s+CONSTRAINT\b"#).unwrap()
});
static CREATE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^CREATE\s+(?:UNIQUE\s+)?INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+NOT\s+EXISTS\s+)?(?P<n>[\w".]+)"#,
    )
    .unwrap()
});
static DROP_INDEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^DROP\s+INDEX\b").unwrap());
static CREATE_ENUM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^CREATE\s+TYPE\s+(?P<n>[\w".]+)\s+AS\s+ENUM\b"#).unwrap()
});
static CREATE_VIEW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^CREATE\s+(?:OR\s+REPLACE\s+)?VIEW\s+(?P<n>[\w".]+)"#).unwrap()
});
static DROP_VIEW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^DROP\s+VIEW\b").unwrap());

/// Build the rollback plan for an UP SQL body.
///
/// Statements come back in execution order for the rollback: the last UP
/// statement's inverse runs first.
pub fn plan_rollback(up_sql: &str) -> Vec<RollbackStatement> {
    let mut plan: Vec<RollbackStatement> = split_statements(up_sql)
        .into_iter()
        .map(|stmt| rollback_statement(&stmt.text))
        .collect();
    plan.reverse();

    debug!(
        statements = plan.len(),
        manual = plan.iter().filter(|s| s.requires_manual_action()).count(),
        "rollback plan built"
    );

    plan
}

/// Generate the full rollback script for an UP SQL body.
///
/// Returns the empty string for empty or whitespace-only input; otherwise a
/// two-line header comment followed by one rollback block per UP statement,
/// in reversed order.
pub fn generate_rollback_sql(up_sql: &str) -> String {
    let plan = plan_rollback(up_sql);
    if plan.is_empty() {
        return String::new();
    }

    let body = plan
        .iter()
        .map(|s| s.rollback.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{ROLLBACK_HEADER}\n\n{body}")
}

/// Match one UP statement against the pattern table, earliest match wins.
fn rollback_statement(stmt: &str) -> RollbackStatement {
    if let Some(caps) = CREATE_TABLE_RE.captures(stmt) {
        let table = &caps["t"];
        return executable(
            StatementKind::CreateTable,
            stmt,
            format!("DROP TABLE IF EXISTS {table} CASCADE;"),
        );
    }
    if DROP_TABLE_RE.is_match(stmt) {
        // The dropped table's definition and data are gone
        return manual(StatementKind::DropTable, stmt);
    }
    if let Some(caps) = ADD_COLUMN_RE.captures(stmt) {
        let (table, column) = (&caps["t"], &caps["c"]);
        return executable(
            StatementKind::AddColumn,
            stmt,
            format!("ALTER TABLE {table} DROP COLUMN IF EXISTS {column};"),
        );
    }
    if DROP_COLUMN_RE.is_match(stmt) {
        return manual(StatementKind::DropColumn, stmt);
    }
    if let Some(caps) = RENAME_COLUMN_RE.captures(stmt) {
        let (table, old, new) = (&caps["t"], &caps["a"], &caps["b"]);
        return executable(
            StatementKind::RenameColumn,
            stmt,
            format!("ALTER TABLE {table} RENAME COLUMN {new} TO {old};"),
        );
    }
    if let Some(caps) = RENAME_TABLE_RE.captures(stmt) {
        let (old, new) = (&caps["t"], &caps["b"]);
        return executable(
            StatementKind::RenameTable,
            stmt,
            format!("ALTER TABLE {new} RENAME TO {old};"),
        );
    }
    if ALTER_TYPE_RE.is_match(stmt) {
        // The previous type is not recoverable from the statement
        return manual(StatementKind::AlterColumnType, stmt);
    }
    if let Some(caps) = SET_NOT_NULL_RE.captures(stmt) {
        let (table, column) = (&caps["t"], &caps["c"]);
        return executable(
            StatementKind::SetNotNull,
            stmt,
            format!("ALTER TABLE {table} ALTER COLUMN {column} DROP NOT NULL;"),
        );
    }
    if let Some(caps) = DROP_NOT_NULL_RE.captures(stmt) {
        let (table, column) = (&caps["t"], &caps["c"]);
        return executable(
            StatementKind::DropNotNull,
            stmt,
            format!("ALTER TABLE {table} ALTER COLUMN {column} SET NOT NULL;"),
        );
    }
    if let Some(caps) = SET_DEFAULT_RE.captures(stmt) {
        let (table, column) = (&caps["t"], &caps["c"]);
        return executable(
            StatementKind::SetDefault,
            stmt,
            format!("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT;"),
        );
    }
    if DROP_DEFAULT_RE.is_match(stmt) {
        // The prior default value is unknown, so this is not invertible
        return manual(StatementKind::DropDefault, stmt);
    }
    if let Some(caps) = ADD_CONSTRAINT_RE.captures(stmt) {
        let (table, name) = (&caps["t"], &caps["n"]);
        return executable(
            StatementKind::AddConstraint,
            stmt,
            format!("ALTER TABLE {table} DROP CONSTRAINT IF EXISTS {name};"),
        );
    }
    if DROP_CONSTRAINT_RE.is_match(stmt) {
        return manual(StatementKind::DropConstraint, stmt);
    }
    if let Some(caps) = CREATE_INDEX_RE.captures(stmt) {
        let name = &caps["n"];
        return executable(
            StatementKind::CreateIndex,
            stmt,
            format!("DROP INDEX IF EXISTS {name};"),
        );
    }
    if DROP_INDEX_RE.is_match(stmt) {
        return manual(StatementKind::DropIndex, stmt);
    }
    if let Some(caps) = CREATE_ENUM_RE.captures(stmt) {
        let name = &caps["n"];
        return executable(
            StatementKind::CreateEnum,
            stmt,
            format!("DROP TYPE IF EXISTS {name};"),
        );
    }
    if let Some(caps) = CREATE_VIEW_RE.captures(stmt) {
        let name = &caps["n"];
        return executable(
            StatementKind::CreateView,
            stmt,
            format!("DROP VIEW IF EXISTS {name};"),
        );
    }
    if DROP_VIEW_RE.is_match(stmt) {
        return manual(StatementKind::DropView, stmt);
    }

    manual(StatementKind::Unknown, stmt)
}

fn executable(kind: StatementKind, original: &str, rollback: String) -> RollbackStatement {
    RollbackStatement {
        kind,
        original: original.to_string(),
        rollback,
    }
}

/// Manual placeholder embedding the original statement as a comment block.
fn manual(kind: StatementKind, original: &str) -> RollbackStatement {
    let mut rollback = String::from("-- TODO: manual rollback required for:\n");
    for line in original.lines() {
        rollback.push_str("-- ");
        rollback.push_str(line);
        rollback.push('\n');
    }
    RollbackStatement {
        kind,
        original: original.to_string(),
        rollback: rollback.trim_end().to_string(),
    }
}
