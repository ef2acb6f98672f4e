//! Dry run analyzer
//!
//! Previews what a SQL script would do: classifies each statement, tracks the
//! tables and indexes it touches, and estimates risk and reversibility.
//!
//! The analyzer carries its own line-aware statement scanner (stripping `--`
//! comments as it accumulates) rather than reusing [`crate::splitter`]; the
//! two scanners agree on statement boundaries and line numbers and are kept
//! separate on purpose so preview behavior can evolve independently.

use crate::lint::RiskLevel;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kind of operation a statement performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    CreateTable,
    DropTable,
    AlterTable,
    CreateIndex,
    DropIndex,
    CreateView,
    DropView,
    CreateType,
    Insert,
    Update,
    Delete,
    Other,
}

/// One classified statement in the preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunOperation {
    #[serde(rename = "type")]
    pub op: OperationType,
    /// Primary object the statement touches (table, index, view, type)
    pub target: String,
    /// Human-readable sub-detail, e.g. "ADD COLUMN email" or
    /// "UPDATE without WHERE clause"
    pub detail: String,
    /// 1-based line where the statement starts
    pub line: usize,
    /// True when the operation can be undone without external knowledge
    pub reversible: bool,
}

/// Aggregated preview of a whole script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunReport {
    pub operations: Vec<DryRunOperation>,
    pub tables_created: Vec<String>,
    pub tables_dropped: Vec<String>,
    pub tables_modified: Vec<String>,
    pub indexes_created: Vec<String>,
    pub indexes_dropped: Vec<String>,
    /// Count of INSERT/UPDATE/DELETE statements
    pub data_modifications: usize,
    pub is_fully_reversible: bool,
    pub estimated_risk: RiskLevel,
}

static CREATE_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<t>[\w".]+)"#).unwrap()
});
static DROP_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^DROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?P<t>[\w".]+)"#).unwrap()
});
static ALTER_TABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^ALTER\s+TABLE\s+(?:ONLY\s+)?(?:IF\s+EXISTS\s+)?(?P<t>[\w".]+)(?P<rest>[\s\S]*)$"#)
        .unwrap()
});
static CREATE_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^CREATE\s+(?:UNIQUE\s+)?INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+NOT\s+EXISTS\s+)?(?P<n>[\w".]+)(?:\s+ON\s+(?P<t>[\w".]+))?"#,
    )
    .unwrap()
});
static DROP_INDEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^DROP\s+INDEX\s+(?:CONCURRENTLY\s+)?(?:IF\s+EXISTS\s+)?(?P<n>[\w".]+)"#)
        .unwrap()
});
static CREATE_VIEW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^CREATE\s+(?:OR\s+REPLACE\s+)?VIEW\s+(?P<n>[\w".]+)"#).unwrap()
});
static DROP_VIEW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^DROP\s+VIEW\s+(?:IF\s+EXISTS\s+)?(?P<n>[\w".]+)"#).unwrap()
});
static CREATE_TYPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^CREATE\s+TYPE\s+(?P<n>[\w".]+)"#).unwrap());
static INSERT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^INSERT\s+INTO\s+(?P<t>[\w".]+)"#).unwrap());
static UPDATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^UPDATE\s+(?:ONLY\s+)?(?P<t>[\w".]+)\s+SET\b"#).unwrap());
static DELETE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^DELETE\s+FROM\s+(?:ONLY\s+)?(?P<t>[\w".]+)"#).unwrap());
static WHERE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bWHERE\b").unwrap());
static OTHER_DDL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(CREATE|DROP|GRANT|REVOKE|TRUNCATE)\b").unwrap());

static ADD_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bADD\s+COLUMN\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<c>[\w"]+)"#).unwrap()
});
static DROP_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bDROP\s+COLUMN\s+(?:IF\s+EXISTS\s+)?(?P<c>[\w"]+)"#).unwrap()
});
static RENAME_COLUMN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bRENAME\s+COLUMN\s+(?P<a>[\w"]+)\s+TO\s+(?P<b>[\w"]+)"#).unwrap()
});
static RENAME_TO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bRENAME\s+TO\s+(?P<b>[\w"]+)"#).unwrap());
static ADD_CONSTRAINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bADD\s+CONSTRAINT\s+(?P<n>[\w"]+)"#).unwrap());
static DROP_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bDROP\s+CONSTRAINT\s+(?:IF\s+EXISTS\s+)?(?P<n>[\w"]+)"#).unwrap()
});
static ALTER_COLUMN_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bALTER\s+COLUMN\s+(?P<c>[\w"]+)\s+(?:SET\s+DATA\s+)?TYPE\b"#).unwrap()
});
static SET_NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bALTER\s+COLUMN\s+(?P<c>[\w"]+)\s+SET\s+NOT\s+NULL\b"#).unwrap()
});
static DROP_NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bALTER\s+COLUMN\s+(?P<c>[\w"]+)\s+DROP\s+NOT\s+NULL\b"#).unwrap()
});
static SET_DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bALTER\s+COLUMN\s+(?P<c>[\w"]+)\s+SET\s+DEFAULT\b"#).unwrap()
});
static DROP_DEFAULT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bALTER\s+COLUMN\s+(?P<c>[\w"]+)\s+DROP\s+DEFAULT\b"#).unwrap()
});
static ENABLE_RLS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bENABLE\s+ROW\s+LEVEL\s+SECURITY\b").unwrap());

/// Analyze a SQL script without executing it.
pub fn analyze_dry_run(sql: &str) -> DryRunReport {
    let mut operations = Vec::new();
    let mut tables_created = Vec::new();
    let mut tables_dropped = Vec::new();
    let mut tables_modified = Vec::new();
    let mut indexes_created = Vec::new();
    let mut indexes_dropped = Vec::new();
    let mut data_modifications = 0usize;

    for (text, line) in scan_statements(sql) {
        let Some(op) = classify_statement(&text, line) else {
            continue;
        };

        match op.op {
            OperationType::CreateTable => push_unique(&mut tables_created, &op.target),
            OperationType::DropTable => push_unique(&mut tables_dropped, &op.target),
            OperationType::AlterTable => push_unique(&mut tables_modified, &op.target),
            OperationType::CreateIndex => push_unique(&mut indexes_created, &op.target),
            OperationType::DropIndex => push_unique(&mut indexes_dropped, &op.target),
            OperationType::Insert | OperationType::Update | OperationType::Delete => {
                data_modifications += 1;
            }
            _ => {}
        }

        operations.push(op);
    }

    let is_fully_reversible = operations.iter().all(|op| op.reversible);
    let estimated_risk = estimate_risk(&operations, &tables_dropped);

    debug!(
        operations = operations.len(),
        risk = ?estimated_risk,
        "dry run analysis complete"
    );

    DryRunReport {
        operations,
        tables_created,
        tables_dropped,
        tables_modified,
        indexes_created,
        indexes_dropped,
        data_modifications,
        is_fully_reversible,
        estimated_risk,
    }
}

/// Line-aware statement scanner. Strips `--` comments (outside string
/// literals) while accumulating; `;` terminates a statement only outside a
/// literal, and `''` continues a literal.
fn scan_statements(sql: &str) -> Vec<(String, usize)> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut start_line = 1usize;
    let mut has_content = false;
    let mut in_string = false;

    for (idx, raw_line) in sql.lines().enumerate() {
        let line_no = idx + 1;
        let mut chars = raw_line.chars().peekable();

        while let Some(ch) = chars.next() {
            if in_string {
                if ch == '\'' {
                    if chars.peek() == Some(&'\'') {
                        current.push_str("''");
                        chars.next();
                        continue;
                    }
                    in_string = false;
                }
                current.push(ch);
                continue;
            }

            match ch {
                '-' if chars.peek() == Some(&'-') => break, // comment to end of line
                '\'' => {
                    in_string = true;
                    if !has_content {
                        has_content = true;
                        start_line = line_no;
                    }
                    current.push(ch);
                }
                ';' => {
                    let text = current.trim();
                    if !text.is_empty() {
                        statements.push((text.to_string(), start_line));
                    }
                    current.clear();
                    has_content = false;
                }
                _ => {
                    if !has_content && !ch.is_whitespace() {
                        has_content = true;
                        start_line = line_no;
                    }
                    current.push(ch);
                }
            }
        }
        current.push('\n');
    }

    let text = current.trim();
    if !text.is_empty() {
        statements.push((text.to_string(), start_line));
    }

    statements
}

fn classify_statement(text: &str, line: usize) -> Option<DryRunOperation> {
    if let Some(caps) = CREATE_TABLE_RE.captures(text) {
        return Some(operation(
            OperationType::CreateTable,
            &caps["t"],
            "new table".to_string(),
            line,
        ));
    }
    if let Some(caps) = DROP_TABLE_RE.captures(text) {
        return Some(operation(
            OperationType::DropTable,
            &caps["t"],
            "table and all rows removed".to_string(),
            line,
        ));
    }
    if let Some(caps) = CREATE_INDEX_RE.captures(text) {
        let detail = caps
            .name("t")
            .map(|t| format!("ON {}", normalize_ident(t.as_str())))
            .unwrap_or_default();
        return Some(operation(OperationType::CreateIndex, &caps["n"], detail, line));
    }
    if let Some(caps) = DROP_INDEX_RE.captures(text) {
        return Some(operation(
            OperationType::DropIndex,
            &caps["n"],
            "index removed".to_string(),
            line,
        ));
    }
    if let Some(caps) = CREATE_VIEW_RE.captures(text) {
        return Some(operation(OperationType::CreateView, &caps["n"], "new view".to_string(), line));
    }
    if let Some(caps) = DROP_VIEW_RE.captures(text) {
        return Some(operation(
            OperationType::DropView,
            &caps["n"],
            "view removed".to_string(),
            line,
        ));
    }
    if let Some(caps) = CREATE_TYPE_RE.captures(text) {
        return Some(operation(OperationType::CreateType, &caps["n"], "new type".to_string(), line));
    }
    if let Some(caps) = ALTER_TABLE_RE.captures(text) {
        let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or("");
        return Some(operation(
            OperationType::AlterTable,
            &caps["t"],
            alter_detail(rest),
            line,
        ));
    }
    if let Some(caps) = INSERT_RE.captures(text) {
        return Some(operation(OperationType::Insert, &caps["t"], "row insertion".to_string(), line));
    }
    if let Some(caps) = UPDATE_RE.captures(text) {
        let detail = if WHERE_RE.is_match(text) {
            "UPDATE with WHERE clause".to_string()
        } else {
            "UPDATE without WHERE clause".to_string()
        };
        return Some(operation(OperationType::Update, &caps["t"], detail, line));
    }
    if let Some(caps) = DELETE_RE.captures(text) {
        let detail = if WHERE_RE.is_match(text) {
            "DELETE with WHERE clause".to_string()
        } else {
            "DELETE without WHERE clause".to_string()
        };
        return Some(operation(OperationType::Delete, &caps["t"], detail, line));
    }
    if let Some(caps) = OTHER_DDL_RE.captures(text) {
        let verb = caps
            .get(1)
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_default();
        let preview: String = text.chars().take(80).collect();
        return Some(operation(OperationType::Other, &verb, preview, line));
    }

    // Anything else (SELECT, SET, BEGIN, ...) carries no schema effect worth
    // reporting
    None
}

/// Sub-detail text for an ALTER TABLE statement body.
fn alter_detail(rest: &str) -> String {
    if let Some(caps) = ADD_COLUMN_RE.captures(rest) {
        return format!("ADD COLUMN {}", normalize_ident(&caps["c"]));
    }
    if let Some(caps) = DROP_COLUMN_RE.captures(rest) {
        return format!("DROP COLUMN {}", normalize_ident(&caps["c"]));
    }
    if let Some(caps) = RENAME_COLUMN_RE.captures(rest) {
        return format!(
            "RENAME COLUMN {} TO {}",
            normalize_ident(&caps["a"]),
            normalize_ident(&caps["b"])
        );
    }
    if let Some(caps) = RENAME_TO_RE.captures(rest) {
        return format!("RENAME TABLE TO {}", normalize_ident(&caps["b"]));
    }
    if let Some(caps) = ADD_CONSTRAINT_RE.captures(rest) {
        return format!("ADD CONSTRAINT {}", normalize_ident(&caps["n"]));
    }
    if let Some(caps) = DROP_CONSTRAINT_RE.captures(rest) {
        return format!("DROP CONSTRAINT {}", normalize_ident(&caps["n"]));
    }
    if let Some(caps) = ALTER_COLUMN_TYPE_RE.captures(rest) {
        return format!("ALTER COLUMN {} TYPE", normalize_ident(&caps["c"]));
    }
    if let Some(caps) = SET_NOT_NULL_RE.captures(rest) {
        return format!("ALTER COLUMN {} SET NOT NULL", normalize_ident(&caps["c"]));
    }
    if let Some(caps) = DROP_NOT_NULL_RE.captures(rest) {
        return format!("ALTER COLUMN {} DROP NOT NULL", normalize_ident(&caps["c"]));
    }
    if let Some(caps) = SET_DEFAULT_RE.captures(rest) {
        return format!("ALTER COLUMN {} SET DEFAULT", normalize_ident(&caps["c"]));
    }
    if let Some(caps) = DROP_DEFAULT_RE.captures(rest) {
        return format!("ALTER COLUMN {} DROP DEFAULT", normalize_ident(&caps["c"]));
    }
    if ENABLE_RLS_RE.is_match(rest) {
        return "ENABLE ROW LEVEL SECURITY".to_string();
    }
    "table alteration".to_string()
}

fn operation(op: OperationType, target: &str, detail: String, line: usize) -> DryRunOperation {
    DryRunOperation {
        op,
        target: normalize_ident(target),
        detail,
        line,
        reversible: is_reversible(op),
    }
}

/// Only creations of brand-new objects can be undone without external
/// knowledge; everything destructive or semantically lossy is flagged.
fn is_reversible(op: OperationType) -> bool {
    matches!(
        op,
        OperationType::CreateTable
            | OperationType::CreateIndex
            | OperationType::CreateView
            | OperationType::CreateType
    )
}

fn estimate_risk(operations: &[DryRunOperation], tables_dropped: &[String]) -> RiskLevel {
    if !tables_dropped.is_empty() {
        return RiskLevel::Critical;
    }
    if operations
        .iter()
        .any(|op| matches!(op.op, OperationType::Update | OperationType::Delete))
    {
        return RiskLevel::High;
    }
    if operations.iter().any(|op| !op.reversible) {
        return RiskLevel::Medium;
    }
    RiskLevel::Low
}

fn normalize_ident(raw: &str) -> String {
    raw.split('.')
        .map(|part| part.trim_matches('"').to_lowercase())
        .collect::<Vec<_>>()
        .join(".")
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drop_table_is_critical_and_irreversible() {
        let report = analyze_dry_run("DROP TABLE x;");
        assert_eq!(report.estimated_risk, RiskLevel::Critical);
        assert_eq!(report.operations.len(), 1);
        assert!(!report.operations[0].reversible);
        assert_eq!(report.tables_dropped, vec!["x"]);
        assert!(!report.is_fully_reversible);
    }

    #[test]
    fn pure_creations_are_fully_reversible_and_low_risk() {
        let report = analyze_dry_run(
            "CREATE TABLE t (id int);\nCREATE INDEX idx_t_id ON t (id);",
        );
        assert!(report.is_fully_reversible);
        assert_eq!(report.estimated_risk, RiskLevel::Low);
        assert_eq!(report.tables_created, vec!["t"]);
        assert_eq!(report.indexes_created, vec!["idx_t_id"]);
    }

    #[test]
    fn dml_raises_risk_to_high() {
        let report = analyze_dry_run("CREATE TABLE t (id int);\nUPDATE t SET id = 1;");
        assert_eq!(report.estimated_risk, RiskLevel::High);
        assert_eq!(report.data_modifications, 1);
    }

    #[test]
    fn alter_without_drop_is_medium() {
        let report = analyze_dry_run("ALTER TABLE t ADD COLUMN x int;");
        assert_eq!(report.estimated_risk, RiskLevel::Medium);
        assert_eq!(report.tables_modified, vec!["t"]);
        assert_eq!(report.operations[0].detail, "ADD COLUMN x");
    }

    #[test]
    fn update_without_where_is_flagged_in_detail() {
        let report = analyze_dry_run("UPDATE users SET active = false;");
        assert_eq!(report.operations[0].detail, "UPDATE without WHERE clause");

        let report = analyze_dry_run("DELETE FROM users WHERE id = 1;");
        assert_eq!(report.operations[0].detail, "DELETE with WHERE clause");
    }

    #[test]
    fn alter_sub_details_cover_constraints_and_defaults() {
        let report = analyze_dry_run(
            "ALTER TABLE t ADD CONSTRAINT ck CHECK (x > 0);\n\
             ALTER TABLE t ALTER COLUMN x SET DEFAULT 0;\n\
             ALTER TABLE t ALTER COLUMN x TYPE bigint;\n\
             ALTER TABLE t ENABLE ROW LEVEL SECURITY;",
        );
        let details: Vec<&str> = report.operations.iter().map(|o| o.detail.as_str()).collect();
        assert_eq!(
            details,
            vec![
                "ADD CONSTRAINT ck",
                "ALTER COLUMN x SET DEFAULT",
                "ALTER COLUMN x TYPE",
                "ENABLE ROW LEVEL SECURITY",
            ]
        );
        // Repeated ALTERs on one table collapse in the modified set
        assert_eq!(report.tables_modified, vec!["t"]);
    }

    #[test]
    fn recognized_ddl_verbs_fall_back_to_other() {
        let report = analyze_dry_run("TRUNCATE audit_log;\nGRANT ALL ON users TO admin;");
        assert_eq!(report.operations.len(), 2);
        assert!(report.operations.iter().all(|o| o.op == OperationType::Other));
        assert_eq!(report.operations[0].target, "truncate");
    }

    #[test]
    fn unrecognized_statements_produce_no_record() {
        let report = analyze_dry_run("SELECT * FROM users;\nSET search_path TO public;");
        assert!(report.operations.is_empty());
        assert_eq!(report.estimated_risk, RiskLevel::Low);
        assert!(report.is_fully_reversible);
    }

    #[test]
    fn comments_are_stripped_and_lines_tracked() {
        let sql = "-- preamble\nCREATE TABLE a (id int);\n-- DROP TABLE b\nDROP VIEW v;";
        let report = analyze_dry_run(sql);
        assert_eq!(report.operations.len(), 2);
        assert_eq!(report.operations[0].line, 2);
        assert_eq!(report.operations[1].op, OperationType::DropView);
        assert_eq!(report.operations[1].line, 4);
        assert!(report.tables_dropped.is_empty());
    }

    #[test]
    fn semicolons_inside_strings_do_not_split() {
        let report = analyze_dry_run("INSERT INTO t (v) VALUES ('a;b');");
        assert_eq!(report.operations.len(), 1);
        assert_eq!(report.operations[0].op, OperationType::Insert);
        assert_eq!(report.data_modifications, 1);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = analyze_dry_run("");
        assert!(report.operations.is_empty());
        assert_eq!(report.estimated_risk, RiskLevel::Low);
        assert!(report.is_fully_reversible);
        assert_eq!(report.data_modifications, 0);
    }
}
