//! Lint rules engine
//!
//! Guardrails for migration SQL: every rule inspects the normalized SQL text
//! (comments blanked, string literal bodies replaced) and raises at most one
//! issue per analysis, so a script dropping five tables still produces a
//! single `drop-table` finding.

use crate::splitter::normalize_sql;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Risk severity levels, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

/// Categories for grouping lint rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    DataLoss,
    Performance,
    Security,
    Compatibility,
    BestPractice,
}

/// A lint finding raised by one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintIssue {
    pub rule: String,
    pub severity: RiskLevel,
    pub message: String,
    /// 1-based line of the first match, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub suggestion: String,
}

/// A lint rule definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintRule {
    pub id: String,
    pub name: String,
    pub severity: RiskLevel,
    pub category: RuleCategory,
    pub enabled: bool,
}

/// Result of analyzing one SQL body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlAnalysis {
    /// Highest severity among all findings, `low` if nothing fired
    pub overall_risk: RiskLevel,
    pub issues: Vec<LintIssue>,
}

type RuleCheck = fn(&str) -> Option<LintIssue>;

/// Ordered rule table. Evaluation order is fixed; each entry fires at most
/// once per analysis.
const CHECKS: &[(&str, RuleCheck)] = &[
    ("drop-table", check_drop_table),
    ("drop-column", check_drop_column),
    ("drop-database", check_drop_database),
    ("truncate", check_truncate),
    ("add-column-not-null", check_add_column_not_null),
    ("alter-column-type", check_alter_column_type),
    ("rename-column", check_rename_column),
    ("rename-table", check_rename_table),
    ("index-not-concurrent", check_index_not_concurrent),
    ("constraint-not-valid", check_constraint_not_valid),
    ("update-without-where", check_update_without_where),
    ("delete-without-where", check_delete_without_where),
    ("grant-all", check_grant_all),
    ("create-table-no-if-not-exists", check_create_table_no_if_not_exists),
    ("drop-without-if-exists", check_drop_without_if_exists),
];

/// The lint engine holding the configurable rule table.
pub struct SqlLinter {
    rules: Vec<LintRule>,
}

impl SqlLinter {
    /// Create a linter with the default rule set, all rules enabled.
    pub fn new() -> Self {
        Self {
            rules: Self::default_rules(),
        }
    }

    /// Get all configured rules
    pub fn list_rules(&self) -> &[LintRule] {
        &self.rules
    }

    /// Disable a rule by id. Unknown ids are ignored.
    pub fn disable(&mut self, id: &str) {
        if let Some(rule) = self.rules.iter_mut().find(|r| r.id == id) {
            rule.enabled = false;
        }
    }

    /// Analyze a SQL body against every enabled rule, in fixed order.
    pub fn analyze(&self, sql: &str) -> SqlAnalysis {
        let normalized = normalize_sql(sql);
        let mut issues = Vec::new();

        for (id, check) in CHECKS {
            if !self.is_enabled(id) {
                continue;
            }
            if let Some(issue) = check(&normalized) {
                issues.push(issue);
            }
        }

        let overall_risk = issues
            .iter()
            .map(|i| i.severity)
            .max()
            .unwrap_or(RiskLevel::Low);

        debug!(issues = issues.len(), risk = ?overall_risk, "sql lint complete");

        SqlAnalysis {
            overall_risk,
            issues,
        }
    }

    fn is_enabled(&self, id: &str) -> bool {
        self.rules
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.enabled)
            .unwrap_or(true)
    }

    fn default_rules() -> Vec<LintRule> {
        vec![
            LintRule {
                id: "drop-table".to_string(),
                name: "Table Drop".to_string(),
                severity: RiskLevel::Critical,
                category: RuleCategory::DataLoss,
                enabled: true,
            },
            LintRule {
                id: "drop-column".to_string(),
                name: "Column Drop".to_string(),
                severity: RiskLevel::Critical,
                category: RuleCategory::DataLoss,
                enabled: true,
            },
            LintRule {
                id: "drop-database".to_string(),
                name: "Database Drop".to_string(),
                severity: RiskLevel::Critical,
                category: RuleCategory::DataLoss,
                enabled: true,
            },
            LintRule {
                id: "truncate".to_string(),
                name: "Table Truncation".to_string(),
                severity: RiskLevel::Critical,
                category: RuleCategory::DataLoss,
                enabled: true,
            },
            LintRule {
                id: "add-column-not-null".to_string(),
                name: "NOT NULL Column Without Default".to_string(),
                severity: RiskLevel::High,
                category: RuleCategory::Compatibility,
                enabled: true,
            },
            LintRule {
                id: "alter-column-type".to_string(),
                name: "Column Type Change".to_string(),
                severity: RiskLevel::High,
                category: RuleCategory::Compatibility,
                enabled: true,
            },
            LintRule {
                id: "rename-column".to_string(),
                name: "Column Rename".to_string(),
                severity: RiskLevel::High,
                category: RuleCategory::Compatibility,
                enabled: true,
            },
            LintRule {
                id: "rename-table".to_string(),
                name: "Table Rename".to_string(),
                severity: RiskLevel::High,
                category: RuleCategory::Compatibility,
                enabled: true,
            },
            LintRule {
                id: "index-not-concurrent".to_string(),
                name: "Blocking Index Build".to_string(),
                severity: RiskLevel::Medium,
                category: RuleCategory::Performance,
                enabled: true,
            },
            LintRule {
                id: "constraint-not-valid".to_string(),
                name: "Constraint Validation Scan".to_string(),
                severity: RiskLevel::Medium,
                category: RuleCategory::Performance,
                enabled: true,
            },
            LintRule {
                id: "update-without-where".to_string(),
                name: "Unbounded UPDATE".to_string(),
                severity: RiskLevel::Medium,
                category: RuleCategory::DataLoss,
                enabled: true,
            },
            LintRule {
                id: "delete-without-where".to_string(),
                name: "Unbounded DELETE".to_string(),
                severity: RiskLevel::Medium,
                category: RuleCategory::DataLoss,
                enabled: true,
            },
            LintRule {
                id: "grant-all".to_string(),
                name: "Broad Privilege Grant".to_string(),
                severity: RiskLevel::Medium,
                category: RuleCategory::Security,
                enabled: true,
            },
            LintRule {
                id: "create-table-no-if-not-exists".to_string(),
                name: "CREATE TABLE Without IF NOT EXISTS".to_string(),
                severity: RiskLevel::Low,
                category: RuleCategory::BestPractice,
                enabled: true,
            },
            LintRule {
                id: "drop-without-if-exists".to_string(),
                name: "DROP Without IF EXISTS".to_string(),
                severity: RiskLevel::Low,
                category: RuleCategory::BestPractice,
                enabled: true,
            },
        ]
    }
}

impl Default for SqlLinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyze SQL with the default rule set.
pub fn analyze_sql(sql: &str) -> SqlAnalysis {
    SqlLinter::new().analyze(sql)
}

/// 1-based line number of a byte offset in `text`.
fn line_of(text: &str, offset: usize) -> Option<usize> {
    Some(text[..offset].matches('\n').count() + 1)
}

static DROP_TABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bDROP\s+TABLE\b").unwrap());
static DROP_COLUMN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bDROP\s+COLUMN\b").unwrap());
static DROP_DATABASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bDROP\s+DATABASE\b").unwrap());
static TRUNCATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bTRUNCATE\b").unwrap());
static ADD_COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bADD\s+COLUMN\b[^;]*").unwrap());
static NOT_NULL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bNOT\s+NULL\b").unwrap());
static DEFAULT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bDEFAULT\b").unwrap());
static ALTER_TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bALTER\s+COLUMN\s+\S+\s+(?:SET\s+DATA\s+)?TYPE\b").unwrap()
});
static RENAME_COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bRENAME\s+COLUMN\b").unwrap());
static RENAME_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bALTER\s+TABLE\s+[^;]*?\bRENAME\s+TO\b").unwrap());
static CREATE_INDEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bCREATE\s+(?:UNIQUE\s+)?INDEX\b[^;]*").unwrap());
static CONCURRENTLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bCONCURRENTLY\b").unwrap());
static ADD_CONSTRAINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bADD\s+CONSTRAINT\b[^;]*").unwrap());
static FK_OR_CHECK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bFOREIGN\s+KEY\b|\bCHECK\b").unwrap());
static NOT_VALID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bNOT\s+VALID\b").unwrap());
static UPDATE_SET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bUPDATE\s+\S+\s+SET\b[^;]*").unwrap());
static DELETE_FROM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bDELETE\s+FROM\b[^;]*").unwrap());
static WHERE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bWHERE\b").unwrap());
static GRANT_ALL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bGRANT\s+ALL\b").unwrap());
static CREATE_TABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bCREATE\s+TABLE\s+(IF\s+NOT\s+EXISTS\b)?").unwrap());
static DROP_OBJECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bDROP\s+(?:TABLE|INDEX|VIEW|SEQUENCE|TYPE|FUNCTION)\s+(IF\s+EXISTS\b)?")
        .unwrap()
});

fn check_drop_table(sql: &str) -> Option<LintIssue> {
    let m = DROP_TABLE_RE.find(sql)?;
    Some(LintIssue {
        rule: "drop-table".to_string(),
        severity: RiskLevel::Critical,
        message: "DROP TABLE permanently deletes the table and all of its data".to_string(),
        line: line_of(sql, m.start()),
        suggestion: "Back up the table first and confirm nothing still references it".to_string(),
    })
}

fn check_drop_column(sql: &str) -> Option<LintIssue> {
    let m = DROP_COLUMN_RE.find(sql)?;
    Some(LintIssue {
        rule: "drop-column".to_string(),
        severity: RiskLevel::Critical,
        message: "DROP COLUMN permanently deletes the column's data".to_string(),
        line: line_of(sql, m.start()),
        suggestion: "Consider deprecating the column first and dropping it in a later release"
            .to_string(),
    })
}

fn check_drop_database(sql: &str) -> Option<LintIssue> {
    let m = DROP_DATABASE_RE.find(sql)?;
    Some(LintIssue {
        rule: "drop-database".to_string(),
        severity: RiskLevel::Critical,
        message: "DROP DATABASE destroys the entire database".to_string(),
        line: line_of(sql, m.start()),
        suggestion: "Database drops do not belong in migrations; run them manually if truly intended"
            .to_string(),
    })
}

fn check_truncate(sql: &str) -> Option<LintIssue> {
    let m = TRUNCATE_RE.find(sql)?;
    Some(LintIssue {
        rule: "truncate".to_string(),
        severity: RiskLevel::Critical,
        message: "TRUNCATE removes all rows and cannot be rolled back with data intact".to_string(),
        line: line_of(sql, m.start()),
        suggestion: "Use DELETE with a WHERE clause, or archive the data before truncating"
            .to_string(),
    })
}

fn check_add_column_not_null(sql: &str) -> Option<LintIssue> {
    for m in ADD_COLUMN_RE.find_iter(sql) {
        let stmt = m.as_str();
        if NOT_NULL_RE.is_match(stmt) && !DEFAULT_RE.is_match(stmt) {
            return Some(LintIssue {
                rule: "add-column-not-null".to_string(),
                severity: RiskLevel::High,
                message: "Adding a NOT NULL column without a DEFAULT fails on non-empty tables"
                    .to_string(),
                line: line_of(sql, m.start()),
                suggestion: "Add a DEFAULT clause, or add the column as nullable and backfill"
                    .to_string(),
            });
        }
    }
    None
}

fn check_alter_column_type(sql: &str) -> Option<LintIssue> {
    let m = ALTER_TYPE_RE.find(sql)?;
    Some(LintIssue {
        rule: "alter-column-type".to_string(),
        severity: RiskLevel::High,
        message: "Changing a column type rewrites the table and can break dependent code"
            .to_string(),
        line: line_of(sql, m.start()),
        suggestion: "Add a new column, migrate the data, then drop the old column".to_string(),
    })
}

fn check_rename_column(sql: &str) -> Option<LintIssue> {
    let m = RENAME_COLUMN_RE.find(sql)?;
    Some(LintIssue {
        rule: "rename-column".to_string(),
        severity: RiskLevel::High,
        message: "Renaming a column breaks queries that still use the old name".to_string(),
        line: line_of(sql, m.start()),
        suggestion: "Deploy code reading both names before renaming, or use a view alias"
            .to_string(),
    })
}

fn check_rename_table(sql: &str) -> Option<LintIssue> {
    let m = RENAME_TABLE_RE.find(sql)?;
    Some(LintIssue {
        rule: "rename-table".to_string(),
        severity: RiskLevel::High,
        message: "Renaming a table breaks queries that still use the old name".to_string(),
        line: line_of(sql, m.start()),
        suggestion: "Create a view with the old name for backward compatibility".to_string(),
    })
}

fn check_index_not_concurrent(sql: &str) -> Option<LintIssue> {
    for m in CREATE_INDEX_RE.find_iter(sql) {
        if !CONCURRENTLY_RE.is_match(m.as_str()) {
            return Some(LintIssue {
                rule: "index-not-concurrent".to_string(),
                severity: RiskLevel::Medium,
                message: "CREATE INDEX without CONCURRENTLY blocks writes while building"
                    .to_string(),
                line: line_of(sql, m.start()),
                suggestion: "Use CREATE INDEX CONCURRENTLY (outside a transaction)".to_string(),
            });
        }
    }
    None
}

fn check_constraint_not_valid(sql: &str) -> Option<LintIssue> {
    for m in ADD_CONSTRAINT_RE.find_iter(sql) {
        let stmt = m.as_str();
        if FK_OR_CHECK_RE.is_match(stmt) && !NOT_VALID_RE.is_match(stmt) {
            return Some(LintIssue {
                rule: "constraint-not-valid".to_string(),
                severity: RiskLevel::Medium,
                message: "Adding a FOREIGN KEY or CHECK constraint scans and locks the table"
                    .to_string(),
                line: line_of(sql, m.start()),
                suggestion: "Add the constraint NOT VALID, then VALIDATE CONSTRAINT separately"
                    .to_string(),
            });
        }
    }
    None
}

fn check_update_without_where(sql: &str) -> Option<LintIssue> {
    for m in UPDATE_SET_RE.find_iter(sql) {
        if !WHERE_RE.is_match(m.as_str()) {
            return Some(LintIssue {
                rule: "update-without-where".to_string(),
                severity: RiskLevel::Medium,
                message: "UPDATE without a WHERE clause rewrites every row".to_string(),
                line: line_of(sql, m.start()),
                suggestion: "Add a WHERE clause, or batch the update to limit lock time"
                    .to_string(),
            });
        }
    }
    None
}

fn check_delete_without_where(sql: &str) -> Option<LintIssue> {
    for m in DELETE_FROM_RE.find_iter(sql) {
        if !WHERE_RE.is_match(m.as_str()) {
            return Some(LintIssue {
                rule: "delete-without-where".to_string(),
                severity: RiskLevel::Medium,
                message: "DELETE without a WHERE clause removes every row".to_string(),
                line: line_of(sql, m.start()),
                suggestion: "Add a WHERE clause, or use TRUNCATE deliberately with a backup"
                    .to_string(),
            });
        }
    }
    None
}

fn check_grant_all(sql: &str) -> Option<LintIssue> {
    let m = GRANT_ALL_RE.find(sql)?;
    Some(LintIssue {
        rule: "grant-all".to_string(),
        severity: RiskLevel::Medium,
        message: "GRANT ALL gives broader privileges than most roles need".to_string(),
        line: line_of(sql, m.start()),
        suggestion: "Grant only the specific privileges the role requires".to_string(),
    })
}

fn check_create_table_no_if_not_exists(sql: &str) -> Option<LintIssue> {
    for caps in CREATE_TABLE_RE.captures_iter(sql) {
        if caps.get(1).is_none() {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            return Some(LintIssue {
                rule: "create-table-no-if-not-exists".to_string(),
                severity: RiskLevel::Low,
                message: "CREATE TABLE fails if the table already exists".to_string(),
                line: line_of(sql, start),
                suggestion: "Use CREATE TABLE IF NOT EXISTS for re-runnable migrations"
                    .to_string(),
            });
        }
    }
    None
}

fn check_drop_without_if_exists(sql: &str) -> Option<LintIssue> {
    for caps in DROP_OBJECT_RE.captures_iter(sql) {
        if caps.get(1).is_none() {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            return Some(LintIssue {
                rule: "drop-without-if-exists".to_string(),
                severity: RiskLevel::Low,
                message: "DROP fails if the object does not exist".to_string(),
                line: line_of(sql, start),
                suggestion: "Use IF EXISTS for re-runnable migrations".to_string(),
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drop_table_is_critical_on_line_one() {
        let analysis = analyze_sql("DROP TABLE foo;");
        assert_eq!(analysis.overall_risk, RiskLevel::Critical);
        let issue = analysis
            .issues
            .iter()
            .find(|i| i.rule == "drop-table")
            .expect("drop-table should fire");
        assert_eq!(issue.line, Some(1));
    }

    #[test]
    fn empty_input_is_low_with_no_issues() {
        let analysis = analyze_sql("");
        assert_eq!(analysis.overall_risk, RiskLevel::Low);
        assert!(analysis.issues.is_empty());
    }

    #[test]
    fn rules_fire_at_most_once() {
        let analysis = analyze_sql("DROP TABLE a;\nDROP TABLE b;\nDROP TABLE c;");
        let count = analysis.issues.iter().filter(|i| i.rule == "drop-table").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn keywords_inside_strings_and_comments_do_not_fire() {
        let sql = "-- DROP TABLE in a comment\nINSERT INTO log (msg) VALUES ('TRUNCATE soon') ";
        let analysis = analyze_sql(sql);
        assert!(analysis.issues.iter().all(|i| i.rule != "drop-table"));
        assert!(analysis.issues.iter().all(|i| i.rule != "truncate"));
    }

    #[test]
    fn add_not_null_without_default_is_high() {
        let analysis = analyze_sql("ALTER TABLE users ADD COLUMN age int NOT NULL;");
        assert_eq!(analysis.overall_risk, RiskLevel::High);
        assert!(analysis.issues.iter().any(|i| i.rule == "add-column-not-null"));
    }

    #[test]
    fn add_not_null_with_default_passes() {
        let analysis = analyze_sql("ALTER TABLE users ADD COLUMN age int NOT NULL DEFAULT 0;");
        assert!(analysis.issues.iter().all(|i| i.rule != "add-column-not-null"));
    }

    #[test]
    fn not_null_check_scans_past_a_safe_statement() {
        let sql = "ALTER TABLE a ADD COLUMN x int NOT NULL DEFAULT 1;\n\
                   ALTER TABLE b ADD COLUMN y int NOT NULL;";
        let analysis = analyze_sql(sql);
        let issue = analysis
            .issues
            .iter()
            .find(|i| i.rule == "add-column-not-null")
            .expect("second ADD COLUMN should fire");
        assert_eq!(issue.line, Some(2));
    }

    #[test]
    fn non_concurrent_index_is_medium() {
        let analysis = analyze_sql("CREATE UNIQUE INDEX idx_users_email ON users (email);");
        assert!(analysis.issues.iter().any(|i| i.rule == "index-not-concurrent"));
        assert_eq!(analysis.overall_risk, RiskLevel::Medium);
    }

    #[test]
    fn concurrent_index_passes() {
        let analysis = analyze_sql("CREATE INDEX CONCURRENTLY idx_a ON users (email);");
        assert!(analysis.issues.iter().all(|i| i.rule != "index-not-concurrent"));
    }

    #[test]
    fn foreign_key_without_not_valid_is_flagged() {
        let sql = "ALTER TABLE orders ADD CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users (id);";
        let analysis = analyze_sql(sql);
        assert!(analysis.issues.iter().any(|i| i.rule == "constraint-not-valid"));
    }

    #[test]
    fn not_valid_constraint_passes() {
        let sql = "ALTER TABLE orders ADD CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users (id) NOT VALID;";
        let analysis = analyze_sql(sql);
        assert!(analysis.issues.iter().all(|i| i.rule != "constraint-not-valid"));
    }

    #[test]
    fn unbounded_update_and_delete_fire() {
        let analysis = analyze_sql("UPDATE users SET active = false;\nDELETE FROM sessions;");
        assert!(analysis.issues.iter().any(|i| i.rule == "update-without-where"));
        assert!(analysis.issues.iter().any(|i| i.rule == "delete-without-where"));
    }

    #[test]
    fn bounded_update_passes() {
        let analysis = analyze_sql("UPDATE users SET active = false WHERE id = 7;");
        assert!(analysis.issues.iter().all(|i| i.rule != "update-without-where"));
    }

    #[test]
    fn rename_rules_are_high() {
        let analysis =
            analyze_sql("ALTER TABLE users RENAME COLUMN name TO full_name;");
        assert!(analysis.issues.iter().any(|i| i.rule == "rename-column"));

        let analysis = analyze_sql("ALTER TABLE users RENAME TO accounts;");
        let issue = analysis
            .issues
            .iter()
            .find(|i| i.rule == "rename-table")
            .expect("rename-table should fire");
        assert_eq!(issue.severity, RiskLevel::High);
    }

    #[test]
    fn create_table_without_guard_is_low() {
        let analysis = analyze_sql("CREATE TABLE users (id serial);");
        assert!(analysis
            .issues
            .iter()
            .any(|i| i.rule == "create-table-no-if-not-exists"));
    }

    #[test]
    fn guarded_statements_skip_low_rules() {
        let analysis =
            analyze_sql("CREATE TABLE IF NOT EXISTS users (id serial);\nDROP VIEW IF EXISTS v;");
        assert!(analysis
            .issues
            .iter()
            .all(|i| i.rule != "create-table-no-if-not-exists"));
        assert!(analysis.issues.iter().all(|i| i.rule != "drop-without-if-exists"));
    }

    #[test]
    fn disabled_rule_is_skipped() {
        let mut linter = SqlLinter::new();
        linter.disable("drop-table");
        let analysis = linter.analyze("DROP TABLE foo;");
        assert!(analysis.issues.iter().all(|i| i.rule != "drop-table"));
        // The IF EXISTS best-practice rule still fires
        assert!(analysis.issues.iter().any(|i| i.rule == "drop-without-if-exists"));
    }

    #[test]
    fn overall_risk_is_max_severity() {
        let sql = "CREATE TABLE t (id int);\nUPDATE t SET id = 1;";
        let analysis = analyze_sql(sql);
        assert_eq!(analysis.overall_risk, RiskLevel::Medium);
    }

    #[test]
    fn garbage_input_yields_empty_result() {
        let analysis = analyze_sql("not sql at all ~~ 12345 ((((");
        assert_eq!(analysis.overall_risk, RiskLevel::Low);
        assert!(analysis.issues.is_empty());
    }
}
