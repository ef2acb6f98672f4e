//! SQL Lint Module
//!
//! Static risk analysis for migration SQL. This module provides:
//! - A fixed, ordered rule table ("what could go wrong with this DDL?")
//! - Typed lint issues with severity, line number and remediation advice
//! - An overall risk verdict per SQL body (max severity over all findings)

pub mod rules;

pub use rules::{
    analyze_sql, LintIssue, LintRule, RiskLevel, RuleCategory, SqlAnalysis, SqlLinter,
};
