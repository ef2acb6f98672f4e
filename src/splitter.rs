//! SQL statement splitter
//!
//! Turns a raw SQL blob into an ordered list of individual statements with
//! their 1-based starting line numbers. The scanner is string-aware: a `;`
//! inside a single-quoted literal does not terminate a statement, and the
//! doubled-quote escape (`''`) continues the literal instead of closing it.
//!
//! Known limitation: dollar-quoted blocks ($$ ... $$) and parenthesis
//! balancing are not recognized. A `;` inside a function body will split it.

/// A single SQL statement extracted from a larger script.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlStatement {
    /// Trimmed statement text, without the terminating semicolon.
    pub text: String,
    /// 1-based line number of the statement's first non-whitespace character.
    pub line: usize,
}

/// Split a SQL script into individual statements.
///
/// Statements are trimmed and empty ones are dropped. A trailing statement
/// with no terminating semicolon is included.
pub fn split_statements(sql: &str) -> Vec<SqlStatement> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut line = 1usize;
    let mut start_line = 1usize;
    let mut has_content = false;

    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                if in_string && chars.peek() == Some(&'\'') {
                    // Escaped quote inside a literal
                    current.push_str("''");
                    chars.next();
                    continue;
                }
                in_string = !in_string;
            }
            ';' if !in_string => {
                let text = current.trim();
                if !text.is_empty() {
                    statements.push(SqlStatement {
                        text: text.to_string(),
                        line: start_line,
                    });
                }
                current.clear();
                has_content = false;
                continue;
            }
            '\n' => {
                line += 1;
            }
            _ => {}
        }
        if !has_content && !ch.is_whitespace() {
            has_content = true;
            start_line = line;
        }
        current.push(ch);
    }

    let text = current.trim();
    if !text.is_empty() {
        statements.push(SqlStatement {
            text: text.to_string(),
            line: start_line,
        });
    }

    statements
}

/// Normalize SQL for pattern matching: blank out `--` and `/* */` comments
/// and replace string literal bodies with a `?` placeholder so that keywords
/// inside comments or literals cannot trigger false matches.
///
/// Newlines are preserved verbatim, so line arithmetic against the
/// normalized text matches the original.
pub fn normalize_sql(sql: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Normal,
        InString,
        LineComment,
        BlockComment,
    }

    let mut out = String::with_capacity(sql.len());
    let mut state = State::Normal;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Normal => match ch {
                '\'' => {
                    out.push('\'');
                    state = State::InString;
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                _ => out.push(ch),
            },
            State::InString => match ch {
                '\'' => {
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                    } else {
                        out.push_str("?'");
                        state = State::Normal;
                    }
                }
                '\n' => out.push('\n'),
                _ => {}
            },
            State::LineComment => {
                if ch == '\n' {
                    out.push('\n');
                    state = State::Normal;
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Normal;
                } else if ch == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
        }
    }

    out
}
