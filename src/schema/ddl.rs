//! DDL statement builders
//!
//! Low-level generators turning schema structures into PostgreSQL DDL, plus
//! the diff-to-migration synthesizer that orders them into a valid script.
//!
//! Every generator returns the empty string when a required field is missing.
//! Empty string is the canonical "not ready" signal; generators never panic.

use crate::schema::diff::SchemaDiff;
use crate::schema::{SchemaColumn, SchemaForeignKey, SchemaTable};
use once_cell::sync::Lazy;
use regex::Regex;

static BARE_IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

/// Quote an identifier for use in DDL. Identifiers that are already safe
/// lowercase names are emitted bare; anything else is double-quoted with
/// internal quotes doubled.
pub fn quote_ident(name: &str) -> String {
    if BARE_IDENT_RE.is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Quote a text value as a SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render one column definition for CREATE TABLE / ADD COLUMN.
/// Empty when name or type is missing.
fn column_definition(column: &SchemaColumn) -> String {
    if column.name.trim().is_empty() || column.data_type.trim().is_empty() {
        return String::new();
    }

    let mut def = format!("{} {}", quote_ident(&column.name), column.data_type);
    if !column.nullable {
        def.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default_value {
        if !default.trim().is_empty() {
            def.push_str(&format!(" DEFAULT {default}"));
        }
    }
    def
}

/// CREATE TABLE with column definitions and a composite primary key clause
/// when any column is marked primary.
pub fn generate_create_table(table: &SchemaTable) -> String {
    if table.name.trim().is_empty() {
        return String::new();
    }

    let columns: Vec<String> = table
        .columns
        .iter()
        .map(column_definition)
        .filter(|def| !def.is_empty())
        .map(|def| format!("    {def}"))
        .collect();
    if columns.is_empty() {
        return String::new();
    }

    let mut lines = columns;
    let pk_columns: Vec<String> = table
        .columns
        .iter()
        .filter(|c| c.is_primary_key)
        .map(|c| quote_ident(&c.name))
        .collect();
    if !pk_columns.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", pk_columns.join(", ")));
    }

    format!(
        "CREATE TABLE {} (\n{}\n);",
        quote_ident(&table.name),
        lines.join(",\n")
    )
}

pub fn generate_drop_table(table: &str) -> String {
    if table.trim().is_empty() {
        return String::new();
    }
    format!("DROP TABLE IF EXISTS {} CASCADE;", quote_ident(table))
}

pub fn generate_add_column(table: &str, column: &SchemaColumn) -> String {
    let definition = column_definition(column);
    if table.trim().is_empty() || definition.is_empty() {
        return String::new();
    }
    format!("ALTER TABLE {} ADD COLUMN {definition};", quote_ident(table))
}

pub fn generate_drop_column(table: &str, column: &str) -> String {
    if table.trim().is_empty() || column.trim().is_empty() {
        return String::new();
    }
    format!(
        "ALTER TABLE {} DROP COLUMN {};",
        quote_ident(table),
        quote_ident(column)
    )
}

/// Type change with a USING cast so convertible data survives.
pub fn generate_alter_column_type(table: &str, column: &str, new_type: &str) -> String {
    if table.trim().is_empty() || column.trim().is_empty() || new_type.trim().is_empty() {
        return String::new();
    }
    let col = quote_ident(column);
    format!(
        "ALTER TABLE {} ALTER COLUMN {col} TYPE {new_type} USING {col}::{new_type};",
        quote_ident(table)
    )
}

pub fn generate_set_not_null(table: &str, column: &str) -> String {
    if table.trim().is_empty() || column.trim().is_empty() {
        return String::new();
    }
    format!(
        "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL;",
        quote_ident(table),
        quote_ident(column)
    )
}

pub fn generate_drop_not_null(table: &str, column: &str) -> String {
    if table.trim().is_empty() || column.trim().is_empty() {
        return String::new();
    }
    format!(
        "ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL;",
        quote_ident(table),
        quote_ident(column)
    )
}

/// The default expression is rendered verbatim; introspection already
/// returns it in SQL form (e.g. `now()` or `'pending'::text`).
pub fn generate_set_default(table: &str, column: &str, default: &str) -> String {
    if table.trim().is_empty() || column.trim().is_empty() || default.trim().is_empty() {
        return String::new();
    }
    format!(
        "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {default};",
        quote_ident(table),
        quote_ident(column)
    )
}

pub fn generate_drop_default(table: &str, column: &str) -> String {
    if table.trim().is_empty() || column.trim().is_empty() {
        return String::new();
    }
    format!(
        "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;",
        quote_ident(table),
        quote_ident(column)
    )
}

pub fn generate_add_foreign_key(table: &str, fk: &SchemaForeignKey) -> String {
    if table.trim().is_empty()
        || fk.column.trim().is_empty()
        || fk.referenced_table.trim().is_empty()
        || fk.referenced_column.trim().is_empty()
    {
        return String::new();
    }

    let name = if fk.name.trim().is_empty() {
        format!("fk_{}_{}", table, fk.column)
    } else {
        fk.name.clone()
    };

    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({});",
        quote_ident(table),
        quote_ident(&name),
        quote_ident(&fk.column),
        quote_ident(&fk.referenced_table),
        quote_ident(&fk.referenced_column)
    )
}

pub fn generate_drop_constraint(table: &str, constraint: &str) -> String {
    if table.trim().is_empty() || constraint.trim().is_empty() {
        return String::new();
    }
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {};",
        quote_ident(table),
        quote_ident(constraint)
    )
}

/// Synthesize a forward migration script from a schema diff.
///
/// Phase order is load-bearing: constraints drop before the columns and
/// tables they guard, tables exist before their columns and foreign keys.
///
/// 1. drop removed/changed foreign keys on modified tables
/// 2. drop removed columns on modified tables
/// 3. drop removed tables
/// 4. create added tables
/// 5. add new columns on modified tables
/// 6. per modified column: type, then nullability, then default
/// 7. add foreign keys of newly created tables
/// 8. add new foreign keys on modified tables
pub fn generate_migration_from_diff(diff: &SchemaDiff) -> String {
    let mut statements: Vec<String> = Vec::new();
    let mut push = |stmt: String| {
        if !stmt.is_empty() {
            statements.push(stmt);
        }
    };

    for td in &diff.tables_modified {
        for fk in &td.foreign_keys_removed {
            push(generate_drop_constraint(&td.table, &fk.name));
        }
    }

    for td in &diff.tables_modified {
        for column in &td.columns_removed {
            push(generate_drop_column(&td.table, column));
        }
    }

    for table in &diff.tables_removed {
        push(generate_drop_table(table));
    }

    for table in &diff.tables_added {
        push(generate_create_table(table));
    }

    for td in &diff.tables_modified {
        for column in &td.columns_added {
            push(generate_add_column(&td.table, column));
        }
    }

    for td in &diff.tables_modified {
        for cd in &td.columns_modified {
            if cd.before.data_type != cd.after.data_type {
                push(generate_alter_column_type(
                    &td.table,
                    &cd.column,
                    &cd.after.data_type,
                ));
            }
            if cd.before.nullable != cd.after.nullable {
                if cd.after.nullable {
                    push(generate_drop_not_null(&td.table, &cd.column));
                } else {
                    push(generate_set_not_null(&td.table, &cd.column));
                }
            }
            if cd.before.default_value != cd.after.default_value {
                match &cd.after.default_value {
                    Some(default) => push(generate_set_default(&td.table, &cd.column, default)),
                    None => push(generate_drop_default(&td.table, &cd.column)),
                }
            }
        }
    }

    for table in &diff.tables_added {
        for fk in &table.foreign_keys {
            push(generate_add_foreign_key(&table.name, fk));
        }
    }

    for td in &diff.tables_modified {
        for fk in &td.foreign_keys_added {
            push(generate_add_foreign_key(&td.table, fk));
        }
    }

    statements.join("\n\n")
}
