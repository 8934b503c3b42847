//! Statement generation.
//!
//! Pure functions from an entity shape, a table name, a conflict policy and a dialect to
//! SQL text. Identifiers are always quoted, values are always placeholders, so nothing a
//! caller passes as a name can change the statement's structure.

pub mod conflict;
mod descriptor;

pub use conflict::ConflictPolicy;
pub use descriptor::TableDescriptor;

use std::collections::HashSet;

use conflict::{ConflictClause, PostgresConflict};

use crate::entity::{Column, Entity};
use crate::error::TableError;
use crate::types::{ColumnType, Dialect};

/// Quote an identifier, doubling any embedded quote.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Default table name for `T` when no override is given.
#[must_use]
pub fn generate_table_name<T: Entity>() -> String {
    T::TYPE_NAME.to_string()
}

/// Position of the key column in `T::COLUMNS`, after checking the shape can be persisted.
///
/// # Errors
/// Returns `TableError::Schema` for an empty column list, duplicate column names, or a
/// missing, nullable or non-integer key column.
pub fn key_index<T: Entity>() -> Result<usize, TableError> {
    if T::COLUMNS.is_empty() {
        return Err(TableError::Schema(format!("{} declares no columns", T::TYPE_NAME)));
    }
    let mut seen = HashSet::with_capacity(T::COLUMNS.len());
    for col in T::COLUMNS {
        if col.name.is_empty() {
            return Err(TableError::Schema(format!(
                "{} declares a column with an empty name",
                T::TYPE_NAME
            )));
        }
        if !seen.insert(col.name.to_ascii_lowercase()) {
            return Err(TableError::Schema(format!(
                "{} declares column {} twice",
                T::TYPE_NAME,
                col.name
            )));
        }
    }
    let idx = T::COLUMNS
        .iter()
        .position(|c| c.name == T::KEY_COLUMN)
        .ok_or_else(|| {
            TableError::Schema(format!(
                "{} has no {} key column",
                T::TYPE_NAME,
                T::KEY_COLUMN
            ))
        })?;
    let key = &T::COLUMNS[idx];
    if key.kind != ColumnType::Integer || key.nullable {
        return Err(TableError::Schema(format!(
            "{} key column {} must be a non-null integer",
            T::TYPE_NAME,
            key.name
        )));
    }
    Ok(idx)
}

fn column_definition(col: &Column, is_key: bool, dialect: Dialect) -> String {
    let ty = col.kind.sql_type(dialect);
    if is_key {
        format!("{} {ty} PRIMARY KEY", quote_ident(col.name))
    } else if col.nullable {
        format!("{} {ty}", quote_ident(col.name))
    } else {
        format!("{} {ty} NOT NULL", quote_ident(col.name))
    }
}

/// `CREATE TABLE IF NOT EXISTS` for `T`; re-running it on an existing table is a no-op.
///
/// # Errors
/// Returns `TableError::Schema` if `T` cannot be persisted or `name` is empty.
pub fn generate_creator<T: Entity>(name: &str, dialect: Dialect) -> Result<String, TableError> {
    check_table_name(name)?;
    let key = key_index::<T>()?;
    let columns: Vec<String> = T::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, col)| column_definition(col, i == key, dialect))
        .collect();
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(name),
        columns.join(", ")
    ))
}

/// Insert for `T` with placeholders in `T::COLUMNS` order and the policy's conflict clause.
///
/// # Errors
/// Returns `TableError::Schema` for an unusable shape and `TableError::Config` when the
/// dialect cannot express `policy`.
pub fn generate_inserter<T: Entity>(
    name: &str,
    policy: ConflictPolicy,
    dialect: Dialect,
) -> Result<String, TableError> {
    check_table_name(name)?;
    let key = key_index::<T>()?;
    let clause = policy.insert_clause(dialect)?;
    let columns: Vec<String> = T::COLUMNS.iter().map(|c| quote_ident(c.name)).collect();
    let placeholders: Vec<String> = (1..=T::COLUMNS.len())
        .map(|i| dialect.placeholder(i))
        .collect();
    let values = format!(
        "{} ({}) VALUES ({})",
        quote_ident(name),
        columns.join(", "),
        placeholders.join(", ")
    );
    let key_ident = quote_ident(T::COLUMNS[key].name);
    let sql = match clause {
        ConflictClause::Sqlite(keyword) => format!("INSERT {keyword} INTO {values}"),
        ConflictClause::Postgres(PostgresConflict::Raise) => format!("INSERT INTO {values}"),
        // no conflict target, so unique indexes are skipped like the key
        ConflictClause::Postgres(PostgresConflict::DoNothing) => {
            format!("INSERT INTO {values} ON CONFLICT DO NOTHING")
        }
        ConflictClause::Postgres(PostgresConflict::DoUpdate) => {
            let assignments: Vec<String> = T::COLUMNS
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != key)
                .map(|(_, c)| {
                    let ident = quote_ident(c.name);
                    format!("{ident} = EXCLUDED.{ident}")
                })
                .collect();
            if assignments.is_empty() {
                // the key is the whole row, so replacing it changes nothing
                format!("INSERT INTO {values} ON CONFLICT ({key_ident}) DO NOTHING")
            } else {
                format!(
                    "INSERT INTO {values} ON CONFLICT ({key_ident}) DO UPDATE SET {}",
                    assignments.join(", ")
                )
            }
        }
    };
    Ok(sql)
}

/// `UPDATE` of every non-key column, addressed by key.
///
/// Placeholder numbers equal column positions, so the statement binds `to_row()` as is.
///
/// # Errors
/// Returns `TableError::Schema` if `T` cannot be persisted or `name` is empty.
pub fn generate_updater<T: Entity>(name: &str, dialect: Dialect) -> Result<String, TableError> {
    check_table_name(name)?;
    let key = key_index::<T>()?;
    let mut assignments: Vec<String> = T::COLUMNS
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != key)
        .map(|(i, c)| format!("{} = {}", quote_ident(c.name), dialect.placeholder(i + 1)))
        .collect();
    let key_ident = quote_ident(T::COLUMNS[key].name);
    let key_placeholder = dialect.placeholder(key + 1);
    if assignments.is_empty() {
        assignments.push(format!("{key_ident} = {key_placeholder}"));
    }
    Ok(format!(
        "UPDATE {} SET {} WHERE {key_ident} = {key_placeholder}",
        quote_ident(name),
        assignments.join(", ")
    ))
}

/// `DELETE` of one row addressed by key, bound as the only parameter.
///
/// # Errors
/// Returns `TableError::Schema` if `T` cannot be persisted or `name` is empty.
pub fn generate_deleter<T: Entity>(name: &str, dialect: Dialect) -> Result<String, TableError> {
    check_table_name(name)?;
    key_index::<T>()?;
    Ok(format!(
        "DELETE FROM {} WHERE {}",
        quote_ident(name),
        key_predicate::<T>(dialect)
    ))
}

/// `"Id" = ?1` (or `$1`) for `T`'s key column.
#[must_use]
pub fn key_predicate<T: Entity>(dialect: Dialect) -> String {
    format!("{} = {}", quote_ident(T::KEY_COLUMN), dialect.placeholder(1))
}

/// `SELECT * FROM <name>`, optionally filtered by `where_clause`.
///
/// The predicate is structural SQL supplied by the caller and is not escaped; values
/// belong in bound parameters.
#[must_use]
pub fn generate_select(name: &str, where_clause: Option<&str>) -> String {
    match where_clause.map(str::trim).filter(|w| !w.is_empty()) {
        Some(predicate) => format!("SELECT * FROM {} WHERE {predicate}", quote_ident(name)),
        None => format!("SELECT * FROM {}", quote_ident(name)),
    }
}

/// Idempotent index creation; the index is named `<table>_IX_<index_name>`.
#[must_use]
pub fn generate_create_index(table: &str, index_name: &str, column: &str, unique: bool) -> String {
    let kind = if unique { "UNIQUE INDEX" } else { "INDEX" };
    format!(
        "CREATE {kind} IF NOT EXISTS {} ON {} ({})",
        quote_ident(&format!("{table}_IX_{index_name}")),
        quote_ident(table),
        quote_ident(column)
    )
}

/// Drop the index `create_index` would have named `<table>_IX_<index_name>`.
#[must_use]
pub fn generate_drop_index(table: &str, index_name: &str) -> String {
    format!(
        "DROP INDEX IF EXISTS {}",
        quote_ident(&format!("{table}_IX_{index_name}"))
    )
}

#[must_use]
pub fn generate_rename(old: &str, new: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME TO {}",
        quote_ident(old),
        quote_ident(new)
    )
}

pub(crate) fn check_table_name(name: &str) -> Result<(), TableError> {
    if name.trim().is_empty() {
        Err(TableError::Schema("table name must not be empty".into()))
    } else {
        Ok(())
    }
}
