use std::fmt;

use thiserror::Error;

/// Errors raised by a store connection while executing statements.
#[derive(Debug, Error)]
pub enum StoreError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] deadpool_postgres::PoolError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Value conversion error: {0}")]
    ConversionError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl StoreError {
    /// True when the store rejected a write because a primary-key or unique constraint
    /// already holds the value.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            StoreError::SqliteError(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == rusqlite::ErrorCode::ConstraintViolation
                    && matches!(
                        err.extended_code,
                        rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                            | rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    )
            }
            #[cfg(feature = "postgres")]
            StoreError::PostgresError(err) => {
                err.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION)
            }
            _ => false,
        }
    }
}

/// The kind of statement a table operation was running when the store failed.
///
/// Lets callers tell schema setup failures (`Create`, `Index`, `Rename`) apart from
/// data operation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Create,
    Insert,
    Update,
    Delete,
    Select,
    Index,
    Rename,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Create => "create",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Select => "select",
            StatementKind::Index => "index",
            StatementKind::Rename => "rename",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by [`Table`](crate::table::Table) operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// A CRUD operation ran before `initialize` bound a store connection.
    #[error("table for {entity} has not been initialized yet")]
    NotInitialized { entity: &'static str },

    #[error("{kind} statement failed on table {table}: {source}")]
    Connection {
        kind: StatementKind,
        table: String,
        #[source]
        source: StoreError,
    },

    /// An insert hit an existing key under a policy that does not resolve conflicts.
    #[error("insert into {table} conflicts with an existing row: {source}")]
    Conflict {
        table: String,
        #[source]
        source: StoreError,
    },

    /// More rows matched a primary key than the key invariant allows.
    #[error("table {table} returned {rows} rows for primary key {key}")]
    DataIntegrity { table: String, key: i64, rows: usize },

    /// The entity shape cannot be turned into statements.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored row could not be mapped back onto the entity type.
    #[error("row decode error on table {table}: {source}")]
    Decode {
        table: String,
        #[source]
        source: StoreError,
    },
}

impl TableError {
    /// The statement kind attached to a store failure, if any.
    #[must_use]
    pub fn statement_kind(&self) -> Option<StatementKind> {
        match self {
            TableError::Connection { kind, .. } => Some(*kind),
            TableError::Conflict { .. } => Some(StatementKind::Insert),
            TableError::DataIntegrity { .. } | TableError::Decode { .. } => {
                Some(StatementKind::Select)
            }
            _ => None,
        }
    }
}
