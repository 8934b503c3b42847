//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::entity::{Column, ColumnValue, Entity};
pub use crate::error::{StatementKind, StoreError, TableError};
pub use crate::impl_entity;
pub use crate::query::QueryAndParams;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::statement::{ConflictPolicy, TableDescriptor};
pub use crate::store::StoreConnection;
pub use crate::table::{IndexSpec, Table, TableBuilder, TableOptions};
pub use crate::types::{ColumnType, Dialect, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteOptions, SqliteOptionsBuilder, SqliteStore};

#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresOptions, PostgresStore};
