//! Generic, statically typed table persistence.
//!
//! A [`Table<T>`](table::Table) stores one entity type in one SQL table. The statements
//! for creating the table and for inserting, updating and deleting rows are generated
//! once from the entity's column list and reused for every call. Statements run through
//! a [`StoreConnection`](store::StoreConnection), implemented here for `SQLite`
//! (rusqlite + bb8) and `PostgreSQL` (tokio-postgres + deadpool).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sql_tables::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Widget {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl_entity!(Widget {
//!     id: i64 => "Id",
//!     name: String => "Name",
//! });
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::connect(SqliteOptions::new("widgets.db".into())).await?;
//! let mut widgets = Table::<Widget>::new(None, ConflictPolicy::Abort)?;
//! widgets.initialize(Arc::new(store)).await?;
//! widgets.insert(&Widget { id: 1, name: "sprocket".into() }).await?;
//! assert_eq!(widgets.get(1).await?.map(|w| w.name), Some("sprocket".to_string()));
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod prelude;
pub mod query;
pub mod results;
pub mod statement;
pub mod store;
pub mod table;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use error::{StatementKind, StoreError, TableError};
pub use statement::{ConflictPolicy, TableDescriptor};
pub use store::StoreConnection;
pub use table::{Table, TableBuilder, TableOptions};
