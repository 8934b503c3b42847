//! The generic per-entity table.
//!
//! A [`Table<T>`] owns its [`TableDescriptor`], generated once when the table is built,
//! and borrows a store connection bound by [`Table::initialize`]. Every data operation
//! runs one of the cached statements through that connection.

mod builder;

pub use builder::{IndexSpec, TableBuilder, TableOptions};

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::entity::Entity;
use crate::error::{StatementKind, StoreError, TableError};
use crate::query::QueryAndParams;
use crate::statement::{
    ConflictPolicy, TableDescriptor, check_table_name, generate_create_index,
    generate_drop_index, generate_rename, generate_select, key_predicate,
};
use crate::store::StoreConnection;
use crate::types::{Dialect, RowValues};

/// Connection state of a table.
pub(crate) enum Binding {
    Uninitialized,
    Bound(Arc<dyn StoreConnection>),
}

/// Typed CRUD access to the table holding entities of type `T`.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use sql_tables::prelude::*;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Widget {
///     id: i64,
///     name: String,
/// }
///
/// impl_entity!(Widget {
///     id: i64 => "Id",
///     name: String => "Name",
/// });
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let store = SqliteStore::connect(SqliteOptions::new(":memory:".into())).await?;
/// let mut widgets = Table::<Widget>::new(Some("widgets"), ConflictPolicy::Fail)?;
/// widgets.initialize(Arc::new(store)).await?;
/// widgets.insert(&Widget { id: 1, name: "a".into() }).await?;
/// assert_eq!(widgets.get(1).await?.map(|w| w.name), Some("a".to_string()));
/// # Ok(()) }
/// ```
pub struct Table<T: Entity> {
    descriptor: TableDescriptor,
    policy: ConflictPolicy,
    dialect: Dialect,
    indexes: Vec<IndexSpec>,
    binding: Binding,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Table<T> {
    #[must_use]
    pub fn builder() -> TableBuilder<T> {
        TableBuilder::new()
    }

    /// `SQLite` table named `name` (or `T`'s type name) using `policy` on insert.
    ///
    /// # Errors
    /// Returns `TableError::Schema` if `T` cannot be persisted.
    pub fn new(name: Option<&str>, policy: ConflictPolicy) -> Result<Self, TableError> {
        let builder = Self::builder().policy(policy);
        match name {
            Some(name) => builder.name(name).build(),
            None => builder.build(),
        }
    }

    /// # Errors
    /// Same as [`TableBuilder::build`].
    pub fn from_options(opts: TableOptions) -> Result<Self, TableError> {
        TableBuilder::from_options(opts).build()
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        self.descriptor.name()
    }

    #[must_use]
    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn creator(&self) -> &str {
        self.descriptor.creator()
    }

    #[must_use]
    pub fn inserter(&self) -> &str {
        self.descriptor.inserter()
    }

    #[must_use]
    pub fn updater(&self) -> &str {
        self.descriptor.updater()
    }

    #[must_use]
    pub fn deleter(&self) -> &str {
        self.descriptor.deleter()
    }

    #[must_use]
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn indexes(&self) -> &[IndexSpec] {
        &self.indexes
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        matches!(self.binding, Binding::Bound(_))
    }

    fn connection(&self) -> Result<&Arc<dyn StoreConnection>, TableError> {
        match &self.binding {
            Binding::Bound(conn) => Ok(conn),
            Binding::Uninitialized => Err(TableError::NotInitialized {
                entity: T::TYPE_NAME,
            }),
        }
    }

    fn store_failure(&self, kind: StatementKind, source: StoreError) -> TableError {
        TableError::Connection {
            kind,
            table: self.table_name().to_string(),
            source,
        }
    }

    async fn run(
        &self,
        kind: StatementKind,
        sql: &str,
        params: &[RowValues],
    ) -> Result<usize, TableError> {
        let conn = self.connection()?;
        debug!(table = self.table_name(), %kind, sql, "executing statement");
        conn.execute(sql, params)
            .await
            .map_err(|e| self.store_failure(kind, e))
    }

    /// Bind `conn` and create the table (and any declared indexes) if missing.
    ///
    /// Calling it again rebinds; the last connection wins and the idempotent create
    /// statements run again.
    ///
    /// # Errors
    /// Returns `TableError::Config` if `conn` speaks another dialect than the statements
    /// were generated for, or `TableError::Connection` if table or index creation fails.
    pub async fn initialize(&mut self, conn: Arc<dyn StoreConnection>) -> Result<(), TableError> {
        if conn.dialect() != self.dialect {
            return Err(TableError::Config(format!(
                "table {} was generated for {:?} but the store speaks {:?}",
                self.table_name(),
                self.dialect,
                conn.dialect()
            )));
        }
        self.binding = Binding::Bound(conn);
        self.run(StatementKind::Create, self.descriptor.creator(), &[])
            .await?;
        for index in &self.indexes {
            self.create_index(&index.name, &index.column, index.unique)
                .await?;
        }
        info!(
            table = self.table_name(),
            entity = T::TYPE_NAME,
            indexes = self.indexes.len(),
            "table initialized"
        );
        Ok(())
    }

    /// Fetch the row with primary key `key`.
    ///
    /// # Errors
    /// Returns `TableError::NotInitialized` before `initialize`, `TableError::DataIntegrity`
    /// if more than one row carries `key`, `TableError::Decode` if the row does not fit `T`,
    /// and `TableError::Connection` if the query fails.
    pub async fn get(&self, key: i64) -> Result<Option<T>, TableError> {
        let conn = self.connection()?;
        let sql = generate_select(self.table_name(), Some(&key_predicate::<T>(self.dialect)));
        debug!(table = self.table_name(), key, sql = %sql, "fetching by key");
        let rs = conn
            .query(&sql, &[RowValues::Int(key)])
            .await
            .map_err(|e| self.store_failure(StatementKind::Select, e))?;
        match rs.results.as_slice() {
            [] => Ok(None),
            [row] => T::from_row(row).map(Some).map_err(|source| TableError::Decode {
                table: self.table_name().to_string(),
                source,
            }),
            rows => Err(TableError::DataIntegrity {
                table: self.table_name().to_string(),
                key,
                rows: rows.len(),
            }),
        }
    }

    /// Fetch every row matching `predicate`, a caller-written SQL condition whose values
    /// are bound from `params`. An empty predicate returns the whole table.
    ///
    /// # Errors
    /// Returns `TableError::NotInitialized` before `initialize`, `TableError::Connection` if
    /// the query fails, and `TableError::Decode` if a row does not fit `T`.
    pub async fn query_where(
        &self,
        predicate: &str,
        params: &[RowValues],
    ) -> Result<Vec<T>, TableError> {
        let conn = self.connection()?;
        let sql = generate_select(self.table_name(), Some(predicate));
        debug!(table = self.table_name(), sql = %sql, "querying");
        let rs = conn
            .query(&sql, params)
            .await
            .map_err(|e| self.store_failure(StatementKind::Select, e))?;
        rs.results
            .iter()
            .map(T::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| TableError::Decode {
                table: self.table_name().to_string(),
                source,
            })
    }

    /// Insert `item` under the table's conflict policy; returns the rows written, which is
    /// zero when `Ignore` skipped a conflicting row.
    ///
    /// # Errors
    /// Returns `TableError::Conflict` when the key (or a unique index) is taken and the
    /// policy does not resolve conflicts, `TableError::NotInitialized` before `initialize`,
    /// and `TableError::Connection` for other store failures.
    pub async fn insert(&self, item: &T) -> Result<usize, TableError> {
        let conn = self.connection()?;
        let sql = self.descriptor.inserter();
        debug!(table = self.table_name(), sql, "inserting");
        match conn.execute(sql, &item.to_row()).await {
            Ok(rows) => Ok(rows),
            Err(source) if source.is_unique_violation() => {
                warn!(
                    table = self.table_name(),
                    policy = ?self.policy,
                    "insert rejected by existing key"
                );
                Err(TableError::Conflict {
                    table: self.table_name().to_string(),
                    source,
                })
            }
            Err(source) => Err(self.store_failure(StatementKind::Insert, source)),
        }
    }

    /// Overwrite every non-key column of the row keyed by `item`'s key. A missing row is
    /// not an error; check the returned count when the row must exist.
    ///
    /// # Errors
    /// Returns `TableError::NotInitialized` before `initialize` and `TableError::Connection`
    /// if the update fails.
    pub async fn update(&self, item: &T) -> Result<usize, TableError> {
        self.run(StatementKind::Update, self.descriptor.updater(), &item.to_row())
            .await
    }

    /// Delete the row keyed by `key`; zero rows deleted is not an error.
    ///
    /// # Errors
    /// Returns `TableError::NotInitialized` before `initialize` and `TableError::Connection`
    /// if the delete fails.
    pub async fn delete(&self, key: i64) -> Result<usize, TableError> {
        self.run(
            StatementKind::Delete,
            self.descriptor.deleter(),
            &[RowValues::Int(key)],
        )
        .await
    }

    /// Delete every row keyed by `keys` as one atomic batch: all deletions become visible
    /// together or none do.
    ///
    /// # Errors
    /// Returns `TableError::NotInitialized` before `initialize` and `TableError::Connection`
    /// if the batch fails, in which case nothing was deleted.
    pub async fn delete_all(&self, keys: &[i64]) -> Result<(), TableError> {
        let conn = self.connection()?;
        if keys.is_empty() {
            return Ok(());
        }
        let deleter = self.descriptor.deleter();
        let batch: Vec<QueryAndParams> = keys
            .iter()
            .map(|key| QueryAndParams::new(deleter, vec![RowValues::Int(*key)]))
            .collect();
        debug!(
            table = self.table_name(),
            sql = deleter,
            keys = keys.len(),
            "deleting batch"
        );
        conn.execute_batch(&batch)
            .await
            .map_err(|e| self.store_failure(StatementKind::Delete, e))
    }

    /// Create index `<table>_IX_<index_name>` on `column` if it does not exist. The column
    /// is not checked against `T`; a bad column surfaces as a store error.
    ///
    /// # Errors
    /// Returns `TableError::NotInitialized` before `initialize` and `TableError::Connection`
    /// if the store rejects the index.
    pub async fn create_index(
        &self,
        index_name: &str,
        column: &str,
        unique: bool,
    ) -> Result<(), TableError> {
        let sql = generate_create_index(self.table_name(), index_name, column, unique);
        self.run(StatementKind::Index, &sql, &[]).await?;
        Ok(())
    }

    /// Rename the table and regenerate every cached statement for the new name.
    ///
    /// Declared indexes move with the table: each `<old>_IX_<name>` is dropped and
    /// recreated as `<new>_IX_<name>` in the same batch as the rename, so a later
    /// `initialize` finds them. Indexes added only through [`create_index`](Self::create_index)
    /// keep their old names.
    ///
    /// # Errors
    /// Returns `TableError::Schema` for an empty name, `TableError::NotInitialized` before
    /// `initialize`, and `TableError::Connection` if the store rejects the batch, in which
    /// case the table keeps its old name, indexes and statements.
    pub async fn rename(&mut self, new_name: &str) -> Result<(), TableError> {
        check_table_name(new_name)?;
        let conn = self.connection()?;
        let renamed = TableDescriptor::generate::<T>(new_name, self.policy, self.dialect)?;
        let old_name = self.table_name();
        let mut batch = vec![QueryAndParams::new_without_params(generate_rename(
            old_name, new_name,
        ))];
        for index in &self.indexes {
            batch.push(QueryAndParams::new_without_params(generate_drop_index(
                old_name,
                &index.name,
            )));
            batch.push(QueryAndParams::new_without_params(generate_create_index(
                new_name,
                &index.name,
                &index.column,
                index.unique,
            )));
        }
        debug!(
            table = old_name,
            to = new_name,
            indexes = self.indexes.len(),
            "renaming"
        );
        conn.execute_batch(&batch)
            .await
            .map_err(|e| self.store_failure(StatementKind::Rename, e))?;
        info!(from = old_name, to = new_name, "table renamed");
        self.descriptor = renamed;
        Ok(())
    }
}

impl<T: Entity> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("entity", &T::TYPE_NAME)
            .field("descriptor", &self.descriptor)
            .field("policy", &self.policy)
            .field("dialect", &self.dialect)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
