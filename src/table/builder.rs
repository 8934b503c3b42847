use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use super::{Binding, Table};
use crate::entity::Entity;
use crate::error::TableError;
use crate::statement::{ConflictPolicy, TableDescriptor, generate_table_name};
use crate::types::Dialect;

/// An index created by `initialize` right after the table itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub name: String,
    pub column: String,
    #[serde(default)]
    pub unique: bool,
}

/// Per-table settings, loadable from a config file.
///
/// ```rust
/// use sql_tables::prelude::*;
///
/// let opts: TableOptions = serde_json::from_str(
///     r#"{ "name": "widgets", "policy": "replace",
///          "indexes": [{ "name": "name", "column": "Name" }] }"#,
/// )
/// .unwrap();
/// assert_eq!(opts.policy, ConflictPolicy::Replace);
/// assert_eq!(opts.dialect, Dialect::Sqlite);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Table name override; the entity's type name when absent.
    pub name: Option<String>,
    pub policy: ConflictPolicy,
    pub dialect: Dialect,
    pub indexes: Vec<IndexSpec>,
}

/// Fluent builder for [`Table`]. All statements are generated by [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TableBuilder<T: Entity> {
    opts: TableOptions,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> TableBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_options(TableOptions::default())
    }

    #[must_use]
    pub fn from_options(opts: TableOptions) -> Self {
        Self {
            opts,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.opts.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: ConflictPolicy) -> Self {
        self.opts.policy = policy;
        self
    }

    #[must_use]
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.opts.dialect = dialect;
        self
    }

    /// Declare an index to create during `initialize`.
    #[must_use]
    pub fn index(mut self, name: impl Into<String>, column: impl Into<String>, unique: bool) -> Self {
        self.opts.indexes.push(IndexSpec {
            name: name.into(),
            column: column.into(),
            unique,
        });
        self
    }

    /// Generate the table's statements.
    ///
    /// # Errors
    /// Returns `TableError::Schema` if `T` cannot be persisted and `TableError::Config` if
    /// the dialect has no exact form of the conflict policy.
    pub fn build(self) -> Result<Table<T>, TableError> {
        let TableOptions {
            name,
            policy,
            dialect,
            indexes,
        } = self.opts;
        let name = name.unwrap_or_else(generate_table_name::<T>);
        let descriptor = TableDescriptor::generate::<T>(name, policy, dialect)?;
        Ok(Table {
            descriptor,
            policy,
            dialect,
            indexes,
            binding: Binding::Uninitialized,
            _entity: PhantomData,
        })
    }
}

impl<T: Entity> Default for TableBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
