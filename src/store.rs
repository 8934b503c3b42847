//! The store connection seam.
//!
//! A [`Table`](crate::table::Table) never opens, pools or closes connections. It is handed
//! one `Arc<dyn StoreConnection>` at `initialize` time and runs every statement through it.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::query::QueryAndParams;
use crate::results::ResultSet;
use crate::types::{Dialect, RowValues};

/// An established channel to a relational backend.
#[async_trait]
pub trait StoreConnection: Send + Sync {
    /// SQL dialect the backend speaks; tables refuse to bind to a mismatched store.
    fn dialect(&self) -> Dialect;

    /// Execute one statement and return the number of rows it changed.
    ///
    /// # Errors
    /// Returns `StoreError` if parameter conversion or execution fails.
    async fn execute(&self, sql: &str, params: &[RowValues]) -> Result<usize, StoreError>;

    /// Execute every statement of `batch` as one atomic unit: either all of them take
    /// effect or none do.
    ///
    /// # Errors
    /// Returns `StoreError` if any statement fails; the whole batch is rolled back.
    async fn execute_batch(&self, batch: &[QueryAndParams]) -> Result<(), StoreError>;

    /// Run a query and materialize its rows.
    ///
    /// # Errors
    /// Returns `StoreError` if parameter conversion, execution or row extraction fails.
    async fn query(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, StoreError>;
}
