use async_trait::async_trait;
use deadpool_postgres::{Pool, Runtime};
use tokio_postgres::NoTls;

use super::config::PostgresOptions;
use super::params::as_refs;
use super::query::build_result_set;
use crate::error::StoreError;
use crate::query::QueryAndParams;
use crate::results::ResultSet;
use crate::store::StoreConnection;
use crate::types::{Dialect, RowValues};

/// [`StoreConnection`] over a deadpool of tokio-postgres clients.
#[derive(Clone)]
pub struct PostgresStore {
    pool: Pool,
}

impl PostgresStore {
    /// Validate the options and create the pool. Connections are opened on first use.
    ///
    /// # Errors
    /// Returns `StoreError::ConfigError` for missing fields and
    /// `StoreError::ConnectionError` if the pool cannot be created.
    #[allow(clippy::unused_async)]
    pub async fn connect(opts: PostgresOptions) -> Result<Self, StoreError> {
        opts.validate()?;
        let pool = opts
            .config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                StoreError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool", &self.pool.status())
            .finish()
    }
}

fn rows_affected(rows: u64) -> Result<usize, StoreError> {
    usize::try_from(rows)
        .map_err(|e| StoreError::ExecutionError(format!("Invalid rows affected count: {e}")))
}

#[async_trait]
impl StoreConnection for PostgresStore {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn execute(&self, sql: &str, params: &[RowValues]) -> Result<usize, StoreError> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(sql).await?;
        let rows = client.execute(&stmt, &as_refs(params)).await?;
        rows_affected(rows)
    }

    async fn execute_batch(&self, batch: &[QueryAndParams]) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;
        for qp in batch {
            let stmt = tx.prepare_cached(&qp.query).await?;
            tx.execute(&stmt, &as_refs(&qp.params)).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, StoreError> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(sql).await?;
        let rows = client.query(&stmt, &as_refs(params)).await?;
        build_result_set(&stmt, &rows)
    }
}
