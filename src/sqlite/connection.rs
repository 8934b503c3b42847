use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bb8::{ManageConnection, Pool, PooledConnection};

use super::config::{SharedSqliteConnection, SqliteManager, SqliteOptions, SqliteOptionsBuilder};
use super::params::Params;
use super::query::build_result_set;
use crate::error::StoreError;
use crate::query::QueryAndParams;
use crate::results::ResultSet;
use crate::store::StoreConnection;
use crate::types::{Dialect, RowValues};

/// [`StoreConnection`] over a bb8 pool of rusqlite connections.
///
/// Each call checks out one connection and runs its blocking work on Tokio's blocking
/// pool, so the async runtime never waits on `SQLite` I/O.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Pool<SqliteManager>,
    db_path: String,
}

impl SqliteStore {
    #[must_use]
    pub fn builder(db_path: String) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Open the pool and verify the database can be reached.
    ///
    /// One connection is opened and checked before the pool is built, so a bad path
    /// fails here instead of on the first statement.
    ///
    /// # Errors
    /// Returns `StoreError` if the first connection cannot be opened.
    pub async fn connect(opts: SqliteOptions) -> Result<Self, StoreError> {
        let manager = SqliteManager::new(&opts);
        if !opts.is_memory() {
            let mut first = manager.connect().await?;
            manager.is_valid(&mut first).await?;
        }
        let size = opts.effective_pool_size();
        let mut builder = Pool::builder().max_size(size);
        if opts.is_memory() {
            // dropping the only connection would drop the database with it
            builder = builder
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = builder.build(manager).await?;
        tracing::debug!(db_path = %opts.db_path, pool_size = size, "sqlite store opened");
        Ok(Self {
            pool,
            db_path: opts.db_path,
        })
    }

    #[must_use]
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    async fn checkout(&self) -> Result<PooledConnection<'_, SqliteManager>, StoreError> {
        self.pool.get().await.map_err(|e| {
            StoreError::ConnectionError(format!("sqlite checkout error: {e}"))
        })
    }

    /// Run synchronous work against one pooled `rusqlite::Connection`.
    ///
    /// # Errors
    /// Returns `StoreError` if checkout fails or `func` returns an error.
    pub async fn with_connection<F, R>(&self, func: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut rusqlite::Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = self.checkout().await?;
        run_blocking(Arc::clone(&*conn), func).await
    }
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("pool", &self.pool.state())
            .finish()
    }
}

#[async_trait]
impl StoreConnection for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, sql: &str, params: &[RowValues]) -> Result<usize, StoreError> {
        let sql_owned = sql.to_owned();
        let params_owned = Params::convert(params);
        self.with_connection(move |guard| {
            let mut stmt = guard.prepare_cached(&sql_owned)?;
            let refs = params_owned.as_refs();
            Ok(stmt.execute(&refs[..])?)
        })
        .await
    }

    async fn execute_batch(&self, batch: &[QueryAndParams]) -> Result<(), StoreError> {
        let statements: Vec<(String, Params)> = batch
            .iter()
            .map(|qp| (qp.query.clone(), Params::convert(&qp.params)))
            .collect();
        self.with_connection(move |guard| {
            let tx = guard.transaction()?;
            for (sql, params) in &statements {
                let mut stmt = tx.prepare_cached(sql)?;
                let refs = params.as_refs();
                stmt.execute(&refs[..])?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn query(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, StoreError> {
        let sql_owned = sql.to_owned();
        let params_owned = Params::convert(params);
        self.with_connection(move |guard| {
            let mut stmt = guard.prepare(&sql_owned)?;
            build_result_set(&mut stmt, &params_owned)
        })
        .await
    }
}

pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, StoreError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, StoreError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| StoreError::ExecutionError(format!("sqlite spawn_blocking join error: {e}")))?
}
