use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;

use super::SqliteStore;
use crate::error::StoreError;

/// A pooled `SQLite` connection; blocking work locks it from a blocking thread.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

fn default_pool_size() -> u32 {
    4
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_wal() -> bool {
    true
}

/// Options for opening a [`SqliteStore`].
///
/// In-memory databases are private to one connection, so they always get a pool of one.
/// An empty `db_path` opens a private temporary database per connection and is treated
/// the same way.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteOptions {
    pub db_path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Switch file databases to write-ahead logging.
    #[serde(default = "default_wal")]
    pub wal: bool,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            db_path,
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
            wal: default_wal(),
        }
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.db_path.is_empty()
            || self.db_path == ":memory:"
            || self.db_path.starts_with("file::memory:")
            || self.db_path.contains("mode=memory")
    }

    /// Pool size actually used for these options.
    #[must_use]
    pub fn effective_pool_size(&self) -> u32 {
        if self.is_memory() {
            1
        } else {
            self.pool_size.max(1)
        }
    }
}

/// Fluent builder for `SQLite` options.
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: String) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn pool_size(mut self, pool_size: u32) -> Self {
        self.opts.pool_size = pool_size;
        self
    }

    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.opts.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn wal(mut self, wal: bool) -> Self {
        self.opts.wal = wal;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Open the store.
    ///
    /// # Errors
    /// Returns `StoreError` if the pool cannot open its first connection.
    pub async fn build(self) -> Result<SqliteStore, StoreError> {
        SqliteStore::connect(self.finish()).await
    }
}

/// bb8 manager opening rusqlite connections off the async runtime.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: String,
    busy_timeout: Duration,
    wal: bool,
}

impl SqliteManager {
    #[must_use]
    pub fn new(opts: &SqliteOptions) -> Self {
        Self {
            path: opts.db_path.clone(),
            busy_timeout: Duration::from_millis(opts.busy_timeout_ms),
            wal: opts.wal && !opts.is_memory(),
        }
    }
}

impl bb8::ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = StoreError;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let path = self.path.clone();
        let busy_timeout = self.busy_timeout;
        let wal = self.wal;
        let conn = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&path)?;
            conn.busy_timeout(busy_timeout)?;
            if wal {
                // journal_mode answers with the mode now in effect
                let _mode: String =
                    conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            }
            Ok::<_, StoreError>(conn)
        })
        .await
        .map_err(|e| StoreError::ConnectionError(format!("sqlite open join error: {e}")))??;
        Ok(Arc::new(Mutex::new(conn)))
    }

    async fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        super::connection::run_blocking(Arc::clone(conn), |guard| {
            guard
                .query_row("SELECT 1", [], |_| Ok(()))
                .map_err(StoreError::SqliteError)
        })
        .await
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
