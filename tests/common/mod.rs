#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sql_tables::prelude::*;
use tempfile::tempdir;

#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: i64,
    pub name: String,
}

sql_tables::impl_entity!(Widget {
    id: i64 => "Id",
    name: String => "Name",
});

impl Widget {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// One field of every supported column type.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: i64,
    pub label: String,
    pub weight: f64,
    pub count: i32,
    pub active: bool,
    pub taken_at: NaiveDateTime,
    pub payload: Vec<u8>,
    pub meta: serde_json::Value,
    pub note: Option<String>,
}

sql_tables::impl_entity!(Sample {
    id: i64 => "Id",
    label: String => "Label",
    weight: f64 => "Weight",
    count: i32 => "Count",
    active: bool => "Active",
    taken_at: NaiveDateTime => "TakenAt",
    payload: Vec<u8> => "Payload",
    meta: serde_json::Value => "Meta",
    note: Option<String> => "Note",
});

pub fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

pub async fn file_store(prefix: &str) -> Result<SqliteStore, StoreError> {
    SqliteStore::connect(SqliteOptions::new(unique_db_path(prefix))).await
}

/// A store call seen by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Execute(String),
    Batch(Vec<String>),
    Query(String),
}

/// Passes every call through to a SQLite store and records the SQL it was given.
///
/// With `fail_batches` set, `execute_batch` fails without reaching the store.
pub struct RecordingStore {
    inner: SqliteStore,
    calls: Mutex<Vec<Call>>,
    fail_batches: bool,
}

impl RecordingStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_batches: false,
        }
    }

    pub fn failing_batches(inner: SqliteStore) -> Self {
        Self {
            fail_batches: true,
            ..Self::new(inner)
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StoreConnection for RecordingStore {
    fn dialect(&self) -> Dialect {
        self.inner.dialect()
    }

    async fn execute(&self, sql: &str, params: &[RowValues]) -> Result<usize, StoreError> {
        self.record(Call::Execute(sql.to_string()));
        self.inner.execute(sql, params).await
    }

    async fn execute_batch(&self, batch: &[QueryAndParams]) -> Result<(), StoreError> {
        self.record(Call::Batch(batch.iter().map(|qp| qp.query.clone()).collect()));
        if self.fail_batches {
            return Err(StoreError::ExecutionError("batch refused".into()));
        }
        self.inner.execute_batch(batch).await
    }

    async fn query(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, StoreError> {
        self.record(Call::Query(sql.to_string()));
        self.inner.query(sql, params).await
    }
}

/// Count rows in `sqlite_master` of `kind` named `name`.
pub async fn schema_objects(store: &SqliteStore, kind: &str, name: &str) -> Result<i64, StoreError> {
    let rs = store
        .query(
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = ?1 AND name = ?2",
            &[RowValues::Text(kind.into()), RowValues::Text(name.into())],
        )
        .await?;
    Ok(*rs.results[0].get("n").and_then(RowValues::as_int).unwrap_or(&0))
}
