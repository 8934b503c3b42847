#![cfg(feature = "sqlite")]

mod common;

use std::sync::Arc;

use common::{Call, RecordingStore, Widget, file_store};
use sql_tables::prelude::*;

#[test]
fn delete_all_leaves_the_control_set_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = Arc::new(RecordingStore::new(file_store("delete_all").await?));
        let mut table = Table::<Widget>::new(Some("widgets"), ConflictPolicy::Fail)?;
        table.initialize(store.clone()).await?;
        for id in 1..=10 {
            table.insert(&Widget::new(id, &format!("w{id}"))).await?;
        }
        store.clear();

        let doomed = [2, 4, 6, 8, 42];
        table.delete_all(&doomed).await?;

        // one batch, one reused deleter per key
        let deleter = table.deleter().to_string();
        assert_eq!(store.calls(), vec![Call::Batch(vec![deleter; doomed.len()])]);

        for id in 1..=10 {
            let found = table.get(id).await?;
            assert_eq!(found.is_none(), doomed.contains(&id), "id {id}");
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn empty_delete_all_makes_no_store_call() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = Arc::new(RecordingStore::new(file_store("delete_none").await?));
        let mut table = Table::<Widget>::new(Some("widgets"), ConflictPolicy::Fail)?;
        table.initialize(store.clone()).await?;
        store.clear();

        table.delete_all(&[]).await?;
        assert!(store.calls().is_empty());
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn failed_batch_is_reported_as_a_delete_failure() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = Arc::new(RecordingStore::failing_batches(file_store("delete_fail").await?));
        let mut table = Table::<Widget>::new(Some("widgets"), ConflictPolicy::Fail)?;
        table.initialize(store.clone()).await?;
        table.insert(&Widget::new(1, "a")).await?;

        let err = table.delete_all(&[1]).await.unwrap_err();
        assert!(matches!(
            err,
            TableError::Connection { kind: StatementKind::Delete, .. }
        ));
        assert_eq!(table.get(1).await?, Some(Widget::new(1, "a")));
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn sqlite_batches_apply_all_or_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = file_store("batch_atomic").await?;
        let mut table = Table::<Widget>::new(Some("widgets"), ConflictPolicy::Fail)?;
        table.initialize(Arc::new(store.clone())).await?;
        table.insert(&Widget::new(1, "a")).await?;
        table.insert(&Widget::new(2, "b")).await?;

        let batch = vec![
            QueryAndParams::new(table.deleter(), vec![RowValues::Int(1)]),
            QueryAndParams::new("DELETE FROM \"missing\" WHERE \"Id\" = ?1", vec![RowValues::Int(2)]),
        ];
        assert!(store.execute_batch(&batch).await.is_err());
        assert_eq!(table.get(1).await?, Some(Widget::new(1, "a")));
        assert_eq!(table.get(2).await?, Some(Widget::new(2, "b")));
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
