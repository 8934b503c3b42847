#![cfg(feature = "sqlite")]

mod common;

use std::sync::Arc;

use common::{Widget, file_store, schema_objects};
use sql_tables::prelude::*;

#[test]
fn create_index_twice_leaves_one_index() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = file_store("index_twice").await?;
        let mut table = Table::<Widget>::new(Some("widgets"), ConflictPolicy::Fail)?;
        table.initialize(Arc::new(store.clone())).await?;

        table.create_index("name", "Name", false).await?;
        table.create_index("name", "Name", false).await?;
        assert_eq!(schema_objects(&store, "index", "widgets_IX_name").await?, 1);
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn declared_indexes_are_created_by_initialize() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = file_store("declared_index").await?;
        let mut table = Table::<Widget>::builder()
            .name("widgets")
            .index("name", "Name", true)
            .build()?;
        table.initialize(Arc::new(store.clone())).await?;
        table.initialize(Arc::new(store.clone())).await?;

        assert_eq!(schema_objects(&store, "index", "widgets_IX_name").await?, 1);
        table.insert(&Widget::new(1, "bolt")).await?;
        assert!(matches!(
            table.insert(&Widget::new(2, "bolt")).await,
            Err(TableError::Conflict { .. })
        ));
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn bad_index_column_is_an_index_failure() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut table = Table::<Widget>::new(Some("widgets"), ConflictPolicy::Fail)?;
        table.initialize(Arc::new(file_store("bad_index").await?)).await?;

        let err = table.create_index("nope", "NoSuchColumn", false).await.unwrap_err();
        assert_eq!(err.statement_kind(), Some(StatementKind::Index));
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn declared_indexes_follow_a_rename() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = file_store("index_rename").await?;
        let mut table = Table::<Widget>::builder()
            .name("widgets")
            .index("name", "Name", true)
            .build()?;
        table.initialize(Arc::new(store.clone())).await?;
        table.insert(&Widget::new(1, "bolt")).await?;

        table.rename("gadgets").await?;
        table.initialize(Arc::new(store.clone())).await?;

        let rs = store
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 ORDER BY name",
                &[RowValues::Text("gadgets".into())],
            )
            .await?;
        let names: Vec<&str> = rs
            .results
            .iter()
            .filter_map(|row| row.get("name").and_then(RowValues::as_text))
            .collect();
        assert_eq!(names, vec!["gadgets_IX_name"]);
        assert_eq!(schema_objects(&store, "index", "widgets_IX_name").await?, 0);

        // the recreated index still enforces uniqueness
        assert!(matches!(
            table.insert(&Widget::new(2, "bolt")).await,
            Err(TableError::Conflict { .. })
        ));
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
