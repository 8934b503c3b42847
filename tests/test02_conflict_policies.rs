#![cfg(feature = "sqlite")]

mod common;

use std::sync::Arc;

use common::{Widget, file_store};
use sql_tables::prelude::*;

async fn table_with(policy: ConflictPolicy, prefix: &str) -> Result<Table<Widget>, Box<dyn std::error::Error>> {
    let mut table = Table::<Widget>::new(Some("widgets"), policy)?;
    table.initialize(Arc::new(file_store(prefix).await?)).await?;
    Ok(table)
}

#[test]
fn rejecting_policies_raise_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        for policy in [ConflictPolicy::Fail, ConflictPolicy::Abort, ConflictPolicy::Rollback] {
            let table = table_with(policy, &format!("{policy:?}").to_lowercase()).await?;
            assert_eq!(table.insert(&Widget::new(1, "first")).await?, 1);

            let err = table.insert(&Widget::new(1, "second")).await.unwrap_err();
            assert!(matches!(err, TableError::Conflict { .. }), "{policy:?}: {err}");
            assert_eq!(table.get(1).await?, Some(Widget::new(1, "first")));
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn ignore_keeps_the_first_row() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let table = table_with(ConflictPolicy::Ignore, "ignore").await?;
        assert_eq!(table.insert(&Widget::new(1, "first")).await?, 1);
        assert_eq!(table.insert(&Widget::new(1, "second")).await?, 0);
        assert_eq!(table.get(1).await?, Some(Widget::new(1, "first")));
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn replace_keeps_the_second_row() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let table = table_with(ConflictPolicy::Replace, "replace").await?;
        table.insert(&Widget::new(1, "first")).await?;
        table.insert(&Widget::new(1, "second")).await?;
        assert_eq!(table.get(1).await?, Some(Widget::new(1, "second")));
        assert_eq!(table.query_where("", &[]).await?.len(), 1);
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn unique_index_violation_is_a_conflict() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let table = table_with(ConflictPolicy::Fail, "unique_index").await?;
        table.create_index("name", "Name", true).await?;
        table.insert(&Widget::new(1, "bolt")).await?;

        let err = table.insert(&Widget::new(2, "bolt")).await.unwrap_err();
        assert!(matches!(err, TableError::Conflict { .. }));
        assert_eq!(table.get(2).await?, None);
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn other_insert_failures_are_connection_errors() -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = file_store("drop_table").await?;
        let mut table = Table::<Widget>::new(Some("widgets"), ConflictPolicy::Fail)?;
        table.initialize(Arc::new(store.clone())).await?;
        store.execute("DROP TABLE \"widgets\"", &[]).await?;

        let err = table.insert(&Widget::new(1, "a")).await.unwrap_err();
        assert!(matches!(
            err,
            TableError::Connection { kind: StatementKind::Insert, .. }
        ));
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

#[test]
fn postgres_cannot_express_fail_or_rollback() {
    for policy in [ConflictPolicy::Fail, ConflictPolicy::Rollback] {
        let err = Table::<Widget>::builder()
            .dialect(Dialect::Postgres)
            .policy(policy)
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::Config(_)), "{policy:?}");
    }
    for policy in [ConflictPolicy::Abort, ConflictPolicy::Ignore, ConflictPolicy::Replace] {
        let table = Table::<Widget>::builder()
            .dialect(Dialect::Postgres)
            .policy(policy)
            .build()
            .unwrap();
        assert!(table.inserter().contains("$2"));
    }
}

#[test]
fn policy_can_be_read_from_config() {
    let opts: TableOptions = serde_json::from_str(
        r#"{ "name": "widgets", "policy": "ignore", "indexes": [{ "name": "name", "column": "Name", "unique": false }] }"#,
    )
    .unwrap();
    let table = Table::<Widget>::from_options(opts).unwrap();
    assert_eq!(table.policy(), ConflictPolicy::Ignore);
    assert_eq!(table.dialect(), Dialect::Sqlite);
    assert!(table.inserter().starts_with("INSERT OR IGNORE INTO \"widgets\""));
    assert_eq!(table.indexes().len(), 1);
}
