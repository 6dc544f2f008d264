//! Dispatcher behaviour over a real in-memory store.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use tabula::store::{DataStore, TableImport};
use tabula::tool::Dispatcher;
use tabula::tools::database_registry;

fn rows(values: Value) -> Vec<Map<String, Value>> {
    serde_json::from_value(values).expect("rows")
}

async fn dispatcher_with_sales(n: i64) -> anyhow::Result<Dispatcher> {
    let store = Arc::new(DataStore::in_memory()?);
    let records: Vec<Value> = (1..=n)
        .map(|i| json!({"id": i, "region": if i % 2 == 0 { "south" } else { "north" }, "amount": i * 10}))
        .collect();
    store
        .import_table(TableImport::new("sales", rows(Value::Array(records))))
        .await?;
    Ok(Dispatcher::new(database_registry(), store))
}

#[tokio::test]
async fn non_select_is_rejected_before_the_store() -> anyhow::Result<()> {
    let dispatcher = dispatcher_with_sales(3).await?;
    for query in ["DELETE FROM sales", "PRAGMA writable_schema = 1", "  update sales set amount = 0"] {
        let out = dispatcher
            .dispatch("execute_select_query", &json!({ "query": query }))
            .await;
        assert_eq!(
            out,
            json!({"success": false, "error": "Only SELECT queries are allowed"}),
            "{query}"
        );
    }
    assert_eq!(dispatcher.store().row_count("sales").await?, 3);
    Ok(())
}

#[tokio::test]
async fn stacked_drop_is_rejected_and_table_survives() -> anyhow::Result<()> {
    let dispatcher = dispatcher_with_sales(3).await?;
    let out = dispatcher
        .dispatch(
            "execute_select_query",
            &json!({"query": "SELECT * FROM sales; DROP TABLE sales"}),
        )
        .await;
    assert_eq!(out["success"], false);
    assert_eq!(out["error"], "Query contains forbidden keyword: DROP");
    assert!(dispatcher.store().table_exists("sales").await?);
    Ok(())
}

#[tokio::test]
async fn valid_select_reports_rows_and_columns() -> anyhow::Result<()> {
    let dispatcher = dispatcher_with_sales(4).await?;
    let out = dispatcher
        .dispatch(
            "execute_select_query",
            &json!({"query": "SELECT region, amount, id FROM sales WHERE region = 'north'"}),
        )
        .await;
    assert_eq!(out["success"], true);
    assert_eq!(out["columns"], json!(["region", "amount", "id"]));
    let data = out["data"].as_array().expect("data array");
    assert_eq!(out["row_count"], json!(data.len()));
    assert_eq!(data.len(), 2);
    Ok(())
}

#[tokio::test]
async fn sql_errors_are_results_not_failures() -> anyhow::Result<()> {
    let dispatcher = dispatcher_with_sales(1).await?;
    let out = dispatcher
        .dispatch("execute_select_query", &json!({"query": "SELECT nope FROM missing"}))
        .await;
    assert_eq!(out["success"], false);
    assert!(out["error"].as_str().is_some_and(|e| e.contains("missing")));
    Ok(())
}

#[tokio::test]
async fn sample_returns_min_of_rows_and_limit_in_order() -> anyhow::Result<()> {
    for (n, k) in [(3_i64, 5_i64), (8, 5), (8, 1)] {
        let dispatcher = dispatcher_with_sales(n).await?;
        let out = dispatcher
            .dispatch("get_table_sample", &json!({"table_name": "sales", "limit": k}))
            .await;
        let ids: Vec<i64> = out["data"]
            .as_array()
            .expect("data array")
            .iter()
            .filter_map(|r| r["id"].as_i64())
            .collect();
        let expected: Vec<i64> = (1..=n.min(k)).collect();
        assert_eq!(ids, expected, "n={n} k={k}");
    }
    Ok(())
}

#[tokio::test]
async fn sample_uses_default_limit() -> anyhow::Result<()> {
    let dispatcher = dispatcher_with_sales(9).await?;
    let out = dispatcher
        .dispatch("get_table_sample", &json!({"table_name": "sales"}))
        .await;
    assert_eq!(out["row_count"], 5);
    Ok(())
}

#[tokio::test]
async fn list_tables_is_idempotent() -> anyhow::Result<()> {
    let dispatcher = dispatcher_with_sales(2).await?;
    let first = dispatcher.dispatch("list_tables", &json!({})).await;
    let second = dispatcher.dispatch("list_tables", &json!({})).await;
    assert_eq!(first, second);
    assert_eq!(first, json!({"success": true, "tables": ["sales"], "count": 1}));
    Ok(())
}

#[tokio::test]
async fn schema_statistics_and_context() -> anyhow::Result<()> {
    let dispatcher = dispatcher_with_sales(2).await?;

    let schema = dispatcher
        .dispatch("get_table_schema", &json!({"table_name": "sales"}))
        .await;
    assert_eq!(schema["columns"][0]["name"], "id");
    assert_eq!(schema["columns"][0]["type"], "INTEGER");

    let stats = dispatcher
        .dispatch("get_table_statistics", &json!({"table_name": "sales"}))
        .await;
    assert_eq!(stats["row_count"], 2);
    assert_eq!(stats["column_count"], 3);

    let context = dispatcher
        .dispatch(
            "get_database_context",
            &json!({"include_samples": true, "sample_limit": 1}),
        )
        .await;
    assert_eq!(context["success"], true);
    assert_eq!(context["table_count"], 1);
    assert_eq!(context["tables"][0]["sample_data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn bad_arguments_and_identifiers_are_reported() -> anyhow::Result<()> {
    let dispatcher = dispatcher_with_sales(1).await?;
    let cases = [
        ("get_table_schema", json!({}), "missing required parameter 'table_name'"),
        ("get_table_sample", json!({"table_name": "sales", "limit": 5000}), "between 1 and 1000"),
        ("list_tables", json!({"extra": 1}), "unexpected parameter 'extra'"),
        ("get_table_schema", json!({"table_name": "sales\"; --"}), "invalid table name"),
        ("get_table_schema", json!({"table_name": "nope"}), "does not exist"),
        ("frobnicate", json!({}), "unknown function: frobnicate"),
    ];
    for (name, args, expected) in cases {
        let out = dispatcher.dispatch(name, &args).await;
        assert_eq!(out["success"], false, "{name} {args}");
        let error = out["error"].as_str().unwrap_or_default();
        assert!(error.contains(expected), "{name} {args}: {error}");
    }
    Ok(())
}
