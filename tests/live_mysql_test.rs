// Integration tests against a live MySQL server.
//
// Ignored by default. Point them at a disposable database and run with:
//   MYSQL_TEST_HOST=127.0.0.1 MYSQL_TEST_USER=root MYSQL_TEST_PASSWORD=secret \
//   MYSQL_TEST_DB=mcp_test cargo test --test live_mysql_test -- --ignored --test-threads=1

use std::time::Duration;

use mcp_mysql::db::types::QueryResult;
use mcp_mysql::{ConnectionProvider, DatabaseConfig, DatabaseError, DatabaseTools};
use serde_json::json;

fn test_config() -> DatabaseConfig {
    let var = |name: &str| std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set"));
    let port = std::env::var("MYSQL_TEST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3306);

    DatabaseConfig::new(
        var("MYSQL_TEST_HOST"),
        var("MYSQL_TEST_USER"),
        var("MYSQL_TEST_PASSWORD"),
        var("MYSQL_TEST_DB"),
    )
    .with_port(port)
}

fn test_db() -> String {
    std::env::var("MYSQL_TEST_DB").expect("MYSQL_TEST_DB must be set")
}

async fn tools_with(pool_size: u32, acquire_timeout: Duration) -> DatabaseTools {
    let config = test_config()
        .with_pool_size(pool_size)
        .with_acquire_timeout(acquire_timeout);
    let provider = ConnectionProvider::connect(&config)
        .await
        .expect("Failed to connect to test database");
    DatabaseTools::new(provider)
}

async fn run(tools: &DatabaseTools, sql: &str) -> QueryResult {
    tools
        .run_query(sql)
        .await
        .unwrap_or_else(|e| panic!("{sql}: {e}"))
}

#[tokio::test]
#[ignore]
async fn test_select_literal_returns_columns_and_rows() {
    let tools = tools_with(2, Duration::from_secs(5)).await;

    let result = run(&tools, "SELECT 1 AS x").await;

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"columns": ["x"], "rows": [{"x": 1}]})
    );
}

#[tokio::test]
#[ignore]
async fn test_empty_select_still_reports_columns() {
    let tools = tools_with(2, Duration::from_secs(5)).await;

    let result = run(&tools, "SELECT 1 AS a, 'b' AS b FROM DUAL WHERE 1 = 0").await;

    assert_eq!(
        result,
        QueryResult::Rows {
            columns: vec!["a".to_string(), "b".to_string()],
            rows: Vec::new(),
        }
    );
}

#[tokio::test]
#[ignore]
async fn test_mutations_report_rows_affected_and_commit() {
    let tools = tools_with(2, Duration::from_secs(5)).await;
    run(&tools, "DROP TABLE IF EXISTS mcp_scratch").await;
    run(&tools, "CREATE TABLE mcp_scratch (id INT PRIMARY KEY, c INT)").await;

    let updated = run(&tools, "UPDATE mcp_scratch SET c = 1 WHERE id = 999").await;
    assert_eq!(updated, QueryResult::Mutation { rows_affected: 0 });

    let inserted = run(&tools, "INSERT INTO mcp_scratch VALUES (1, 10), (2, 20)").await;
    assert_eq!(inserted, QueryResult::Mutation { rows_affected: 2 });

    // Released connections roll back, so rows only survive if committed
    let selected = run(&tools, "SELECT id, c FROM mcp_scratch ORDER BY id").await;
    assert_eq!(
        serde_json::to_value(&selected).unwrap(),
        json!({"columns": ["id", "c"], "rows": [{"id": 1, "c": 10}, {"id": 2, "c": 20}]})
    );

    run(&tools, "DROP TABLE mcp_scratch").await;
}

#[tokio::test]
#[ignore]
async fn test_procedure_call_returns_its_rows() {
    let tools = tools_with(2, Duration::from_secs(5)).await;
    run(&tools, "DROP PROCEDURE IF EXISTS mcp_rows").await;
    run(&tools, "CREATE PROCEDURE mcp_rows() SELECT 7 AS seven").await;

    let result = run(&tools, "CALL mcp_rows()").await;

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"columns": ["seven"], "rows": [{"seven": 7}]})
    );

    run(&tools, "DROP PROCEDURE mcp_rows").await;
}

#[tokio::test]
#[ignore]
async fn test_typed_values_render_as_json() {
    let tools = tools_with(2, Duration::from_secs(5)).await;

    let result = run(
        &tools,
        "SELECT
            CAST('2024-01-02' AS DATE) AS d,
            CAST('2024-01-02 03:04:05' AS DATETIME) AS dt,
            CAST(12.50 AS DECIMAL(6,2)) AS amount,
            JSON_OBJECT('a', 1) AS doc,
            CAST(x'00ff' AS BINARY(2)) AS raw,
            TIMEDIFF('2024-01-03 00:00:00', '2024-01-01 00:00:00') AS long_span,
            CAST('-01:30:00' AS TIME) AS negative_span,
            NULL AS missing,
            CAST(18446744073709551615 AS UNSIGNED) AS big",
    )
    .await;

    let QueryResult::Rows { rows, .. } = result else {
        panic!("expected rows, got {result:?}");
    };
    let row = &rows[0];
    assert_eq!(row["d"], json!("2024-01-02"));
    assert_eq!(row["dt"], json!("2024-01-02 03:04:05"));
    assert_eq!(row["amount"], json!("12.50"));
    assert_eq!(row["doc"], json!({"a": 1}));
    assert_eq!(row["raw"], json!("AP8="));
    assert_eq!(row["missing"], json!(null));
    assert_eq!(row["big"], json!(u64::MAX));

    let long_span = row["long_span"].as_str().unwrap();
    assert!(long_span.starts_with("48:00:00"), "{long_span}");
    let negative_span = row["negative_span"].as_str().unwrap();
    assert!(
        negative_span.starts_with('-') && negative_span.contains("01:30:00"),
        "{negative_span}"
    );
}

#[tokio::test]
#[ignore]
async fn test_bit_columns_render_as_base64() {
    let tools = tools_with(2, Duration::from_secs(5)).await;
    run(&tools, "DROP TABLE IF EXISTS mcp_flags").await;
    run(&tools, "CREATE TABLE mcp_flags (id INT PRIMARY KEY, bits BIT(8))").await;
    run(&tools, "INSERT INTO mcp_flags VALUES (1, b'00000101')").await;

    let result = run(&tools, "SELECT bits FROM mcp_flags").await;

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({"columns": ["bits"], "rows": [{"bits": "BQ=="}]})
    );

    run(&tools, "DROP TABLE mcp_flags").await;
}

#[tokio::test]
#[ignore]
async fn test_describe_missing_table_is_empty() {
    let tools = tools_with(2, Duration::from_secs(5)).await;

    let columns = tools
        .describe_table(&test_db(), "no_such_table_anywhere")
        .await
        .unwrap();
    assert!(columns.is_empty());

    let relationships = tools
        .describe_indexes_and_foreign_keys(&test_db(), "no_such_table_anywhere")
        .await
        .unwrap();
    assert!(relationships.indexes.is_empty());
    assert!(relationships.foreign_keys_outbound.is_empty());
    assert!(relationships.foreign_keys_inbound.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_describes_columns_indexes_and_foreign_keys() {
    let tools = tools_with(2, Duration::from_secs(5)).await;
    let schema = test_db();

    run(&tools, "DROP TABLE IF EXISTS mcp_child").await;
    run(&tools, "DROP TABLE IF EXISTS mcp_parent").await;
    run(
        &tools,
        "CREATE TABLE mcp_parent (id INT, region CHAR(2), PRIMARY KEY (id, region))",
    )
    .await;
    run(
        &tools,
        "CREATE TABLE mcp_child (
            id INT PRIMARY KEY,
            parent_id INT NOT NULL,
            parent_region CHAR(2) NOT NULL,
            note VARCHAR(40) NULL,
            KEY idx_note (note),
            CONSTRAINT fk_parent FOREIGN KEY (parent_id, parent_region)
                REFERENCES mcp_parent (id, region)
        )",
    )
    .await;

    let columns = tools.describe_table(&schema, "mcp_child").await.unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "parent_id", "parent_region", "note"]);
    assert!(!columns[1].nullable);
    assert!(columns[3].nullable);
    assert_eq!(columns[3].data_type, "varchar");
    assert_eq!(columns[3].max_length, Some(40));
    assert_eq!(columns[0].max_length, None);

    let relationships = tools
        .describe_indexes_and_foreign_keys(&schema, "mcp_child")
        .await
        .unwrap();

    let primary = relationships
        .indexes
        .iter()
        .find(|i| i.name == "PRIMARY")
        .expect("primary key index");
    assert!(primary.is_primary_or_unique);

    let note = relationships
        .indexes
        .iter()
        .find(|i| i.name == "idx_note")
        .expect("idx_note index");
    assert!(!note.is_primary_or_unique);
    assert_eq!(note.columns[0].name.as_deref(), Some("note"));

    assert_eq!(relationships.foreign_keys_outbound.len(), 1);
    let outbound = &relationships.foreign_keys_outbound[0];
    assert_eq!(outbound.name, "fk_parent");
    assert_eq!(outbound.target_table, "mcp_parent");
    let pairs: Vec<(&str, &str)> = outbound
        .columns
        .iter()
        .map(|c| (c.column.as_str(), c.references.as_str()))
        .collect();
    assert_eq!(pairs, [("parent_id", "id"), ("parent_region", "region")]);

    assert_eq!(relationships.foreign_keys_inbound.len(), 1);
    assert_eq!(relationships.foreign_keys_inbound[0].columns, outbound.columns);

    run(&tools, "DROP TABLE mcp_child").await;
    run(&tools, "DROP TABLE mcp_parent").await;
}

#[tokio::test]
#[ignore]
async fn test_exhausted_pool_fails_within_timeout() {
    let timeout = Duration::from_millis(300);
    let tools = tools_with(1, timeout).await;

    let held = tools.provider().acquire().await.unwrap();
    let started = std::time::Instant::now();
    let err = tools.run_query("SELECT 1").await.unwrap_err();

    assert!(matches!(err, DatabaseError::PoolExhausted(_)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
    drop(held);
}

#[tokio::test]
#[ignore]
async fn test_connection_released_after_success_and_failure() {
    // One connection and a short timeout: a leaked connection makes the next call fail
    let tools = tools_with(1, Duration::from_secs(2)).await;

    run(&tools, "SELECT 1").await;

    let err = tools.run_query("SELEC broken syntax").await.unwrap_err();
    assert!(matches!(err, DatabaseError::QueryExecution(_)), "got {err:?}");

    let err = tools
        .describe_table("no_such_schema", "t")
        .await
        .map(|columns| columns.len());
    assert_eq!(err.unwrap(), 0);

    run(&tools, "SELECT 2").await;
    assert!(tools.provider().status().size <= 1);
}
