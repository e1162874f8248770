//! Processors built from TOML configuration files.

use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

use tabula::{
    Config, ConfigError, FilterDetection, QueryIntent, QueryProcessor, TabulaError, Value,
};

/// Write `content` to a config file inside `dir`.
fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("tabula.toml");
    let mut file = File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

const SHOP_CONFIG: &str = r#"
[interpreter]
aggregate_columns = ["amount"]

[interpreter.synonyms]
amount = ["spend", "takings"]

[[schema.tables]]
name = "orders"
columns = ["id", "customer", "amount", "status"]
rows = [
    [1, "alice", 19.5, "Open"],
    [2, "bob", 5, "closed"],
    [3, "carol", 30, "open"],
]

[[schema.tables]]
name = "refunds"
columns = ["id", "amount"]
"#;

fn shop_processor(dir: &TempDir) -> QueryProcessor {
    let config = Config::from_file(write_config(dir, SHOP_CONFIG)).unwrap();
    QueryProcessor::from_config(&config).unwrap()
}

#[test]
fn test_tables_follow_declaration_order() {
    let dir = TempDir::new().unwrap();
    let processor = shop_processor(&dir);
    assert_eq!(processor.table_names(), vec!["orders", "refunds"]);
    assert_eq!(
        processor.store().table_columns("refunds").unwrap(),
        &["id".to_string(), "amount".to_string()]
    );
}

#[test]
fn test_mixed_numeric_sum() {
    let dir = TempDir::new().unwrap();
    let response = shop_processor(&dir)
        .process_query("What is the total amount of orders")
        .unwrap();
    assert_eq!(response.total, Some(54.5));
}

#[test]
fn test_custom_synonym_resolves_column() {
    let dir = TempDir::new().unwrap();
    let response = shop_processor(&dir)
        .process_query("What is the average spend across orders")
        .unwrap();
    assert_eq!(response.query_type, QueryIntent::Average);
    assert_eq!(response.column.as_deref(), Some("amount"));
    assert_eq!(response.count, Some(3));
}

#[test]
fn test_average_of_empty_configured_table() {
    let dir = TempDir::new().unwrap();
    let response = shop_processor(&dir)
        .process_query("What is the average amount of refunds")
        .unwrap();
    assert_eq!(response.average, Some(0.0));
    assert_eq!(response.count, Some(0));
    assert_eq!(response.warning.as_deref(), Some("Table is empty"));
}

#[test]
fn test_filter_configured_table() {
    let dir = TempDir::new().unwrap();
    let response = shop_processor(&dir)
        .process_query("filter orders where status is OPEN")
        .unwrap();

    assert_eq!(response.count, Some(2));
    let customers: Vec<&Value> = response
        .results
        .as_ref()
        .unwrap()
        .iter()
        .filter_map(|r| r.get("customer"))
        .collect();
    assert_eq!(customers, vec![&Value::from("alice"), &Value::from("carol")]);
}

#[test]
fn test_mixed_case_names_match_queries() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[[schema.tables]]
name = "Orders"
columns = ["ID", "Status"]
rows = [
    [1, "Open"],
    [2, "closed"],
]
"#,
    );
    let config = Config::from_file(&path).unwrap();
    let processor = QueryProcessor::from_config(&config).unwrap();
    assert_eq!(processor.table_names(), vec!["orders"]);

    let response = processor.process_query("show me all Orders").unwrap();
    assert_eq!(response.query_type, QueryIntent::SelectAll);
    assert_eq!(response.count, Some(2));

    let response = processor
        .process_query("How many Orders do we have?")
        .unwrap();
    assert_eq!(response.count, Some(2));

    let response = processor
        .process_query("filter Orders where Status is open")
        .unwrap();
    assert_eq!(response.query_type, QueryIntent::Filter);
    assert_eq!(response.count, Some(1));
    let ids: Vec<Option<&Value>> = response
        .results
        .as_ref()
        .unwrap()
        .iter()
        .map(|r| r.get("id"))
        .collect();
    assert_eq!(ids, vec![Some(&Value::Integer(1))]);
}

#[test]
fn test_seed_tables_unknown_to_custom_schema() {
    let dir = TempDir::new().unwrap();
    let err = shop_processor(&dir)
        .process_query("How many customers do we have?")
        .unwrap_err();
    assert_eq!(
        err.details()["available_tables"],
        serde_json::json!(["orders", "refunds"])
    );
}

#[test]
fn test_keyword_filter_detection_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[interpreter]
filter_detection = "keyword"
"#,
    );

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.interpreter.filter_detection, FilterDetection::Keyword);

    let processor = QueryProcessor::from_config(&config).unwrap();
    // Without a condition the keyword alone still selects filter
    let err = processor
        .process_query("what is the average amount of sales")
        .unwrap_err();
    assert_eq!(err.message(), "Could not parse filter condition from query");
}

#[test]
fn test_ragged_rows_rejected() {
    let config = Config::from_str(
        r#"
[[schema.tables]]
name = "orders"
columns = ["id", "amount"]
rows = [[1, 10], [2]]
"#,
    )
    .unwrap();

    assert!(matches!(
        QueryProcessor::from_config(&config),
        Err(TabulaError::Config(ConfigError::Invalid(_)))
    ));
}

#[test]
fn test_duplicate_tables_rejected() {
    let config = Config::from_str(
        r#"
[[schema.tables]]
name = "orders"
columns = ["id"]

[[schema.tables]]
name = "orders"
columns = ["id"]
"#,
    )
    .unwrap();

    assert!(QueryProcessor::from_config(&config).is_err());
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let result = Config::from_file(dir.path().join("absent.toml"));
    assert!(matches!(
        result,
        Err(TabulaError::Config(ConfigError::ReadFile(_)))
    ));
}
