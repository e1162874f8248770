//! End-to-end processor tests over the seed tables.

use std::sync::Arc;

use tabula::query::{EntityExtractor, QueryExecutor, Status};
use tabula::{
    InterpreterSettings, QueryError, QueryIntent, QueryProcessor, TableStore, Value,
};

fn seeded_store() -> Arc<TableStore> {
    Arc::new(TableStore::seeded())
}

#[test]
fn test_extract_table_for_every_known_table() {
    let store = seeded_store();
    let extractor = EntityExtractor::new(store.clone(), &InterpreterSettings::default());

    for table in store.table_names() {
        let query = format!("show me all {}", table);
        assert_eq!(extractor.extract_table(&query).as_deref(), Ok(table));
    }
}

#[test]
fn test_unknown_tables_list_actual_names() {
    let processor = QueryProcessor::default();

    for text in [
        "Show me all invoices",
        "How many suppliers are there?",
        "What is the total amount of refunds",
        "filter sales_history where region is north",
        "filter orders where status is open",
        "show me orders where status equals open",
    ] {
        let err = processor.process_query(text).unwrap_err();
        assert!(
            matches!(err, QueryError::InvalidQuery(_)),
            "{text}: expected InvalidQueryError, got {err:?}"
        );
        assert_eq!(
            err.details()["available_tables"],
            serde_json::json!(["sales", "customers", "products"]),
            "{text}"
        );
    }
}

#[test]
fn test_select_all_returns_store_contents() {
    let store = seeded_store();
    let processor = QueryProcessor::new(store.clone(), InterpreterSettings::default());

    for table in store.table_names() {
        let response = processor
            .process_query(&format!("Show me all {}", table))
            .unwrap();
        let results = response.results.unwrap();
        assert_eq!(response.count, Some(results.len()));
        assert_eq!(results.as_slice(), store.get_table(table).unwrap());
    }
}

#[test]
fn test_count_equals_table_length() {
    let store = seeded_store();
    let processor = QueryProcessor::new(store.clone(), InterpreterSettings::default());

    for table in store.table_names() {
        let response = processor
            .process_query(&format!("How many {} do we have?", table))
            .unwrap();
        assert_eq!(response.query_type, QueryIntent::Count);
        assert_eq!(response.count, Some(store.get_table(table).unwrap().len()));
    }
}

#[test]
fn test_sum_of_seed_sales() {
    let response = QueryProcessor::default()
        .process_query("What is the total amount of sales")
        .unwrap();
    assert_eq!(response.total, Some(4450.0));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["query_type"], "sum");
    assert_eq!(json["column"], "amount");
    assert!(json.get("results").is_none());
}

#[test]
fn test_average_of_empty_table_warns() {
    let store = TableStore::from_schema(&tabula::SchemaConfig {
        tables: vec![tabula::TableDefinition {
            name: "returns".to_string(),
            columns: vec!["id".to_string(), "amount".to_string()],
            rows: Vec::new(),
        }],
    })
    .unwrap();
    let executor = QueryExecutor::new(Arc::new(store));

    let response = executor.average("returns", "amount").unwrap();
    assert_eq!(response.average, Some(0.0));
    assert_eq!(response.count, Some(0));
    assert_eq!(response.warning.as_deref(), Some("Table is empty"));
}

#[test]
fn test_filter_north_sales() {
    let response = QueryProcessor::default()
        .process_query("Show me all sales where region is North")
        .unwrap();

    assert_eq!(response.count, Some(2));
    let ids: Vec<Option<&Value>> = response
        .results
        .as_ref()
        .unwrap()
        .iter()
        .map(|r| r.get("id"))
        .collect();
    assert_eq!(ids, vec![Some(&Value::Integer(1)), Some(&Value::Integer(5))]);
}

#[test]
fn test_validate_missing_column() {
    let report = QueryProcessor::default().validate_query("show me all sales where color is red");

    assert!(!report.valid);
    assert_eq!(report.status, Status::Error);
    let issue = &report.issues[0];
    assert!(issue.message.contains("color"));
    assert_eq!(
        issue.available_columns.clone().unwrap(),
        vec!["id", "product", "amount", "date", "region"]
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["issues"][0]["kind"], "missing_column");
}

#[test]
fn test_explain_unparseable_query() {
    let payload = QueryProcessor::default().explain_query("!!!???");
    assert_eq!(payload.status, Status::Error);

    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"], "InvalidQueryError");
    assert_eq!(json["supported_query_types"].as_array().map(Vec::len), Some(5));
}

#[test]
fn test_processing_is_idempotent() {
    let processor = QueryProcessor::default();

    for text in [
        "Show me all sales",
        "How many customers do we have?",
        "What is the average price of products",
        "Show me all sales where region is North",
    ] {
        let first = processor.process_query(text).unwrap();
        let second = processor.process_query(text).unwrap();
        assert_eq!(first, second, "{text}");
    }

    let first = processor.process_query("What is the total price of sales").unwrap_err();
    let second = processor.process_query("What is the total price of sales").unwrap_err();
    assert_eq!(first, second);
}

#[test]
fn test_error_payload_shapes() {
    let processor = QueryProcessor::default();

    let invalid = processor.process_query("Tell me a joke").unwrap_err().to_json();
    assert_eq!(invalid["error"], "InvalidQueryError");
    assert_eq!(invalid["query"], "Tell me a joke");
    assert!(invalid["details"]["example_queries"].is_array());

    let database = processor
        .process_query("What is the total price of sales")
        .unwrap_err()
        .to_json();
    assert_eq!(database["error"], "DatabaseError");
    assert_eq!(database["operation"], "sum");
    assert_eq!(database["table"], "sales");
    assert_eq!(database["details"]["column"], "price");
}

#[test]
fn test_sum_precedence_over_filter() {
    // Both predicates match; sum is evaluated first
    let response = QueryProcessor::default()
        .process_query("What is the total amount of sales where region is north")
        .unwrap();
    assert_eq!(response.query_type, QueryIntent::Sum);
    assert_eq!(response.total, Some(4450.0));
}
