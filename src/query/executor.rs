//! Query Executor.
//!
//! Runs a parsed query against the table store and shapes the response.

use std::sync::Arc;

use crate::error::ExecutionError;
use crate::store::{Record, Table, TableStore};

use super::types::*;

/// Warning attached to averages over empty tables.
pub const EMPTY_TABLE_WARNING: &str = "Table is empty";

// ============================================================================
// Query Executor
// ============================================================================

/// Executes parsed queries. Holds no state besides the read-only store.
pub struct QueryExecutor {
    store: Arc<TableStore>,
}

impl QueryExecutor {
    pub fn new(store: Arc<TableStore>) -> Self {
        Self { store }
    }

    /// Dispatch on the query's intent.
    pub fn execute(&self, parsed: &ParsedQuery) -> Result<QueryResponse, ExecutionError> {
        match (&parsed.intent, &parsed.entities) {
            (QueryIntent::SelectAll, ExtractedEntities::Table { table }) => self.select_all(table),
            (QueryIntent::Count, ExtractedEntities::Table { table }) => self.count(table),
            (QueryIntent::Sum, ExtractedEntities::Aggregate { table, column }) => {
                self.sum(table, column)
            }
            (QueryIntent::Average, ExtractedEntities::Aggregate { table, column }) => {
                self.average(table, column)
            }
            (
                QueryIntent::Filter,
                ExtractedEntities::Filter {
                    table,
                    column,
                    value,
                },
            ) => self.filter(table, column, value),
            (intent, entities) => Err(ExecutionError::EntityMismatch {
                table: entities.table().to_string(),
                intent: *intent,
            }),
        }
    }

    /// Every record of `table`, in store order.
    pub fn select_all(&self, table: &str) -> Result<QueryResponse, ExecutionError> {
        let table = self.table(table)?;
        tracing::info!(table = table.name(), rows = table.records().len(), "select_all");
        Ok(QueryResponse::new(QueryIntent::SelectAll, table.name())
            .with_results(table.records().to_vec()))
    }

    pub fn count(&self, table: &str) -> Result<QueryResponse, ExecutionError> {
        let table = self.table(table)?;
        let count = table.records().len();
        tracing::info!(table = table.name(), count, "count");
        Ok(QueryResponse::new(QueryIntent::Count, table.name()).with_count(count))
    }

    pub fn sum(&self, table: &str, column: &str) -> Result<QueryResponse, ExecutionError> {
        let table = self.table(table)?;
        let total = numeric_total(table, column)?;
        tracing::info!(table = table.name(), column, total, "sum");
        Ok(QueryResponse::new(QueryIntent::Sum, table.name())
            .with_column(column)
            .with_total(total))
    }

    /// Mean of `column`; an empty table yields 0 with a warning.
    pub fn average(&self, table: &str, column: &str) -> Result<QueryResponse, ExecutionError> {
        let table = self.table(table)?;
        let response = QueryResponse::new(QueryIntent::Average, table.name()).with_column(column);

        let count = table.records().len();
        if count == 0 {
            tracing::warn!(table = table.name(), column, "Average over empty table");
            return Ok(response
                .with_average(0.0)
                .with_count(0)
                .with_warning(EMPTY_TABLE_WARNING));
        }

        let average = numeric_total(table, column)? / count as f64;
        tracing::info!(table = table.name(), column, average, "average");
        Ok(response.with_average(average).with_count(count))
    }

    /// Records whose `column`, stringified and lowercased, equals `value`.
    pub fn filter(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> Result<QueryResponse, ExecutionError> {
        let table = self.table(table)?;
        require_column(table, column)?;

        let wanted = value.to_lowercase();
        let matched: Vec<Record> = table
            .records()
            .iter()
            .filter(|record| {
                record
                    .get(column)
                    .is_some_and(|v| v.to_match_string() == wanted)
            })
            .cloned()
            .collect();

        tracing::info!(
            table = table.name(),
            column,
            value = %wanted,
            matched = matched.len(),
            "filter"
        );
        Ok(QueryResponse::new(QueryIntent::Filter, table.name())
            .with_filter(column, wanted)
            .with_results(matched))
    }

    fn table(&self, name: &str) -> Result<&Table, ExecutionError> {
        self.store
            .table(name)
            .ok_or_else(|| ExecutionError::TableAccess {
                table: name.to_string(),
            })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn require_column(table: &Table, column: &str) -> Result<(), ExecutionError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(ExecutionError::ColumnMissing {
            table: table.name().to_string(),
            column: column.to_string(),
            available: table.columns().to_vec(),
        })
    }
}

/// Sum of `column`, which must be numeric in every record.
fn numeric_total(table: &Table, column: &str) -> Result<f64, ExecutionError> {
    require_column(table, column)?;

    table.records().iter().try_fold(0.0, |total, record| {
        record
            .get(column)
            .and_then(|v| v.as_f64())
            .map(|v| total + v)
            .ok_or_else(|| ExecutionError::NonNumericColumn {
                table: table.name().to_string(),
                column: column.to_string(),
            })
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SchemaConfig, TableDefinition};
    use crate::store::Value;

    fn executor() -> QueryExecutor {
        QueryExecutor::new(Arc::new(TableStore::seeded()))
    }

    fn executor_with(tables: Vec<TableDefinition>) -> QueryExecutor {
        let store = TableStore::from_schema(&SchemaConfig { tables }).unwrap();
        QueryExecutor::new(Arc::new(store))
    }

    #[test]
    fn test_select_all_matches_store() {
        let store = Arc::new(TableStore::seeded());
        let executor = QueryExecutor::new(store.clone());

        for table in store.table_names() {
            let response = executor.select_all(table).unwrap();
            let results = response.results.unwrap();
            assert_eq!(response.count, Some(results.len()));
            assert_eq!(results.as_slice(), store.get_table(table).unwrap());
        }
    }

    #[test]
    fn test_count_matches_store() {
        let store = Arc::new(TableStore::seeded());
        let executor = QueryExecutor::new(store.clone());

        for table in store.table_names() {
            let response = executor.count(table).unwrap();
            assert_eq!(response.count, Some(store.get_table(table).unwrap().len()));
            assert!(response.results.is_none());
        }
    }

    #[test]
    fn test_sum_of_sales_amount() {
        let response = executor().sum("sales", "amount").unwrap();
        assert_eq!(response.total, Some(4450.0));
        assert_eq!(response.column.as_deref(), Some("amount"));
    }

    #[test]
    fn test_sum_rejects_text_column() {
        let err = executor().sum("sales", "region").unwrap_err();
        assert!(matches!(err, ExecutionError::NonNumericColumn { .. }));
    }

    #[test]
    fn test_sum_rejects_string_numerals() {
        let executor = executor_with(vec![TableDefinition {
            name: "ledger".to_string(),
            columns: vec!["amount".to_string()],
            rows: vec![vec![Value::Integer(5)], vec![Value::from("10")]],
        }]);
        assert!(matches!(
            executor.sum("ledger", "amount"),
            Err(ExecutionError::NonNumericColumn { .. })
        ));
    }

    #[test]
    fn test_sum_missing_column() {
        let err = executor().sum("sales", "price").unwrap_err();
        match err {
            ExecutionError::ColumnMissing { available, .. } => {
                assert_eq!(available, vec!["id", "product", "amount", "date", "region"]);
            }
            other => panic!("Expected ColumnMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_average_of_products_price() {
        let response = executor().average("products", "price").unwrap();
        let expected = (1200.0 + 800.0 + 450.0) / 3.0;
        assert!((response.average.unwrap() - expected).abs() < 1e-9);
        assert_eq!(response.count, Some(3));
        assert!(response.warning.is_none());
    }

    #[test]
    fn test_average_mixes_integer_and_decimal() {
        let executor = executor_with(vec![TableDefinition {
            name: "ledger".to_string(),
            columns: vec!["amount".to_string()],
            rows: vec![vec![Value::Integer(1)], vec![Value::Decimal(2.0)]],
        }]);
        assert_eq!(executor.average("ledger", "amount").unwrap().average, Some(1.5));
    }

    #[test]
    fn test_average_of_empty_table() {
        let executor = executor_with(vec![TableDefinition {
            name: "refunds".to_string(),
            columns: vec!["id".to_string(), "amount".to_string()],
            rows: Vec::new(),
        }]);

        for column in ["amount", "id", "anything"] {
            let response = executor.average("refunds", column).unwrap();
            assert_eq!(response.average, Some(0.0));
            assert_eq!(response.count, Some(0));
            assert_eq!(response.warning.as_deref(), Some(EMPTY_TABLE_WARNING));
        }
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let response = executor().filter("sales", "region", "north").unwrap();
        let results = response.results.unwrap();
        assert_eq!(response.count, Some(2));
        assert_eq!(results.len(), 2);
        for record in &results {
            assert_eq!(record.get("region"), Some(&Value::from("North")));
        }
    }

    #[test]
    fn test_filter_numeric_column_as_string() {
        let response = executor().filter("sales", "amount", "800").unwrap();
        assert_eq!(response.count, Some(2));
    }

    #[test]
    fn test_filter_exact_match_only() {
        let response = executor().filter("sales", "region", "nor").unwrap();
        assert_eq!(response.count, Some(0));
        assert_eq!(response.results.map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_filter_missing_column() {
        assert!(matches!(
            executor().filter("sales", "color", "red"),
            Err(ExecutionError::ColumnMissing { .. })
        ));
    }

    #[test]
    fn test_unknown_table() {
        assert_eq!(
            executor().count("orders").unwrap_err(),
            ExecutionError::TableAccess {
                table: "orders".to_string()
            }
        );
    }

    #[test]
    fn test_execute_dispatch() {
        let parsed = ParsedQuery {
            intent: QueryIntent::Sum,
            entities: ExtractedEntities::Aggregate {
                table: "sales".to_string(),
                column: "amount".to_string(),
            },
        };
        let response = executor().execute(&parsed).unwrap();
        assert_eq!(response.query_type, QueryIntent::Sum);
        assert_eq!(response.total, Some(4450.0));
    }

    #[test]
    fn test_execute_rejects_mismatched_entities() {
        let parsed = ParsedQuery {
            intent: QueryIntent::Sum,
            entities: ExtractedEntities::Table {
                table: "sales".to_string(),
            },
        };
        assert_eq!(
            executor().execute(&parsed),
            Err(ExecutionError::EntityMismatch {
                table: "sales".to_string(),
                intent: QueryIntent::Sum,
            })
        );

        let parsed = ParsedQuery {
            intent: QueryIntent::SelectAll,
            entities: ExtractedEntities::Aggregate {
                table: "sales".to_string(),
                column: "amount".to_string(),
            },
        };
        assert!(matches!(
            executor().execute(&parsed),
            Err(ExecutionError::EntityMismatch { .. })
        ));
    }
}
