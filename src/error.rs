//! Error types for Tabula.

use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;

use crate::query::types::{
    QueryIntent, EXAMPLE_QUERIES, FILTER_PATTERN_EXAMPLES, SUPPORTED_QUERY_TYPES,
};

/// Main error type for Tabula operations.
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Logging error: {0}")]
    Logging(String),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

// ============================================================================
// Interpreter Errors
// ============================================================================

/// Failures while deriving an intent and its entities from query text.
///
/// These are returned as values so the validator can keep going after one
/// of them; at the processing boundary they become [`InvalidQueryError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Query must be a non-empty string")]
    EmptyQuery,

    #[error("Could not determine query type")]
    NoIntentDetected,

    #[error("Could not determine table name from query")]
    TableNotFound { available: Vec<String> },

    #[error("Could not find any of the required columns in query")]
    ColumnNotFound {
        table: String,
        required: Vec<String>,
        available: Vec<String>,
    },

    #[error("Could not parse filter condition from query")]
    FilterParse,
}

impl ExtractionError {
    /// Structured hints for the caller.
    pub fn details(&self) -> Map<String, JsonValue> {
        let details = match self {
            Self::EmptyQuery => json!({
                "suggestion": "Ask a question such as \"Show me all sales\"",
            }),
            Self::NoIntentDetected => json!({
                "supported_query_types": SUPPORTED_QUERY_TYPES,
                "example_queries": EXAMPLE_QUERIES,
            }),
            Self::TableNotFound { available } => json!({
                "available_tables": available,
                "suggestion": "Include one of the available table names in your query",
            }),
            Self::ColumnNotFound {
                table,
                required,
                available,
            } => json!({
                "table": table,
                "required_columns": required,
                "available_columns": available,
                "suggestion": format!("Include one of {:?} in your query", required),
            }),
            Self::FilterParse => json!({
                "expected_patterns": FILTER_PATTERN_EXAMPLES,
                "suggestion": "Use one of the supported filter patterns",
            }),
        };
        into_map(details)
    }
}

/// Failures while running an understood query against the table store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Table '{table}' could not be read")]
    TableAccess { table: String },

    #[error("Column '{column}' not found in table '{table}'")]
    ColumnMissing {
        table: String,
        column: String,
        available: Vec<String>,
    },

    #[error("Column '{column}' in table '{table}' is not numeric")]
    NonNumericColumn { table: String, column: String },

    #[error("A {intent} query cannot run with the references extracted for table '{table}'")]
    EntityMismatch { table: String, intent: QueryIntent },
}

impl ExecutionError {
    pub fn table(&self) -> &str {
        match self {
            Self::TableAccess { table }
            | Self::ColumnMissing { table, .. }
            | Self::NonNumericColumn { table, .. }
            | Self::EntityMismatch { table, .. } => table,
        }
    }
}

// ============================================================================
// Boundary Errors
// ============================================================================

/// The input text could not be understood.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct InvalidQueryError {
    pub message: String,
    pub query: Option<String>,
    pub details: Map<String, JsonValue>,
}

impl InvalidQueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            query: None,
            details: Map::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Wrap an extraction failure, echoing the original query text.
    pub fn from_extraction(err: &ExtractionError, query: &str) -> Self {
        Self {
            message: err.to_string(),
            query: Some(query.to_string()),
            details: err.details(),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "error": "InvalidQueryError",
            "message": self.message,
            "query": self.query,
            "details": self.details,
        })
    }
}

/// The query was understood but could not be run against the table store.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct DatabaseError {
    pub message: String,
    pub operation: Option<String>,
    pub table: Option<String>,
    pub details: Map<String, JsonValue>,
}

impl DatabaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            operation: None,
            table: None,
            details: Map::new(),
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_detail(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    /// Wrap an execution failure with the operation that was attempted.
    pub fn from_execution(err: &ExecutionError, operation: &str) -> Self {
        let mut error = Self::new(format!("Failed to run {} query: {}", operation, err))
            .with_operation(operation)
            .with_table(err.table())
            .with_detail("internal_error", err.to_string());

        match err {
            ExecutionError::ColumnMissing {
                column, available, ..
            } => {
                error = error
                    .with_detail("column", column.as_str())
                    .with_detail("available_columns", available.clone());
            }
            ExecutionError::NonNumericColumn { column, .. } => {
                error = error
                    .with_detail("column", column.as_str())
                    .with_detail("column_type", "non-numeric")
                    .with_detail(
                        "suggestion",
                        format!("Use a numeric column for {} operations", operation),
                    );
            }
            ExecutionError::TableAccess { .. } | ExecutionError::EntityMismatch { .. } => {}
        }
        error
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "error": "DatabaseError",
            "message": self.message,
            "operation": self.operation,
            "table": self.table,
            "details": self.details,
        })
    }
}

/// Errors that escape [`crate::QueryProcessor::process_query`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("InvalidQueryError: {0}")]
    InvalidQuery(#[from] InvalidQueryError),

    #[error("DatabaseError: {0}")]
    Database(#[from] DatabaseError),
}

impl QueryError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "InvalidQueryError",
            Self::Database(_) => "DatabaseError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidQuery(e) => &e.message,
            Self::Database(e) => &e.message,
        }
    }

    pub fn details(&self) -> &Map<String, JsonValue> {
        match self {
            Self::InvalidQuery(e) => &e.details,
            Self::Database(e) => &e.details,
        }
    }

    /// HTTP status a host should answer with.
    pub fn status_code(&self) -> u16 {
        400
    }

    /// Caller-visible error shape.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::InvalidQuery(e) => e.to_json(),
            Self::Database(e) => e.to_json(),
        }
    }
}

fn into_map(value: JsonValue) -> Map<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map,
        _ => Map::new(),
    }
}

/// Result type alias for Tabula operations.
pub type Result<T> = std::result::Result<T, TabulaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TabulaError::Config(ConfigError::MissingField("interpreter.aggregate_columns".to_string()));
        assert!(err.to_string().contains("interpreter.aggregate_columns"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TabulaError = io_err.into();
        assert!(matches!(err, TabulaError::Io(_)));
    }

    #[test]
    fn test_table_not_found_lists_tables() {
        let err = ExtractionError::TableNotFound {
            available: vec!["sales".to_string(), "customers".to_string()],
        };
        let invalid = InvalidQueryError::from_extraction(&err, "Show me all widgets");

        assert_eq!(invalid.query.as_deref(), Some("Show me all widgets"));
        assert_eq!(
            invalid.details["available_tables"],
            json!(["sales", "customers"])
        );
    }

    #[test]
    fn test_database_error_shape() {
        let err = ExecutionError::NonNumericColumn {
            table: "sales".to_string(),
            column: "region".to_string(),
        };
        let db = DatabaseError::from_execution(&err, "sum");
        let shape = QueryError::from(db).to_json();

        assert_eq!(shape["error"], "DatabaseError");
        assert_eq!(shape["operation"], "sum");
        assert_eq!(shape["table"], "sales");
        assert_eq!(shape["details"]["column"], "region");
        assert_eq!(shape["details"]["column_type"], "non-numeric");
    }

    #[test]
    fn test_status_code() {
        let err = QueryError::from(InvalidQueryError::new("bad"));
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.kind(), "InvalidQueryError");
    }
}
