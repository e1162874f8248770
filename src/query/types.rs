//! Types for the natural language query system.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::store::Record;

/// Query types accepted by the classifier, as shown to users.
pub const SUPPORTED_QUERY_TYPES: [&str; 5] = ["select all", "count", "sum", "average", "filter"];

/// Example phrasings offered when a query is not understood.
pub const EXAMPLE_QUERIES: [&str; 5] = [
    "Show me all sales",
    "How many customers do we have?",
    "What is the total amount of sales",
    "What is the average price of products",
    "Show me all sales where region is North",
];

/// Filter phrasings the extractor understands.
pub const FILTER_PATTERN_EXAMPLES: [&str; 4] = [
    "Show me all <table> where <column> is <value>",
    "Filter <table> where <column> = <value>",
    "Show me <table> where <column> equals <value>",
    "Get <table> with <column> = <value>",
];

// ============================================================================
// Query Intent
// ============================================================================

/// The operation a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    SelectAll,
    Count,
    Sum,
    Average,
    Filter,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectAll => "select_all",
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Filter => "filter",
        }
    }

    /// Get a human-readable name for this intent.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SelectAll => "select all",
            Self::Count => "count",
            Self::Sum => "sum",
            Self::Average => "average",
            Self::Filter => "filter",
        }
    }
}

impl std::fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Extracted Entities
// ============================================================================

/// Table, column, and filter value pulled out of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedEntities {
    /// select_all and count
    Table { table: String },
    /// sum and average
    Aggregate { table: String, column: String },
    /// filter; `value` is lowercased
    Filter {
        table: String,
        column: String,
        value: String,
    },
}

impl ExtractedEntities {
    pub fn table(&self) -> &str {
        match self {
            Self::Table { table } | Self::Aggregate { table, .. } | Self::Filter { table, .. } => {
                table
            }
        }
    }

    pub fn filter_value(&self) -> Option<&str> {
        match self {
            Self::Filter { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// A classified query with its entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub intent: QueryIntent,
    pub entities: ExtractedEntities,
}

// ============================================================================
// Payloads
// ============================================================================

/// Outcome marker carried by every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Result of an executed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub status: Status,
    pub query_type: QueryIntent,
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl QueryResponse {
    pub fn new(query_type: QueryIntent, table: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            query_type,
            table: table.into(),
            column: None,
            filter_column: None,
            filter_value: None,
            results: None,
            count: None,
            total: None,
            average: None,
            warning: None,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter_column = Some(column.into());
        self.filter_value = Some(value.into());
        self
    }

    pub fn with_results(mut self, results: Vec<Record>) -> Self {
        self.count = Some(results.len());
        self.results = Some(results);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_average(mut self, average: f64) -> Self {
        self.average = Some(average);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// Description of how a query would run, or why it cannot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationPayload {
    pub status: Status,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<String>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, JsonValue>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supported_query_types: Vec<String>,
}

/// Category of a validation problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    EmptyQuery,
    NoIntentDetected,
    TableNotFound,
    ColumnNotFound,
    FilterParse,
    MissingTable,
    MissingColumn,
    NonNumericColumn,
}

/// One problem found by the validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_tables: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_columns: Option<Vec<String>>,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            column: None,
            available_tables: None,
            available_columns: None,
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_available_tables(mut self, tables: Vec<String>) -> Self {
        self.available_tables = Some(tables);
        self
    }

    pub fn with_available_columns(mut self, columns: Vec<String>) -> Self {
        self.available_columns = Some(columns);
        self
    }
}

/// Validity report for a query; never an error itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub status: Status,
    pub valid: bool,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub reason: String,
    pub issues: Vec<ValidationIssue>,
}

// ============================================================================
// Tests
// ============================================================================
