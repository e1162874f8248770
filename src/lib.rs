//! Tabula: natural language queries over in-memory tables.
//!
//! Plain English questions such as "What is the total amount of sales" are
//! classified into one of five query types, resolved against a fixed set of
//! named tables, and answered with a structured response.

pub mod config;
pub mod error;
pub mod logging;
pub mod query;
pub mod store;

pub use config::{Config, FilterDetection, InterpreterSettings, SchemaConfig, TableDefinition};
pub use error::{
    ConfigError, DatabaseError, ExecutionError, ExtractionError, InvalidQueryError, QueryError,
    Result, TabulaError,
};
pub use logging::init_logging;
pub use query::{
    ExplanationPayload, QueryIntent, QueryProcessor, QueryResponse, ValidationIssue,
    ValidationReport,
};
pub use store::{Record, Table, TableStore, Value};
