//! Query Processor.
//!
//! The single entry point hosts call. Owns the classifier, extractor, and
//! executor over one shared table store and turns their failures into the
//! two caller-visible error kinds.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::config::{Config, InterpreterSettings};
use crate::error::{DatabaseError, ExtractionError, InvalidQueryError, QueryError};
use crate::store::TableStore;

use super::classifier::IntentClassifier;
use super::executor::QueryExecutor;
use super::explainer::QueryExplainer;
use super::extractor::EntityExtractor;
use super::types::*;
use super::validator::QueryValidator;

// ============================================================================
// Query Processor
// ============================================================================

/// Natural language query processor.
///
/// Stateless between calls; the same text against the same store always
/// produces the same response.
pub struct QueryProcessor {
    store: Arc<TableStore>,
    classifier: IntentClassifier,
    extractor: EntityExtractor,
    executor: QueryExecutor,
}

impl QueryProcessor {
    pub fn new(store: Arc<TableStore>, settings: InterpreterSettings) -> Self {
        Self {
            classifier: IntentClassifier::new(store.clone(), settings.filter_detection),
            extractor: EntityExtractor::new(store.clone(), &settings),
            executor: QueryExecutor::new(store.clone()),
            store,
        }
    }

    /// Build a processor over the tables declared in `config`.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let store = TableStore::from_schema(&config.schema)?;
        Ok(Self::new(Arc::new(store), config.interpreter.clone()))
    }

    pub fn store(&self) -> &TableStore {
        &self.store
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.store.table_names()
    }

    /// Classify, extract, and execute a query.
    pub fn process_query(&self, text: &str) -> Result<QueryResponse, QueryError> {
        if text.trim().is_empty() {
            return Err(InvalidQueryError::new(ExtractionError::EmptyQuery.to_string())
                .with_detail("input_received", text)
                .into());
        }

        tracing::debug!(query = text, "Processing query");
        let query = text.to_lowercase();

        let intent = self
            .classifier
            .classify(&query)
            .map_err(|e| InvalidQueryError::from_extraction(&e, text))?;

        let entities = self.extractor.extract(intent, &query).map_err(|e| {
            InvalidQueryError::from_extraction(&e, text).with_detail("query_type", intent.as_str())
        })?;

        // Filter patterns capture the table as written, known or not
        if !self.store.table_exists(entities.table()) {
            let err = ExtractionError::TableNotFound {
                available: self
                    .store
                    .table_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            };
            return Err(InvalidQueryError::from_extraction(&err, text)
                .with_detail("query_type", intent.as_str())
                .with_detail("table", entities.table())
                .into());
        }

        let parsed = ParsedQuery { intent, entities };
        let response = self.executor.execute(&parsed).map_err(|e| {
            let mut error = DatabaseError::from_execution(&e, intent.as_str());
            if let Some(value) = parsed.entities.filter_value() {
                error = error.with_detail("filter_value", value);
            }
            tracing::warn!(query = text, error = %e, "Query execution failed");
            error
        })?;

        tracing::info!(query = text, query_type = %intent, table = %response.table, "Query processed");
        Ok(response)
    }

    /// [`Self::process_query`], serialized for the caller.
    pub fn process_query_json(&self, text: &str) -> Result<JsonValue, QueryError> {
        let response = self.process_query(text)?;
        serde_json::to_value(&response).map_err(|e| {
            InvalidQueryError::new(format!("Unexpected error processing query: {}", e))
                .with_query(text)
                .with_detail("internal_error", e.to_string())
                .into()
        })
    }

    /// Describe what a query would do without executing it.
    pub fn explain_query(&self, text: &str) -> ExplanationPayload {
        QueryExplainer::new(&self.store, &self.classifier, &self.extractor).explain(text)
    }

    /// Report every reason a query could not run.
    pub fn validate_query(&self, text: &str) -> ValidationReport {
        QueryValidator::new(&self.store, &self.classifier, &self.extractor).validate(text)
    }
}

impl Default for QueryProcessor {
    /// Processor over the seeded demo tables.
    fn default() -> Self {
        Self::new(Arc::new(TableStore::seeded()), InterpreterSettings::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
