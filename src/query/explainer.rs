//! Query explanation.
//!
//! Runs the same classification and extraction as execution but only
//! describes what would happen. Failures come back as an error payload.

use crate::error::ExtractionError;
use crate::store::TableStore;

use super::classifier::IntentClassifier;
use super::extractor::EntityExtractor;
use super::types::*;

/// Describes queries without executing them.
pub struct QueryExplainer<'a> {
    store: &'a TableStore,
    classifier: &'a IntentClassifier,
    extractor: &'a EntityExtractor,
}

impl<'a> QueryExplainer<'a> {
    pub fn new(
        store: &'a TableStore,
        classifier: &'a IntentClassifier,
        extractor: &'a EntityExtractor,
    ) -> Self {
        Self {
            store,
            classifier,
            extractor,
        }
    }

    pub fn explain(&self, text: &str) -> ExplanationPayload {
        if text.trim().is_empty() {
            return failure(text, None, &ExtractionError::EmptyQuery, Vec::new());
        }
        let query = text.to_lowercase();

        let intent = match self.classifier.classify(&query) {
            Ok(intent) => intent,
            Err(err) => return failure(text, None, &err, Vec::new()),
        };
        let mut steps = vec![format!("Identified as {} query", intent.display_name())];

        let entities = match self.extractor.extract(intent, &query) {
            Ok(entities) => entities,
            Err(err) => return failure(text, Some(intent), &err, steps),
        };
        steps.push(format!("Extracted table name: {}", entities.table()));

        if !self.store.table_exists(entities.table()) {
            let err = ExtractionError::TableNotFound {
                available: self
                    .store
                    .table_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            };
            return failure(text, Some(intent), &err, steps);
        }

        match &entities {
            ExtractedEntities::Table { .. } => {}
            ExtractedEntities::Aggregate { column, .. } => {
                steps.push(format!("Extracted column: {}", column));
            }
            ExtractedEntities::Filter { column, value, .. } => {
                steps.push(format!("Extracted filter condition: {} equals {}", column, value));
            }
        }

        let explanation = describe(intent, &entities);
        steps.push(explanation.clone());

        ExplanationPayload {
            status: Status::Success,
            query: text.to_string(),
            query_type: Some(intent),
            table: Some(entities.table().to_string()),
            column: match &entities {
                ExtractedEntities::Aggregate { column, .. } => Some(column.clone()),
                _ => None,
            },
            filter_column: match &entities {
                ExtractedEntities::Filter { column, .. } => Some(column.clone()),
                _ => None,
            },
            filter_value: entities.filter_value().map(str::to_string),
            explanation,
            steps,
            error: None,
            details: None,
            supported_query_types: Vec::new(),
        }
    }
}

/// One-line summary of the operation a parsed query performs.
pub fn describe(intent: QueryIntent, entities: &ExtractedEntities) -> String {
    let table = entities.table();
    match (intent, entities) {
        (QueryIntent::Count, _) => format!("Will count records in {} table", table),
        (QueryIntent::Sum, ExtractedEntities::Aggregate { column, .. }) => {
            format!("Will calculate sum of {} values from {} table", column, table)
        }
        (QueryIntent::Average, ExtractedEntities::Aggregate { column, .. }) => {
            format!("Will calculate average of {} values from {} table", column, table)
        }
        (QueryIntent::Filter, ExtractedEntities::Filter { column, value, .. }) => {
            format!("Will filter {} table where {} equals {}", table, column, value)
        }
        _ => format!("Will return all records from {} table", table),
    }
}

fn failure(
    text: &str,
    intent: Option<QueryIntent>,
    err: &ExtractionError,
    steps: Vec<String>,
) -> ExplanationPayload {
    tracing::debug!(query = text, error = %err, "Query could not be explained");

    let (explanation, supported) = match err {
        ExtractionError::NoIntentDetected => (
            "Query type not recognized".to_string(),
            SUPPORTED_QUERY_TYPES.iter().map(|s| s.to_string()).collect(),
        ),
        _ => (err.to_string(), Vec::new()),
    };

    ExplanationPayload {
        status: Status::Error,
        query: text.to_string(),
        query_type: intent,
        table: None,
        column: None,
        filter_column: None,
        filter_value: None,
        explanation,
        steps,
        error: Some("InvalidQueryError".to_string()),
        details: Some(err.details()),
        supported_query_types: supported,
    }
}
