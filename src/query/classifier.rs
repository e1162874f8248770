//! Query Intent Classifier.
//!
//! Assigns exactly one [`QueryIntent`] to a lowercased query by running an
//! ordered list of predicates and taking the first that matches:
//!
//! 1. `sum`: "sum of", "total", "add up", ...
//! 2. `filter`: a filter keyword, plus (in strict mode) a known table name
//!    and a `where|with <column> <is|equals|=> <value>` condition
//! 3. `select_all`: "show me all", "list all", "get all", "display all"
//! 4. `count`: "how many", "count"
//! 5. `average`: "average", "avg"
//!
//! A query such as "total amount of sales where region is north" matches
//! both `sum` and `filter`; it is a sum. "show me all sales where region is
//! north" matches `filter` and `select_all`; it is a filter.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::FilterDetection;
use crate::error::ExtractionError;
use crate::store::TableStore;

use super::types::QueryIntent;

/// Predicate evaluation order.
pub const CLASSIFICATION_ORDER: [QueryIntent; 5] = [
    QueryIntent::Sum,
    QueryIntent::Filter,
    QueryIntent::SelectAll,
    QueryIntent::Count,
    QueryIntent::Average,
];

const SUM_PHRASES: [&str; 7] = [
    "sum of",
    "total",
    "add up",
    "what is the total",
    "calculate the total",
    "total amount of",
    "sum amount of",
];
const SELECT_ALL_PHRASES: [&str; 4] = ["show me all", "list all", "get all", "display all"];
const COUNT_PHRASES: [&str; 2] = ["how many", "count"];
const AVERAGE_PHRASES: [&str; 2] = ["average", "avg"];

// ============================================================================
// Intent Classifier
// ============================================================================

/// Classifies lowercased queries into intents.
pub struct IntentClassifier {
    store: Arc<TableStore>,
    filter_detection: FilterDetection,
}

impl IntentClassifier {
    pub fn new(store: Arc<TableStore>, filter_detection: FilterDetection) -> Self {
        Self {
            store,
            filter_detection,
        }
    }

    /// Classify a lowercased query, failing when no predicate matches.
    ///
    /// A filter condition naming no known table fails with
    /// [`ExtractionError::TableNotFound`] rather than as an unknown intent.
    pub fn classify(&self, query: &str) -> Result<QueryIntent, ExtractionError> {
        let intent = CLASSIFICATION_ORDER
            .into_iter()
            .find(|intent| self.matches(*intent, query));

        match intent {
            Some(intent) => {
                tracing::debug!(%intent, query, "Classified query");
                Ok(intent)
            }
            None if is_filter_condition(query) => {
                tracing::debug!(query, "Filter condition names no known table");
                Err(ExtractionError::TableNotFound {
                    available: self
                        .store
                        .table_names()
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                })
            }
            None => {
                tracing::debug!(query, "No intent detected");
                Err(ExtractionError::NoIntentDetected)
            }
        }
    }

    /// Every intent whose predicate matches, in priority order.
    pub fn matching_intents(&self, query: &str) -> Vec<QueryIntent> {
        CLASSIFICATION_ORDER
            .into_iter()
            .filter(|intent| self.matches(*intent, query))
            .collect()
    }

    /// Evaluate a single intent's predicate.
    pub fn matches(&self, intent: QueryIntent, query: &str) -> bool {
        match intent {
            QueryIntent::Sum => is_sum(query),
            QueryIntent::Filter => self.is_filter(query),
            QueryIntent::SelectAll => is_select_all(query),
            QueryIntent::Count => is_count(query),
            QueryIntent::Average => is_average(query),
        }
    }

    fn is_filter(&self, query: &str) -> bool {
        match self.filter_detection {
            FilterDetection::Keyword => FILTER_KEYWORD_PATTERN.is_match(query),
            FilterDetection::Strict => self.mentions_table(query) && is_filter_condition(query),
        }
    }

    fn mentions_table(&self, query: &str) -> bool {
        self.store
            .table_names()
            .into_iter()
            .any(|table| query.contains(table))
    }
}

// ============================================================================
// Predicates
// ============================================================================

pub fn is_sum(query: &str) -> bool {
    contains_any(query, &SUM_PHRASES)
}

pub fn is_select_all(query: &str) -> bool {
    contains_any(query, &SELECT_ALL_PHRASES)
}

pub fn is_count(query: &str) -> bool {
    contains_any(query, &COUNT_PHRASES)
}

pub fn is_average(query: &str) -> bool {
    contains_any(query, &AVERAGE_PHRASES)
}

/// Filter keyword plus a `where|with <column> <op> <value>` condition.
fn is_filter_condition(query: &str) -> bool {
    FILTER_KEYWORD_PATTERN.is_match(query) && FILTER_CONDITION_PATTERN.is_match(query)
}

fn contains_any(query: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| query.contains(phrase))
}

// Whole words only, so "list" and "this" do not count as "is".
static FILTER_KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:where|filter|with|equals|is)\b|=").expect("Invalid regex")
});
static FILTER_CONDITION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:where|with)\s+\w+\s*(?:\s(?:is|equals)\s|=)\s*'?\w+'?")
        .expect("Invalid regex")
});

// ============================================================================
// Tests
// ============================================================================
