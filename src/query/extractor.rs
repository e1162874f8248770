//! Entity extraction.
//!
//! Pulls table, column, and filter value references out of a lowercased
//! query using substring search over the store's names, a synonym table,
//! and a list of regex patterns for common filter phrasings.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::InterpreterSettings;
use crate::error::ExtractionError;
use crate::store::TableStore;

use super::types::{ExtractedEntities, QueryIntent};

/// Phrases that name a column outright.
const PHRASE_COLUMNS: [(&str, &str); 4] = [
    ("total amount of", "amount"),
    ("sum of amount", "amount"),
    ("total price of", "price"),
    ("sum of price", "price"),
];

/// Extracts entities against a table store.
pub struct EntityExtractor {
    store: Arc<TableStore>,
    aggregate_columns: Vec<String>,
    synonyms: BTreeMap<String, Vec<String>>,
}

impl EntityExtractor {
    pub fn new(store: Arc<TableStore>, settings: &InterpreterSettings) -> Self {
        Self {
            store,
            aggregate_columns: settings.aggregate_columns.clone(),
            synonyms: settings.synonyms.clone(),
        }
    }

    /// Columns sum and average look for.
    pub fn aggregate_columns(&self) -> &[String] {
        &self.aggregate_columns
    }

    /// Extract what `intent` needs from a lowercased query.
    pub fn extract(
        &self,
        intent: QueryIntent,
        query: &str,
    ) -> Result<ExtractedEntities, ExtractionError> {
        match intent {
            QueryIntent::SelectAll | QueryIntent::Count => Ok(ExtractedEntities::Table {
                table: self.extract_table(query)?,
            }),
            QueryIntent::Sum | QueryIntent::Average => {
                let table = self.extract_table(query)?;
                let column = self.extract_column(query, &table, &self.aggregate_columns)?;
                Ok(ExtractedEntities::Aggregate { table, column })
            }
            QueryIntent::Filter => {
                let (table, column, value) = self.extract_filter_condition(query)?;
                Ok(ExtractedEntities::Filter {
                    table,
                    column,
                    value,
                })
            }
        }
    }

    /// Find a known table name inside the query.
    ///
    /// When several names occur (e.g. "order" and "orders") the longest wins;
    /// ties go to the table declared first.
    pub fn extract_table(&self, query: &str) -> Result<String, ExtractionError> {
        let mut best: Option<&str> = None;
        for table in self.store.table_names() {
            if query.contains(table) && best.map_or(true, |b| table.len() > b.len()) {
                best = Some(table);
            }
        }

        match best {
            Some(table) => {
                tracing::debug!(table, "Extracted table");
                Ok(table.to_string())
            }
            None => Err(ExtractionError::TableNotFound {
                available: self.available_tables(),
            }),
        }
    }

    /// Resolve the column an aggregate refers to.
    ///
    /// Tried in order: fixed phrases, a direct mention of a candidate, then
    /// synonyms whose canonical column exists in `table`.
    pub fn extract_column(
        &self,
        query: &str,
        table: &str,
        candidates: &[String],
    ) -> Result<String, ExtractionError> {
        if let Some((_, column)) = PHRASE_COLUMNS
            .iter()
            .find(|(phrase, _)| query.contains(phrase))
        {
            return Ok(column.to_string());
        }

        if let Some(column) = candidates.iter().find(|c| query.contains(c.as_str())) {
            return Ok(column.clone());
        }

        let table_columns = self.store.table_columns(table).unwrap_or_default();
        for canonical in self.synonym_order(candidates) {
            let Some(words) = self.synonyms.get(canonical) else {
                continue;
            };
            let mentioned = words.iter().any(|w| query.contains(w.as_str()));
            if mentioned && table_columns.iter().any(|c| c == canonical) {
                tracing::debug!(column = canonical, "Resolved column through synonym");
                return Ok(canonical.to_string());
            }
        }

        Err(ExtractionError::ColumnNotFound {
            table: table.to_string(),
            required: candidates.to_vec(),
            available: table_columns.to_vec(),
        })
    }

    /// Parse `(table, column, value)` from a filter query.
    ///
    /// The phrasing patterns are tried first and the first match wins. The
    /// table they capture is returned as written, known or not. Otherwise
    /// the table is found by name and a `where <column> <op> <value>`
    /// clause is searched for anywhere in the query.
    pub fn extract_filter_condition(
        &self,
        query: &str,
    ) -> Result<(String, String, String), ExtractionError> {
        for pattern in FILTER_PATTERNS.iter() {
            if let Some(caps) = pattern.captures(query) {
                if let (Some(table), Some(column), Some(value)) =
                    (caps.get(1), caps.get(2), caps.get(3))
                {
                    return Ok((
                        table.as_str().to_string(),
                        column.as_str().to_string(),
                        value.as_str().to_lowercase(),
                    ));
                }
            }
        }

        let table = self.extract_table(query)?;
        match WHERE_CLAUSE_PATTERN.captures(query) {
            Some(caps) => match (caps.get(1), caps.get(2)) {
                (Some(column), Some(value)) => Ok((
                    table,
                    column.as_str().to_string(),
                    value.as_str().to_lowercase(),
                )),
                _ => Err(ExtractionError::FilterParse),
            },
            None => Err(ExtractionError::FilterParse),
        }
    }

    fn available_tables(&self) -> Vec<String> {
        self.store
            .table_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Candidate columns first, then any other column with synonyms.
    fn synonym_order<'a>(&'a self, candidates: &'a [String]) -> Vec<&'a str> {
        let mut order: Vec<&str> = candidates.iter().map(String::as_str).collect();
        for column in self.synonyms.keys() {
            if !order.contains(&column.as_str()) {
                order.push(column.as_str());
            }
        }
        order
    }
}

// ============================================================================
// Regex Patterns
// ============================================================================

static FILTER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "show me all <t> where <c> is <v>"
        r"(?i)show me all (\w+)\s+where\s+(\w+)\s+is\s+'?(\w+)'?",
        r"(?i)show me all (\w+)\s+where\s+(\w+)\s+equals\s+'?(\w+)'?",
        // "filter <t> where <c> is <v>"
        r"(?i)filter\s+(\w+)\s+where\s+(\w+)\s+is\s+'?(\w+)'?",
        r"(?i)filter\s+(\w+)\s+where\s+(\w+)\s*=\s*'?(\w+)'?",
        // "show me <t> where <c> equals <v>"
        r"(?i)show me\s+(\w+)\s+where\s+(\w+)\s+equals\s+'?(\w+)'?",
        // "get <t> with <c> = <v>"
        r"(?i)get\s+(\w+)\s+with\s+(\w+)\s*=\s*'?(\w+)'?",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});
static WHERE_CLAUSE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bwhere\s+(\w+)\s*(?:\s(?:is|equals)\s|=)\s*'?(\w+)'?")
        .expect("Invalid regex")
});

// ============================================================================
// Tests
// ============================================================================
