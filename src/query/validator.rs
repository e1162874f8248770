//! Query validation.
//!
//! Classifies and extracts like execution, then checks the references
//! against the table store. Every problem found is reported; nothing is
//! executed and nothing is returned as an error.

use crate::error::ExtractionError;
use crate::store::TableStore;

use super::classifier::IntentClassifier;
use super::extractor::EntityExtractor;
use super::types::*;

/// Checks whether queries can run.
pub struct QueryValidator<'a> {
    store: &'a TableStore,
    classifier: &'a IntentClassifier,
    extractor: &'a EntityExtractor,
}

impl<'a> QueryValidator<'a> {
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

    pub fn validate(&self, text: &str) -> ValidationReport {
        let mut report = ValidationReport {
            status: Status::Error,
            valid: false,
            query: text.to_string(),
            query_type: None,
            table: None,
            column: None,
            reason: String::new(),
            issues: Vec::new(),
        };

        if text.trim().is_empty() {
            report.issues.push(extraction_issue(&ExtractionError::EmptyQuery));
            return finish(report);
        }
        let query = text.to_lowercase();

        let intent = match self.classifier.classify(&query) {
            Ok(intent) => intent,
            Err(err) => {
                report.issues.push(extraction_issue(&err));
                return finish(report);
            }
        };
        report.query_type = Some(intent);

        self.extract_references(intent, &query, &mut report);
        self.check_references(intent, &mut report);

        finish(report)
    }

    /// Fill in table and column, recording each extraction failure.
    fn extract_references(
        &self,
        intent: QueryIntent,
        query: &str,
        report: &mut ValidationReport,
    ) {
        match intent {
            QueryIntent::SelectAll | QueryIntent::Count => {
                match self.extractor.extract_table(query) {
                    Ok(table) => report.table = Some(table),
                    Err(err) => report.issues.push(extraction_issue(&err)),
                }
            }
            QueryIntent::Sum | QueryIntent::Average => {
                match self.extractor.extract_table(query) {
                    Ok(table) => report.table = Some(table),
                    Err(err) => report.issues.push(extraction_issue(&err)),
                }
                // The column may still be named outright without a table
                let table = report.table.as_deref().unwrap_or_default();
                match self
                    .extractor
                    .extract_column(query, table, self.extractor.aggregate_columns())
                {
                    Ok(column) => report.column = Some(column),
                    Err(err) => report.issues.push(extraction_issue(&err)),
                }
            }
            QueryIntent::Filter => match self.extractor.extract_filter_condition(query) {
                Ok((table, column, _)) => {
                    report.table = Some(table);
                    report.column = Some(column);
                }
                Err(err) => report.issues.push(extraction_issue(&err)),
            },
        }
    }

    /// Table exists, column exists, aggregate column is numeric.
    fn check_references(&self, intent: QueryIntent, report: &mut ValidationReport) {
        let Some(table_name) = report.table.as_deref() else {
            return;
        };

        let Some(table) = self.store.table(table_name) else {
            let issue = ValidationIssue::new(
                IssueKind::MissingTable,
                format!("Table '{}' does not exist", table_name),
            )
            .with_available_tables(
                self.store
                    .table_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            );
            report.issues.push(issue);
            return;
        };

        let Some(column) = report.column.as_deref() else {
            return;
        };

        if !table.has_column(column) {
            let issue = ValidationIssue::new(
                IssueKind::MissingColumn,
                format!("Column '{}' not found in table '{}'", column, table_name),
            )
            .with_column(column)
            .with_available_columns(table.columns().to_vec());
            report.issues.push(issue);
            return;
        }

        if matches!(intent, QueryIntent::Sum | QueryIntent::Average) {
            // Judged on the first record; an empty table has nothing to judge
            if let Some(sample) = table.records().first() {
                if !sample.get(column).is_some_and(|v| v.is_numeric()) {
                    let issue = ValidationIssue::new(
                        IssueKind::NonNumericColumn,
                        format!(
                            "Column '{}' in table '{}' is not numeric",
                            column, table_name
                        ),
                    )
                    .with_column(column);
                    report.issues.push(issue);
                }
            }
        }
    }
}

fn extraction_issue(err: &ExtractionError) -> ValidationIssue {
    let issue = ValidationIssue::new(issue_kind(err), err.to_string());
    match err {
        ExtractionError::TableNotFound { available } => {
            issue.with_available_tables(available.clone())
        }
        ExtractionError::ColumnNotFound { available, .. } if !available.is_empty() => {
            issue.with_available_columns(available.clone())
        }
        _ => issue,
    }
}

fn issue_kind(err: &ExtractionError) -> IssueKind {
    match err {
        ExtractionError::EmptyQuery => IssueKind::EmptyQuery,
        ExtractionError::NoIntentDetected => IssueKind::NoIntentDetected,
        ExtractionError::TableNotFound { .. } => IssueKind::TableNotFound,
        ExtractionError::ColumnNotFound { .. } => IssueKind::ColumnNotFound,
        ExtractionError::FilterParse => IssueKind::FilterParse,
    }
}

fn finish(mut report: ValidationReport) -> ValidationReport {
    report.valid = report.issues.is_empty();
    if report.valid {
        report.status = Status::Success;
        report.reason = "Query is valid".to_string();
    } else {
        report.status = Status::Error;
        report.reason = report.issues[0].message.clone();
        tracing::debug!(
            query = %report.query,
            issues = report.issues.len(),
            "Query failed validation"
        );
    }
    report
}
