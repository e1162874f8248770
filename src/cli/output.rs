//! Output formatting for CLI commands.
//!
//! Everything is rendered either as pretty JSON or as human-readable text.
//! Results go to stdout, errors to stderr.

use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;
use tabula::{
    ExplanationPayload, QueryError, QueryIntent, QueryResponse, Record, TableStore,
    ValidationReport,
};
use tabula::query::Status;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a successful query response.
pub fn print_response(response: &QueryResponse, json: bool) -> Result<()> {
    if json {
        return print_json(response);
    }
    print!("{}", render_response(response));
    Ok(())
}

/// Print a failed query. JSON errors go to stdout so they can be piped.
pub fn print_query_error(error: &QueryError, json: bool) -> Result<()> {
    if json {
        return print_json(&error.to_json());
    }
    eprint!("{}", render_query_error(error));
    Ok(())
}

pub fn print_explanation(payload: &ExplanationPayload, json: bool) -> Result<()> {
    if json {
        return print_json(payload);
    }
    print!("{}", render_explanation(payload));
    Ok(())
}

pub fn print_validation(report: &ValidationReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    print!("{}", render_validation(report));
    Ok(())
}

/// Print every table with its columns and row count.
pub fn print_tables(store: &TableStore, json: bool) -> Result<()> {
    if json {
        let tables: Vec<serde_json::Value> = store
            .tables()
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "columns": t.columns(),
                    "rows": t.records().len(),
                })
            })
            .collect();
        return print_json(&tables);
    }

    for table in store.tables() {
        println!(
            "{} ({} rows): {}",
            table.name(),
            table.records().len(),
            table.columns().join(", ")
        );
    }
    Ok(())
}

// ============================================================================
// Text Rendering
// ============================================================================

pub fn render_response(response: &QueryResponse) -> String {
    let mut out = String::new();
    let column = response.column.as_deref().unwrap_or_default();

    match response.query_type {
        QueryIntent::Count => {
            let _ = writeln!(
                out,
                "{} has {} records",
                response.table,
                response.count.unwrap_or_default()
            );
        }
        QueryIntent::Sum => {
            let _ = writeln!(
                out,
                "Total {} in {}: {}",
                column,
                response.table,
                response.total.unwrap_or_default()
            );
        }
        QueryIntent::Average => {
            let _ = writeln!(
                out,
                "Average {} in {}: {:.2}",
                column,
                response.table,
                response.average.unwrap_or_default()
            );
            if let Some(warning) = &response.warning {
                let _ = writeln!(out, "Warning: {}", warning);
            }
        }
        QueryIntent::SelectAll | QueryIntent::Filter => {
            let records = response.results.as_deref().unwrap_or_default();
            match (&response.filter_column, &response.filter_value) {
                (Some(column), Some(value)) => {
                    let _ = writeln!(
                        out,
                        "{} records in {} where {} = {}\n",
                        records.len(),
                        response.table,
                        column,
                        value
                    );
                }
                _ => {
                    let _ = writeln!(out, "{} records in {}\n", records.len(), response.table);
                }
            }
            if records.is_empty() {
                out.push_str("No matching records.\n");
            } else {
                out.push_str(&render_records(records));
            }
        }
    }
    out
}

/// Aligned text table; columns come from the first record.
pub fn render_records(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let columns: Vec<&str> = first.columns().collect();

    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| record.get(c).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(c.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c, w = *w))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<w$}", v, w = *w))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

pub fn render_query_error(error: &QueryError) -> String {
    let mut out = format!("{}: {}\n", error.kind(), error.message());
    let details = error.details();

    for key in [
        "available_tables",
        "available_columns",
        "supported_query_types",
    ] {
        if let Some(items) = details.get(key).and_then(|v| v.as_array()) {
            let items: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
            let _ = writeln!(out, "  {}: {}", key.replace('_', " "), items.join(", "));
        }
    }
    if let Some(suggestion) = details.get("suggestion").and_then(|v| v.as_str()) {
        let _ = writeln!(out, "  suggestion: {}", suggestion);
    }
    out
}

pub fn render_explanation(payload: &ExplanationPayload) -> String {
    let mut out = String::new();
    if payload.status == Status::Error {
        let _ = writeln!(out, "Cannot run query: {}", payload.explanation);
        if !payload.supported_query_types.is_empty() {
            let _ = writeln!(
                out,
                "  supported query types: {}",
                payload.supported_query_types.join(", ")
            );
        }
    } else {
        let _ = writeln!(out, "{}", payload.explanation);
    }

    for (i, step) in payload.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }
    out
}

pub fn render_validation(report: &ValidationReport) -> String {
    if report.valid {
        return format!("Valid: {}\n", report.reason);
    }

    let mut out = format!("Invalid: {}\n", report.reason);
    for issue in &report.issues {
        let _ = writeln!(out, "  - {}", issue.message);
        if let Some(tables) = &issue.available_tables {
            let _ = writeln!(out, "    available tables: {}", tables.join(", "));
        }
        if let Some(columns) = &issue.available_columns {
            let _ = writeln!(out, "    available columns: {}", columns.join(", "));
        }
    }
    out
}
