//! Read-only in-memory table store.
//!
//! Tables are built once from a [`SchemaConfig`] and never mutated
//! afterwards, so a store can be shared behind an `Arc` and read from any
//! number of threads without locking.

mod value;

pub use value::{Value, ValueKind};

use std::collections::HashSet;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::{SchemaConfig, TableDefinition};
use crate::error::ConfigError;

// ============================================================================
// Record
// ============================================================================

/// A row: column name to value, kept in the table's column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    fn new(columns: &[String], values: &[Value]) -> Self {
        Self {
            fields: columns.iter().cloned().zip(values.iter().cloned()).collect(),
        }
    }

    /// Value of `column`, if the record has it.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Table
// ============================================================================

/// A named table with fixed columns.
///
/// Table and column names are stored lowercased, since queries are matched
/// against them after lowercasing.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    fn from_definition(def: &TableDefinition) -> Result<Self, ConfigError> {
        let name = def.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(ConfigError::MissingField("schema.tables.name".to_string()));
        }
        if def.columns.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "table '{}' must declare at least one column",
                def.name
            )));
        }

        let columns: Vec<String> = def
            .columns
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();
        let mut seen = HashSet::new();
        for column in &columns {
            if column.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "table '{}' declares an empty column name",
                    def.name
                )));
            }
            if !seen.insert(column.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "table '{}' declares column '{}' twice",
                    def.name, column
                )));
            }
        }

        let mut records = Vec::with_capacity(def.rows.len());
        for (i, row) in def.rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ConfigError::Invalid(format!(
                    "row {} of table '{}' has {} values, expected {}",
                    i,
                    def.name,
                    row.len(),
                    columns.len()
                )));
            }
            records.push(Record::new(&columns, row));
        }

        Ok(Self {
            name,
            columns,
            records,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

// ============================================================================
// Table Store
// ============================================================================

/// Holds every named table, in schema declaration order.
#[derive(Debug, Clone)]
pub struct TableStore {
    tables: Vec<Table>,
}

impl TableStore {
    /// Build the store from a schema, validating its shape.
    pub fn from_schema(schema: &SchemaConfig) -> Result<Self, ConfigError> {
        let mut tables: Vec<Table> = Vec::with_capacity(schema.tables.len());

        for def in &schema.tables {
            let table = Table::from_definition(def)?;
            if tables.iter().any(|t| t.name == table.name) {
                return Err(ConfigError::Invalid(format!(
                    "table '{}' is declared twice",
                    table.name
                )));
            }
            tracing::debug!(
                table = %table.name,
                columns = table.columns.len(),
                rows = table.records.len(),
                "Loaded table"
            );
            tables.push(table);
        }

        Ok(Self { tables })
    }

    /// Store populated with the built-in seed dataset.
    pub fn seeded() -> Self {
        Self::from_schema(&SchemaConfig::default()).expect("Invalid seed schema")
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn get_table(&self, name: &str) -> Option<&[Record]> {
        self.table(name).map(Table::records)
    }

    /// Columns of `name`; `None` only when the table does not exist.
    pub fn table_columns(&self, name: &str) -> Option<&[String]> {
        self.table(name).map(Table::columns)
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::seeded()
    }
}
