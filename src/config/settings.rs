//! Configuration settings for Tabula.

use crate::error::{ConfigError, Result};
use crate::store::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub interpreter: InterpreterSettings,
    pub schema: SchemaConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            // Current directory
            PathBuf::from("tabula.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("tabula/config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".tabula/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.is_file() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.interpreter.aggregate_columns.is_empty() {
            return Err(
                ConfigError::MissingField("interpreter.aggregate_columns".to_string()).into(),
            );
        }

        for (column, words) in &self.interpreter.synonyms {
            if words.iter().any(|w| w.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "synonyms for '{}' must not contain empty words",
                    column
                ))
                .into());
            }
        }

        if self.schema.tables.is_empty() {
            return Err(ConfigError::MissingField("schema.tables".to_string()).into());
        }

        Ok(())
    }

    /// Expand the log file path, if one is configured.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging
            .file
            .as_ref()
            .map(|f| PathBuf::from(shellexpand::tilde(f).as_ref()))
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive, overridden by `RUST_LOG`
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Append logs to this file instead of stderr
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            file: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

// ============================================================================
// Interpreter
// ============================================================================

/// How the classifier decides that a query is a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterDetection {
    /// Keyword, a known table name, and a `where|with <column> <op> <value>`
    /// condition must all be present.
    #[default]
    Strict,
    /// Any filter keyword (as a whole word) is enough.
    Keyword,
}

/// Interpreter tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterSettings {
    pub filter_detection: FilterDetection,
    /// Columns sum and average queries look for, in priority order
    pub aggregate_columns: Vec<String>,
    /// Canonical column to words that may refer to it
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        let mut synonyms = BTreeMap::new();
        synonyms.insert(
            "amount".to_string(),
            to_strings(&["total", "sum", "value", "price", "sales", "revenue"]),
        );
        synonyms.insert(
            "price".to_string(),
            to_strings(&["cost", "value", "pricing"]),
        );

        Self {
            filter_detection: FilterDetection::Strict,
            aggregate_columns: to_strings(&["amount", "price"]),
            synonyms,
        }
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Static schema the table store is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub tables: Vec<TableDefinition>,
}

/// One table: its columns and seed rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            tables: vec![
                TableDefinition {
                    name: "sales".to_string(),
                    columns: to_strings(&["id", "product", "amount", "date", "region"]),
                    rows: vec![
                        row(1, "Laptop", 1200, "2023-01-15", "North"),
                        row(2, "Phone", 800, "2023-01-16", "South"),
                        row(3, "Tablet", 450, "2023-01-17", "East"),
                        row(4, "Laptop", 1200, "2023-01-18", "West"),
                        row(5, "Phone", 800, "2023-01-19", "North"),
                    ],
                },
                TableDefinition {
                    name: "customers".to_string(),
                    columns: to_strings(&["id", "name", "email", "join_date"]),
                    rows: vec![
                        customer(1, "Alice", "alice@example.com", "2022-05-10"),
                        customer(2, "Bob", "bob@example.com", "2022-06-15"),
                        customer(3, "Charlie", "charlie@example.com", "2022-07-20"),
                    ],
                },
                TableDefinition {
                    name: "products".to_string(),
                    columns: to_strings(&["id", "name", "category", "price"]),
                    rows: vec![
                        product(1, "Laptop", "Electronics", 1200),
                        product(2, "Phone", "Electronics", 800),
                        product(3, "Tablet", "Electronics", 450),
                    ],
                },
            ],
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn row(id: i64, product: &str, amount: i64, date: &str, region: &str) -> Vec<Value> {
    vec![
        id.into(),
        product.into(),
        amount.into(),
        date.into(),
        region.into(),
    ]
}

fn customer(id: i64, name: &str, email: &str, join_date: &str) -> Vec<Value> {
    vec![id.into(), name.into(), email.into(), join_date.into()]
}

fn product(id: i64, name: &str, category: &str, price: i64) -> Vec<Value> {
    vec![id.into(), name.into(), category.into(), price.into()]
}
