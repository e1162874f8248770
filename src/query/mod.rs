//! Natural language query interpreter.
//!
//! This module provides:
//! - Intent classification for plain English questions
//! - Table, column, and filter condition extraction
//! - Execution against the in-memory table store
//! - Explanation and validation without execution

pub mod classifier;
pub mod executor;
pub mod explainer;
pub mod extractor;
pub mod processor;
pub mod types;
pub mod validator;

pub use classifier::IntentClassifier;
pub use executor::{QueryExecutor, EMPTY_TABLE_WARNING};
pub use explainer::QueryExplainer;
pub use extractor::EntityExtractor;
pub use processor::QueryProcessor;
pub use types::*;
pub use validator::QueryValidator;
