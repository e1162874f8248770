//! CLI module for the Tabula command-line interface.
//!
//! Command handlers run queries through a local processor and print the
//! results as text or JSON.

mod commands;
mod output;

pub use commands::*;
