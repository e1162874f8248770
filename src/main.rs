//! Tabula command-line entry point

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tabula::{Config, QueryProcessor};

mod cli;

/// Tabula: ask questions of in-memory tables in plain English
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log level or filter directive (overrides RUST_LOG and the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a natural language query
    Query {
        /// Query text, e.g. "how many customers do we have"
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Describe how a query would be executed
    Explain {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Check whether a query can be executed
    Validate {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List tables with their columns and row counts
    Tables,
    /// Interactive prompt (default)
    Shell,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    tabula::init_logging(&config, args.log_level.as_deref())?;
    tracing::debug!(
        filter_detection = ?config.interpreter.filter_detection,
        tables = config.schema.tables.len(),
        "Configuration loaded"
    );

    let processor = QueryProcessor::from_config(&config)?;

    match args.command.unwrap_or(Command::Shell) {
        Command::Query { text } => cli::run_query(&processor, &text.join(" "), args.json),
        Command::Explain { text } => cli::run_explain(&processor, &text.join(" "), args.json),
        Command::Validate { text } => cli::run_validate(&processor, &text.join(" "), args.json),
        Command::Tables => cli::run_tables(&processor, args.json),
        Command::Shell => cli::run_shell(&processor, args.json),
    }
}
