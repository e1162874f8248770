//! CLI command handlers.
//!
//! Every handler runs against one [`QueryProcessor`] built from the loaded
//! configuration.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use anyhow::Result;
use tabula::QueryProcessor;

use super::output;

/// Run the query command.
pub fn run_query(processor: &QueryProcessor, text: &str, json: bool) -> Result<ExitCode> {
    match processor.process_query(text) {
        Ok(response) => {
            output::print_response(&response, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            output::print_query_error(&e, json)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Run the explain command.
pub fn run_explain(processor: &QueryProcessor, text: &str, json: bool) -> Result<ExitCode> {
    let payload = processor.explain_query(text);
    output::print_explanation(&payload, json)?;
    Ok(ExitCode::SUCCESS)
}

/// Run the validate command. Exits non-zero for invalid queries.
pub fn run_validate(processor: &QueryProcessor, text: &str, json: bool) -> Result<ExitCode> {
    let report = processor.validate_query(text);
    output::print_validation(&report, json)?;
    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run the tables command.
pub fn run_tables(processor: &QueryProcessor, json: bool) -> Result<ExitCode> {
    output::print_tables(processor.store(), json)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Interactive Shell
// ============================================================================

/// A line typed at the shell prompt.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand<'a> {
    Ask(&'a str),
    Explain(&'a str),
    Validate(&'a str),
    Tables,
    Help,
    Exit,
    Empty,
}

/// Parse a prompt line. Text without a command word is treated as a question.
pub fn parse_shell_line(line: &str) -> ShellCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "exit" | "quit" if rest.is_empty() => ShellCommand::Exit,
        "tables" if rest.is_empty() => ShellCommand::Tables,
        "help" if rest.is_empty() => ShellCommand::Help,
        "ask" => ShellCommand::Ask(rest),
        "explain" => ShellCommand::Explain(rest),
        "validate" => ShellCommand::Validate(rest),
        _ => ShellCommand::Ask(line),
    }
}

/// Read questions from stdin until `exit` or end of input.
pub fn run_shell(processor: &QueryProcessor, json: bool) -> Result<ExitCode> {
    println!("Tabula v{}: natural language queries over tables", env!("CARGO_PKG_VERSION"));
    println!("Tables: {}\n", processor.table_names().join(", "));
    print_shell_help();

    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        print!("tabula> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        match parse_shell_line(&input) {
            ShellCommand::Empty => continue,
            ShellCommand::Exit => {
                println!("Goodbye!");
                break;
            }
            ShellCommand::Help => print_shell_help(),
            ShellCommand::Tables => {
                run_tables(processor, json)?;
            }
            ShellCommand::Ask(text) => {
                run_query(processor, text, json)?;
            }
            ShellCommand::Explain(text) => {
                run_explain(processor, text, json)?;
            }
            ShellCommand::Validate(text) => {
                run_validate(processor, text, json)?;
            }
        }
        println!();
    }

    Ok(ExitCode::SUCCESS)
}

fn print_shell_help() {
    println!("Commands:");
    println!("  - ASK: type a question, or 'ask <question>'");
    println!("  - EXPLAIN: 'explain <question>' shows what would run");
    println!("  - VALIDATE: 'validate <question>' checks it without running");
    println!("  - TABLES: list tables and columns");
    println!("  - EXIT: 'exit' or 'quit'\n");
}
