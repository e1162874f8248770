//! Tracing subscriber setup.
//!
//! Log output never goes to stdout, which carries query results.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};
use crate::error::{Result, TabulaError};

/// Install the global subscriber.
///
/// Level precedence: `level_override` (the CLI flag), then `RUST_LOG`, then
/// `logging.level` from the config.
pub fn init_logging(config: &Config, level_override: Option<&str>) -> Result<()> {
    let filter = match level_override {
        Some(level) => build_env_filter(level)?,
        None => match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => build_env_filter(&config.logging.level)?,
        },
    };

    let writer = match config.log_file() {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = config.logging.file.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .try_init(),
    };

    installed.map_err(|e| TabulaError::Logging(e.to_string()))
}

fn build_env_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level)
        .map_err(|e| TabulaError::Logging(format!("Invalid log filter '{}': {}", level, e)))
}
