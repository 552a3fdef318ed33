//! CLI command implementations for Critterworld.

pub(crate) mod mutate;
pub(crate) mod parse;
pub(crate) mod run;
pub(crate) mod survey;

mod output;

use clap::ValueEnum;
use critterworld::{Constants, LoadError, ParseError, WorldError};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Output format for the `run` and `survey` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<WorldError> for CliError {
    fn from(e: WorldError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

/// Seed from the command line, or one derived from the clock.
fn seed_or_random(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}

/// Constants from `path`, or the defaults.
fn constants_from(path: Option<&Path>) -> Result<Constants, CliError> {
    Ok(match path {
        Some(path) => critterworld::loader::load_constants(path)?,
        None => Constants::default(),
    })
}
