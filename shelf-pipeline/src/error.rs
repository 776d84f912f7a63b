//! Pipeline error types.
//!
//! Every failure is scoped to the view or interaction that hit it.

use std::path::PathBuf;

use shelf_bridge::GatewayError;
use thiserror::Error;

use crate::schema::Column;

/// A file could not be turned into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("No header row found")]
    MissingHeader,

    #[error("'{file_name}' is not a tabular file")]
    NotTabular { file_name: String },
}

/// A derived view needs a column the table does not have.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{view} unavailable: missing column(s) {}", join_columns(.missing))]
pub struct SchemaError {
    pub view: &'static str,
    pub missing: Vec<Column>,
}

fn join_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.canonical_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejected threshold or runtime setting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("near-expiry minimum ({min}) is greater than maximum ({max})")]
    InvertedWindow { min: i64, max: i64 },

    #[error("{field} = {value} is outside [{lower}, {upper}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("context limit must be at least 1")]
    ZeroContextLimit,
}

/// One assistant turn failed; the session carries on.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Failed to encode product context: {0}")]
    Context(#[from] csv::Error),
}

impl TurnError {
    /// Whether sending the same message again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TurnError::Gateway(err) => err.is_retryable(),
            TurnError::Context(_) => false,
        }
    }
}

/// Writing a view to disk failed.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}
