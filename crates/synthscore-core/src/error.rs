use thiserror::Error;

use crate::table::ColumnRole;

/// Core error type shared across Synthscore crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The table violates internal invariants.
    #[error("invalid table: {0}")]
    InvalidTable(String),
    /// A referenced column does not exist in the table.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// A column was accessed with the wrong role.
    #[error("column '{column}' is not {expected}")]
    ColumnRole {
        column: String,
        expected: ColumnRole,
    },
    /// Real/synthetic/holdout tables disagree on column names or roles.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    /// A CSV cell could not be parsed for its declared role.
    #[error("invalid value in column '{column}' row {row}: {message}")]
    InvalidValue {
        column: String,
        row: u64,
        message: String,
    },
    /// IO failure while reading a dataset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV parse failure while reading a dataset.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Convenience alias for results returned by Synthscore crates.
pub type Result<T> = std::result::Result<T, Error>;
