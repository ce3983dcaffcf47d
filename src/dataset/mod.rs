//! Input data: the disclosure table and the alias table.
//!
//! Both are loaded once at startup and never mutated afterwards.

pub mod aliases;
pub mod table;

pub use aliases::AliasTable;
pub use table::{Dataset, DisclosureRecord};

use thiserror::Error;

/// Errors raised while loading input files.
#[derive(Debug, Error)]
pub enum DataError {
    /// The file could not be opened.
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The CSV itself is malformed (ragged rows, bad UTF-8, ...).
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required header is absent.
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    /// The `year` cell is empty or not an integer.
    #[error("line {line}: invalid year `{value}`")]
    InvalidYear { line: u64, value: String },

    /// An indicator cell holds text that is neither a number nor a null marker.
    #[error("line {line}: invalid value `{value}` in column `{column}`")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },
}
