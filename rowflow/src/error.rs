use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced while wiring a graph or draining a row stream.
/// Errors are terminal: once a stream yields one, it yields nothing else.
#[derive(Error, Debug)]
pub enum Error {
    #[error("row has no column {column:?}")]
    MissingColumn { column: String },

    #[error("column {column:?}: expected {expected}, found {found}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("no input named {name:?} was supplied to run")]
    MissingInput { name: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid row json: {0}")]
    Json(String),

    #[error("datetime {value:?}: {source}")]
    Datetime {
        value: String,
        #[source]
        source: chrono::format::ParseError,
    },

    #[error("sort worker failed: {0}")]
    SortWorker(String),

    #[error("sort returned {received} rows for {sent} ingested")]
    SortCountMismatch { sent: usize, received: usize },
}

impl Error {
    pub(crate) fn missing_column(column: impl Into<String>) -> Self {
        Error::MissingColumn {
            column: column.into(),
        }
    }

    pub(crate) fn column_type(
        column: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        Error::ColumnType {
            column: column.into(),
            expected,
            found,
        }
    }
}
