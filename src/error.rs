use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while sorting samples into coast files
#[derive(Error, Debug)]
pub enum SortError {
    #[error("input file not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read input {input}: {source}")]
    ReadInput {
        input: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed record on line {line_number}: {line:?} has no location field")]
    MalformedRecord { line_number: usize, line: String },

    #[error("failed to write output {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("separator must not be empty")]
    InvalidSeparator,

    #[error("invalid group configuration {}: {source}", path.display())]
    GroupConfig {
        path: PathBuf,
        #[source]
        source: GroupConfigError,
    },

    #[error("failed to write summary {}: {source}", path.display())]
    WriteSummary {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reasons a groups file could not be loaded
#[derive(Error, Debug)]
pub enum GroupConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for sorting operations
pub type SortResult<T> = Result<T, SortError>;
