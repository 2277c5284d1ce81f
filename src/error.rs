use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source not found: {name} (expected at {path})")]
    SourceNotFound { name: &'static str, path: PathBuf },

    #[error("Source format error: {name} at {path}: {detail}")]
    SourceFormat {
        name: &'static str,
        path: PathBuf,
        detail: String,
    },

    #[error("Integrity mismatch for table {table}: {expected} rows in memory, {actual} rows persisted")]
    IntegrityMismatch {
        table: String,
        expected: u64,
        actual: u64,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid timestamp in {name} row {row}: {value:?}")]
    InvalidTimestamp {
        name: &'static str,
        row: usize,
        value: String,
    },

    #[error("Duplicate join key in {table}: {key}")]
    DuplicateJoinKey { table: &'static str, key: String },

    #[error("Spreadsheet error on {path}: {detail}")]
    Spreadsheet { path: PathBuf, detail: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
