use std::path::PathBuf;

use thiserror::Error;

/// Result type returned by the bulk loader.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that abort a bulk load.
///
/// Every variant is fatal for the whole load: nothing written by the failed load is committed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Missing file: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("Error while reading `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while parsing `{file}`: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("`{file}` has no `{column}` column")]
    MissingColumn {
        file: &'static str,
        column: &'static str,
    },

    #[error("`{file}` line {line}: required field `{column}` is empty")]
    MissingRequiredField {
        file: &'static str,
        line: u64,
        column: &'static str,
    },

    #[error("`{file}` line {line}: field `{column}` has malformed value `{value}`")]
    MalformedField {
        file: &'static str,
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("Total rows {total} exceeds {limit} limit. Reduce dataset.")]
    CapacityExceeded { total: u64, limit: u64 },

    #[error("Error while writing to the database: {0}")]
    Database(#[from] sqlx::Error),
}

impl LoadError {
    /// Short classification used as the outcome label of load metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            LoadError::MissingSource(_) => "missing_source",
            LoadError::Io { .. } | LoadError::Csv { .. } => "unreadable_source",
            LoadError::MissingColumn { .. }
            | LoadError::MissingRequiredField { .. }
            | LoadError::MalformedField { .. } => "malformed_row",
            LoadError::CapacityExceeded { .. } => "capacity_exceeded",
            LoadError::Database(_) => "database_error",
        }
    }
}
