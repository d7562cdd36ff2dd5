use thiserror::Error;

/// Extraction failures. All fatal; the operator fixes the source and reruns.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("source file missing: {path}")]
    SourceMissing { path: String },

    #[error("source {path} unreadable: {source}")]
    Unreadable {
        path: String,
        source: csv::Error,
    },

    #[error("source {path} unparsable: {source}")]
    Unparsable {
        path: String,
        source: polars::error::PolarsError,
    },

    #[error("no source configured for table '{table}'")]
    UnconfiguredTable { table: String },
}

pub type Result<T> = std::result::Result<T, ExtractError>;
