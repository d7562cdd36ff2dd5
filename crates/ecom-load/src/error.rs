use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot use destination {path}: {source}")]
    MissingDestination {
        path: String,
        source: std::io::Error,
    },

    #[error("dataset name is empty")]
    UnspecifiedName,

    #[error("write {path}: {source}")]
    WriteFailed {
        path: String,
        source: polars::error::PolarsError,
    },
}

pub type Result<T> = std::result::Result<T, LoadError>;
