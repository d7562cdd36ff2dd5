//! Typed errors for the transform stage.
//!
//! Every variant is fatal to the run: validation raises the first violation
//! it finds, the orchestrator logs the category and propagates. There is no
//! partial-success mode anywhere in the pipeline.

use std::fmt;

use thiserror::Error;

/// Coarse error family, used when logging a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Required column absent or a column's type mismatches its declaration.
    SchemaValidation,
    /// Forbidden null, out-of-range value, or duplicated key.
    DataQuality,
    /// A cleaning pass made the data worse. Always a bug signal.
    CleaningInvariant,
    /// Underlying frame engine failure.
    Engine,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SchemaValidation => "schema_validation",
            Self::DataQuality => "data_quality",
            Self::CleaningInvariant => "cleaning_invariant",
            Self::Engine => "engine",
        };
        f.write_str(label)
    }
}

/// Errors raised by cleaning, enrichment, and aggregation.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("table '{table}': missing required columns {missing:?}")]
    MissingColumns { table: String, missing: Vec<String> },

    #[error(
        "table '{table}', column '{column}': expected type {expected}, found {actual}"
    )]
    DtypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },

    #[error("table '{table}': forbidden nulls in {details}")]
    ForbiddenNulls { table: String, details: String },

    #[error(
        "table '{table}', column '{column}': {count} value(s) outside {range}, sample {sample:?}"
    )]
    OutOfRange {
        table: String,
        column: String,
        count: usize,
        range: String,
        sample: Vec<String>,
    },

    #[error("table '{table}': {count} duplicate key value(s) over {columns:?}")]
    DuplicateKey {
        table: String,
        columns: Vec<String>,
        count: usize,
    },

    #[error("table '{table}', column '{column}': cleaning invariant violated: {details}")]
    CleaningInvariant {
        table: String,
        column: String,
        details: String,
    },

    #[error("frame operation failed: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

impl TransformError {
    /// The family this error belongs to, for structured log fields.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingColumns { .. } | Self::DtypeMismatch { .. } => {
                ErrorCategory::SchemaValidation
            }
            Self::ForbiddenNulls { .. }
            | Self::OutOfRange { .. }
            | Self::DuplicateKey { .. } => ErrorCategory::DataQuality,
            Self::CleaningInvariant { .. } => ErrorCategory::CleaningInvariant,
            Self::Frame(_) => ErrorCategory::Engine,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_match_variants() {
        let missing = TransformError::MissingColumns {
            table: "orders".to_string(),
            missing: vec!["order_id".to_string()],
        };
        assert_eq!(missing.category(), ErrorCategory::SchemaValidation);

        let nulls = TransformError::ForbiddenNulls {
            table: "orders".to_string(),
            details: "order_id: 2 null(s)".to_string(),
        };
        assert_eq!(nulls.category(), ErrorCategory::DataQuality);

        let invariant = TransformError::CleaningInvariant {
            table: "orders".to_string(),
            column: "subtotal".to_string(),
            details: "nulls increased".to_string(),
        };
        assert_eq!(invariant.category(), ErrorCategory::CleaningInvariant);
    }

    #[test]
    fn display_names_table_and_column() {
        let error = TransformError::OutOfRange {
            table: "reviews".to_string(),
            column: "rating".to_string(),
            count: 1,
            range: "[1, 5]".to_string(),
            sample: vec!["6".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("reviews"));
        assert!(message.contains("rating"));
        assert!(message.contains("[1, 5]"));
    }
}
