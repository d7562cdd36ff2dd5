//! Stateless schema and quality checks over a single frame.
//!
//! Each check logs the violation with counts and a sample of offending
//! values, then returns the typed error. There is no partial-pass mode: the
//! first violation found aborts the run.

use std::collections::BTreeSet;

use polars::prelude::{AnyValue, DataFrame, DataType};
use tracing::error;

use ecom_ingest::data_utils::{any_to_f64, any_to_string, is_missing_value};
use ecom_model::{Result, TransformError};

const SAMPLE_LIMIT: usize = 5;

/// Validation entry point for one named table.
pub struct SchemaValidator<'df> {
    table: String,
    df: &'df DataFrame,
}

impl<'df> SchemaValidator<'df> {
    pub fn new(table: impl Into<String>, df: &'df DataFrame) -> Self {
        Self {
            table: table.into(),
            df,
        }
    }

    /// Every listed column must exist in the frame.
    pub fn validate_required_columns(&self, columns: &[&str]) -> Result<()> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|name| self.df.column(name).is_err())
            .map(|name| name.to_string())
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        error!(
            table = %self.table,
            missing = ?missing,
            "required columns absent"
        );
        Err(TransformError::MissingColumns {
            table: self.table.clone(),
            missing,
        })
    }

    /// Listed columns must contain no missing values. A cell is missing when
    /// it is a frame null or an empty/whitespace string.
    pub fn validate_no_nulls(&self, columns: &[&str]) -> Result<()> {
        self.validate_required_columns(columns)?;
        let mut violations: Vec<String> = Vec::new();
        for name in columns {
            let column = self.df.column(name)?;
            let mut nulls = 0usize;
            for idx in 0..self.df.height() {
                if is_missing_value(&column.get(idx).unwrap_or(AnyValue::Null)) {
                    nulls += 1;
                }
            }
            if nulls > 0 {
                violations.push(format!("{name}: {nulls} null(s)"));
            }
        }
        if violations.is_empty() {
            return Ok(());
        }
        let details = violations.join(", ");
        error!(table = %self.table, %details, "forbidden nulls");
        Err(TransformError::ForbiddenNulls {
            table: self.table.clone(),
            details,
        })
    }

    /// The listed columns must form a unique composite key. Rows whose key
    /// cells are all missing are skipped; null handling is a separate check.
    pub fn validate_unique_values(&self, columns: &[&str]) -> Result<()> {
        self.validate_required_columns(columns)?;
        let mut seen = BTreeSet::new();
        let mut duplicates = 0usize;
        let mut sample: Vec<String> = Vec::new();
        for idx in 0..self.df.height() {
            let mut composite = String::new();
            for (pos, name) in columns.iter().enumerate() {
                if pos > 0 {
                    composite.push('|');
                }
                let value = self.df.column(name)?.get(idx).unwrap_or(AnyValue::Null);
                composite.push_str(any_to_string(value).trim());
            }
            if composite.trim().trim_matches('|').is_empty() {
                continue;
            }
            if !seen.insert(composite.clone()) {
                duplicates += 1;
                if sample.len() < SAMPLE_LIMIT {
                    sample.push(composite);
                }
            }
        }
        if duplicates == 0 {
            return Ok(());
        }
        error!(
            table = %self.table,
            columns = ?columns,
            count = duplicates,
            sample = ?sample,
            "duplicate key values"
        );
        Err(TransformError::DuplicateKey {
            table: self.table.clone(),
            columns: columns.iter().map(|name| name.to_string()).collect(),
            count: duplicates,
        })
    }

    /// Every non-missing value in `column` must fall inside the inclusive
    /// bounds. Either side may be open.
    pub fn validate_value_range(
        &self,
        column: &str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<()> {
        self.validate_required_columns(&[column])?;
        let series = self.df.column(column)?;
        let mut count = 0usize;
        let mut sample: Vec<String> = Vec::new();
        for idx in 0..self.df.height() {
            let value = series.get(idx).unwrap_or(AnyValue::Null);
            if is_missing_value(&value) {
                continue;
            }
            let Some(number) = any_to_f64(value) else {
                continue;
            };
            let below = min.is_some_and(|bound| number < bound);
            let above = max.is_some_and(|bound| number > bound);
            if below || above {
                count += 1;
                if sample.len() < SAMPLE_LIMIT {
                    sample.push(ecom_ingest::data_utils::format_numeric(number));
                }
            }
        }
        if count == 0 {
            return Ok(());
        }
        let range = describe_range(min, max);
        error!(
            table = %self.table,
            column,
            count,
            %range,
            sample = ?sample,
            "values outside declared range"
        );
        Err(TransformError::OutOfRange {
            table: self.table.clone(),
            column: column.to_string(),
            count,
            range,
            sample,
        })
    }

    /// The column's physical dtype must equal the expected one.
    pub fn validate_dtype(&self, column: &str, expected: &DataType) -> Result<()> {
        self.validate_required_columns(&[column])?;
        let actual = self.df.column(column)?.dtype().clone();
        if &actual == expected {
            return Ok(());
        }
        error!(
            table = %self.table,
            column,
            expected = %expected,
            actual = %actual,
            "column dtype mismatch"
        );
        Err(TransformError::DtypeMismatch {
            table: self.table.clone(),
            column: column.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

fn describe_range(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("[{min}, {max}]"),
        (Some(min), None) => format!("[{min}, +inf)"),
        (None, Some(max)) => format!("(-inf, {max}]"),
        (None, None) => "(-inf, +inf)".to_string(),
    }
}
