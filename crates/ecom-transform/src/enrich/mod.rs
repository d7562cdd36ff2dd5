//! Dimensional enrichment.
//!
//! Every enricher takes a cleaned fact table plus raw dimension tables,
//! validates each dimension immediately before use (dimensions are never
//! repaired), and produces a frame with the same rows as the fact input:
//! left joins keep unmatched rows with nulls in the joined columns, and
//! derived columns are row-wise pure functions.
//!
//! Joins are key-to-row lookup maps. After uniqueness validation every key
//! maps to exactly one dimension row, so lookup order cannot matter.

pub mod inventory;
pub mod orders;
pub mod reviews;

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame};

use ecom_ingest::data_utils::{any_to_f64, any_to_string, is_missing_value};
use ecom_model::Result;

use crate::validator::SchemaValidator;

/// Validate a dimension table right before joining against it.
pub(crate) fn validate_dimension(
    df: &DataFrame,
    table: &str,
    required: &[&str],
    non_null: &[&str],
    key: &str,
) -> Result<()> {
    let validator = SchemaValidator::new(table, df);
    validator.validate_required_columns(required)?;
    validator.validate_no_nulls(non_null)?;
    validator.validate_unique_values(&[key])
}

/// Key string → row index. Keys are unique by prior validation.
pub(crate) fn build_lookup(df: &DataFrame, key: &str) -> Result<BTreeMap<String, usize>> {
    let column = df.column(key)?;
    let mut lookup = BTreeMap::new();
    for idx in 0..df.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        if is_missing_value(&value) {
            continue;
        }
        lookup.entry(any_to_string(value)).or_insert(idx);
    }
    Ok(lookup)
}

/// For each fact row, the matching dimension row (if any).
pub(crate) fn match_indices(
    fact: &DataFrame,
    key: &str,
    lookup: &BTreeMap<String, usize>,
) -> Result<Vec<Option<usize>>> {
    let column = fact.column(key)?;
    let mut indices = Vec::with_capacity(fact.height());
    for idx in 0..fact.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        if is_missing_value(&value) {
            indices.push(None);
            continue;
        }
        indices.push(lookup.get(&any_to_string(value)).copied());
    }
    Ok(indices)
}

/// Gather one dimension column as strings along the match indices.
pub(crate) fn gather_string(
    dim: &DataFrame,
    name: &str,
    indices: &[Option<usize>],
) -> Result<Vec<Option<String>>> {
    let column = dim.column(name)?;
    let mut values = Vec::with_capacity(indices.len());
    for index in indices {
        match index {
            None => values.push(None),
            Some(idx) => {
                let value = column.get(*idx).unwrap_or(AnyValue::Null);
                if is_missing_value(&value) {
                    values.push(None);
                } else {
                    values.push(Some(any_to_string(value)));
                }
            }
        }
    }
    Ok(values)
}

/// Gather one dimension column as floats along the match indices.
pub(crate) fn gather_f64(
    dim: &DataFrame,
    name: &str,
    indices: &[Option<usize>],
) -> Result<Vec<Option<f64>>> {
    let column = dim.column(name)?;
    let mut values = Vec::with_capacity(indices.len());
    for index in indices {
        match index {
            None => values.push(None),
            Some(idx) => {
                values.push(any_to_f64(column.get(*idx).unwrap_or(AnyValue::Null)));
            }
        }
    }
    Ok(values)
}

/// First seven characters of an ISO date, i.e. `YYYY-MM`.
pub(crate) fn month_of(date: &str) -> Option<String> {
    date.get(..7).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    use super::*;

    fn dim() -> DataFrame {
        let columns = vec![
            Series::new("customer_id".into(), vec!["1", "2"]).into_column(),
            Series::new("segment".into(), vec!["premium", "standard"]).into_column(),
        ];
        DataFrame::new(columns).expect("dim frame")
    }

    #[test]
    fn unmatched_fact_rows_get_none() {
        let fact = DataFrame::new(vec![
            Series::new("customer_id".into(), vec!["2", "9"]).into_column(),
        ])
        .expect("fact frame");
        let dim = dim();
        let lookup = build_lookup(&dim, "customer_id").expect("lookup");
        let indices = match_indices(&fact, "customer_id", &lookup).expect("indices");
        assert_eq!(indices, vec![Some(1), None]);
        let segments = gather_string(&dim, "segment", &indices).expect("gather");
        assert_eq!(segments, vec![Some("standard".to_string()), None]);
    }

    #[test]
    fn month_extraction() {
        assert_eq!(month_of("2026-03-05"), Some("2026-03".to_string()));
        assert_eq!(month_of("bad"), None);
    }
}
