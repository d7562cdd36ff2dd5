//! Four-phase cleaning engine.
//!
//! Concrete tables contribute policy only (a [`CleanerSpec`]); the phase
//! order is fixed here and cannot be altered:
//!
//! 1. `handle_nulls` — per-column repair strategies, then a hard check that
//!    key and mandatory columns are fully populated.
//! 2. `handle_duplicates` — drop repeated primary keys, keeping the last
//!    occurrence in input order.
//! 3. `convert_types` — coerce every mapped column to its declared semantic
//!    type, failing on any non-missing value that does not parse.
//! 4. `validate_cleaned` — re-check schema, key integrity, and ranges.
//!
//! Cleaning an already-clean frame is a no-op.

pub mod inventory;
pub mod orders;
pub mod reviews;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::{
    AnyValue, BooleanChunked, DataFrame, IntoColumn, NamedFrom, NewChunkedArray, Series,
};
use tracing::{debug, info, warn};

use ecom_ingest::data_utils::{any_to_string, format_numeric, is_missing_value, parse_f64};
use ecom_model::{CleanerSpec, NullStrategy, Result, SemanticType, TransformError};

use crate::validator::SchemaValidator;

/// Run the full cleaning sequence over one frame.
pub fn clean(df: &DataFrame, spec: &CleanerSpec) -> Result<DataFrame> {
    let required: Vec<&str> = spec.required_columns.iter().map(String::as_str).collect();
    SchemaValidator::new(&spec.table, df).validate_required_columns(&required)?;

    let rows_in = df.height();
    let df = handle_nulls(df, spec)?;
    let df = handle_duplicates(df, spec)?;
    let df = convert_types(df, spec)?;
    validate_cleaned(&df, spec)?;
    info!(
        table = %spec.table,
        rows_in,
        rows_out = df.height(),
        "table cleaned"
    );
    Ok(df)
}

/// Snapshot of one column as owned strings, `None` for missing cells.
fn string_cells(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?;
    let mut cells = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let value = column.get(idx).unwrap_or(AnyValue::Null);
        if is_missing_value(&value) {
            cells.push(None);
        } else {
            cells.push(Some(any_to_string(value)));
        }
    }
    Ok(cells)
}

fn numeric_values(cells: &[Option<String>]) -> Vec<f64> {
    cells
        .iter()
        .flatten()
        .filter_map(|cell| parse_f64(cell))
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent non-missing value; ties go to the smallest value.
fn mode(cells: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for cell in cells.iter().flatten() {
        *counts.entry(cell.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(value_a, count_a), (value_b, count_b)| {
            count_a.cmp(count_b).then(value_b.cmp(value_a))
        })
        .map(|(value, _)| value.to_string())
}

fn fill_value(cells: &[Option<String>], strategy: &NullStrategy) -> Option<String> {
    match strategy {
        NullStrategy::DropRow => None,
        NullStrategy::FillMean => mean(&numeric_values(cells)).map(format_numeric),
        NullStrategy::FillMedian => median(&numeric_values(cells)).map(format_numeric),
        NullStrategy::FillMode => mode(cells),
        NullStrategy::FillConst(sentinel) => Some(sentinel.clone()),
        NullStrategy::FillZero => Some("0".to_string()),
    }
}

fn handle_nulls(df: &DataFrame, spec: &CleanerSpec) -> Result<DataFrame> {
    let mut df = df.clone();
    for (name, strategy) in &spec.strategies {
        if df.column(name).is_err() {
            continue;
        }
        let cells = string_cells(&df, name)?;
        let nulls_before = cells.iter().filter(|cell| cell.is_none()).count();
        if nulls_before == 0 {
            continue;
        }
        match strategy {
            NullStrategy::DropRow => {
                let keep: Vec<bool> = cells.iter().map(|cell| cell.is_some()).collect();
                let mask = BooleanChunked::from_slice("keep".into(), &keep);
                df = df.filter(&mask)?;
                debug!(
                    table = %spec.table,
                    column = %name,
                    strategy = strategy.label(),
                    dropped = nulls_before,
                    "rows dropped for missing values"
                );
            }
            strategy => {
                let Some(replacement) = fill_value(&cells, strategy) else {
                    warn!(
                        table = %spec.table,
                        column = %name,
                        strategy = strategy.label(),
                        "no usable values to derive a fill, column left as-is"
                    );
                    continue;
                };
                let filled: Vec<Option<String>> = cells
                    .iter()
                    .map(|cell| cell.clone().or_else(|| Some(replacement.clone())))
                    .collect();
                let nulls_after = filled.iter().filter(|cell| cell.is_none()).count();
                if nulls_after > nulls_before {
                    return Err(TransformError::CleaningInvariant {
                        table: spec.table.clone(),
                        column: name.clone(),
                        details: format!(
                            "null count rose from {nulls_before} to {nulls_after} during {}",
                            strategy.label()
                        ),
                    });
                }
                df.with_column(Series::new(name.as_str().into(), filled).into_column())?;
                debug!(
                    table = %spec.table,
                    column = %name,
                    strategy = strategy.label(),
                    filled = nulls_before,
                    "missing values filled"
                );
            }
        }
    }

    let mut protected: Vec<&str> = vec![spec.primary_key.as_str()];
    protected.extend(spec.mandatory.iter().map(String::as_str));
    SchemaValidator::new(&spec.table, &df).validate_no_nulls(&protected)?;
    Ok(df)
}

fn handle_duplicates(df: DataFrame, spec: &CleanerSpec) -> Result<DataFrame> {
    let cells = string_cells(&df, &spec.primary_key)?;
    let mut seen = BTreeSet::new();
    let mut keep = vec![false; cells.len()];
    for idx in (0..cells.len()).rev() {
        match &cells[idx] {
            Some(key) => keep[idx] = seen.insert(key.clone()),
            None => keep[idx] = true,
        }
    }
    let dropped = keep.iter().filter(|kept| !**kept).count();
    if dropped == 0 {
        return Ok(df);
    }
    debug!(
        table = %spec.table,
        key = %spec.primary_key,
        dropped,
        "duplicate keys dropped, last occurrence kept"
    );
    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn coercion_error(spec: &CleanerSpec, name: &str, semantic: SemanticType, raw: &str) -> TransformError {
    TransformError::DtypeMismatch {
        table: spec.table.clone(),
        column: name.to_string(),
        expected: semantic.name().to_string(),
        actual: format!("unparsable value '{raw}'"),
    }
}

fn convert_types(df: DataFrame, spec: &CleanerSpec) -> Result<DataFrame> {
    let mut df = df;
    for (name, semantic) in &spec.types {
        if df.column(name).is_err() {
            continue;
        }
        let cells = string_cells(&df, name)?;
        let column = match semantic {
            SemanticType::Int => {
                let mut values: Vec<Option<i64>> = Vec::with_capacity(cells.len());
                for cell in &cells {
                    match cell {
                        None => values.push(None),
                        Some(raw) => {
                            let parsed = raw
                                .trim()
                                .parse::<i64>()
                                .ok()
                                .or_else(|| {
                                    parse_f64(raw)
                                        .filter(|value| value.fract() == 0.0)
                                        .map(|value| value as i64)
                                })
                                .ok_or_else(|| coercion_error(spec, name, *semantic, raw))?;
                            values.push(Some(parsed));
                        }
                    }
                }
                Series::new(name.as_str().into(), values).into_column()
            }
            SemanticType::Float => {
                let mut values: Vec<Option<f64>> = Vec::with_capacity(cells.len());
                for cell in &cells {
                    match cell {
                        None => values.push(None),
                        Some(raw) => {
                            let parsed = parse_f64(raw)
                                .ok_or_else(|| coercion_error(spec, name, *semantic, raw))?;
                            values.push(Some(parsed));
                        }
                    }
                }
                Series::new(name.as_str().into(), values).into_column()
            }
            SemanticType::Text => {
                Series::new(name.as_str().into(), cells.clone()).into_column()
            }
            SemanticType::Date => {
                let mut values: Vec<Option<String>> = Vec::with_capacity(cells.len());
                for cell in &cells {
                    match cell {
                        None => values.push(None),
                        Some(raw) => {
                            let date = parse_date(raw)
                                .ok_or_else(|| coercion_error(spec, name, *semantic, raw))?;
                            values.push(Some(date.format("%Y-%m-%d").to_string()));
                        }
                    }
                }
                Series::new(name.as_str().into(), values).into_column()
            }
            SemanticType::Bool => {
                let mut values: Vec<Option<bool>> = Vec::with_capacity(cells.len());
                for cell in &cells {
                    match cell {
                        None => values.push(None),
                        Some(raw) => {
                            let parsed = parse_bool(raw)
                                .ok_or_else(|| coercion_error(spec, name, *semantic, raw))?;
                            values.push(Some(parsed));
                        }
                    }
                }
                Series::new(name.as_str().into(), values).into_column()
            }
        };
        df.with_column(column)?;
    }
    Ok(df)
}

fn validate_cleaned(df: &DataFrame, spec: &CleanerSpec) -> Result<()> {
    let validator = SchemaValidator::new(&spec.table, df);
    let required: Vec<&str> = spec.required_columns.iter().map(String::as_str).collect();
    validator.validate_required_columns(&required)?;
    validator.validate_no_nulls(&[spec.primary_key.as_str()])?;
    validator.validate_unique_values(&[spec.primary_key.as_str()])?;
    for range in &spec.ranges {
        if df.column(&range.column).is_err() {
            continue;
        }
        validator.validate_value_range(&range.column, range.min, range.max)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ecom_model::RangeConstraint;

    use super::*;

    fn test_df(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let values: Vec<Option<String>> = values
                    .into_iter()
                    .map(|value| value.map(str::to_string))
                    .collect();
                Series::new(name.into(), values).into_column()
            })
            .collect();
        DataFrame::new(columns).expect("test frame")
    }

    fn minimal_spec() -> CleanerSpec {
        CleanerSpec {
            table: "t".to_string(),
            primary_key: "id".to_string(),
            mandatory: Vec::new(),
            strategies: vec![("amount".to_string(), NullStrategy::FillMean)],
            types: vec![
                ("id".to_string(), SemanticType::Int),
                ("amount".to_string(), SemanticType::Float),
            ],
            ranges: vec![RangeConstraint::at_least("amount", 0.0)],
            required_columns: vec!["id".to_string(), "amount".to_string()],
        }
    }

    #[test]
    fn fill_mean_uses_only_observed_values() {
        let df = test_df(vec![
            ("id", vec![Some("1"), Some("2"), Some("3")]),
            ("amount", vec![Some("10"), None, Some("20")]),
        ]);
        let cleaned = clean(&df, &minimal_spec()).expect("clean");
        let amounts = cleaned.column("amount").expect("amount");
        let filled = amounts.f64().expect("float column").get(1).expect("value");
        assert!((filled - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duplicates_keep_last_occurrence() {
        let df = test_df(vec![
            ("id", vec![Some("1"), Some("1"), Some("2")]),
            ("amount", vec![Some("10"), Some("99"), Some("20")]),
        ]);
        let cleaned = clean(&df, &minimal_spec()).expect("clean");
        assert_eq!(cleaned.height(), 2);
        let first = cleaned
            .column("amount")
            .expect("amount")
            .f64()
            .expect("float column")
            .get(0)
            .expect("value");
        assert!((first - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unparsable_value_fails_coercion() {
        let df = test_df(vec![
            ("id", vec![Some("1")]),
            ("amount", vec![Some("abc")]),
        ]);
        let err = clean(&df, &minimal_spec()).unwrap_err();
        assert!(matches!(err, TransformError::DtypeMismatch { .. }));
    }

    #[test]
    fn null_primary_key_is_fatal_not_repaired() {
        let df = test_df(vec![
            ("id", vec![Some("1"), None]),
            ("amount", vec![Some("10"), Some("20")]),
        ]);
        let err = clean(&df, &minimal_spec()).unwrap_err();
        assert!(matches!(err, TransformError::ForbiddenNulls { .. }));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let df = test_df(vec![
            ("id", vec![Some("1"), Some("1"), Some("2")]),
            ("amount", vec![Some("10"), None, Some("20")]),
        ]);
        let spec = minimal_spec();
        let once = clean(&df, &spec).expect("first clean");
        let twice = clean(&once, &spec).expect("second clean");
        assert_eq!(once, twice);
    }

    #[test]
    fn all_null_fill_column_is_left_untouched() {
        let df = test_df(vec![
            ("id", vec![Some("1")]),
            ("amount", vec![None]),
        ]);
        let mut spec = minimal_spec();
        spec.ranges.clear();
        let cleaned = clean(&df, &spec).expect("clean");
        assert_eq!(cleaned.column("amount").expect("amount").null_count(), 1);
    }

    #[test]
    fn null_handling_never_raises_null_counts() {
        let df = test_df(vec![
            ("id", vec![Some("1"), Some("2"), Some("3")]),
            ("amount", vec![Some("10"), None, Some("20")]),
            ("notes", vec![None, Some("gift"), None]),
            ("qty", vec![Some("1"), None, None]),
        ]);
        let spec = CleanerSpec {
            table: "t".to_string(),
            primary_key: "id".to_string(),
            mandatory: Vec::new(),
            strategies: vec![
                ("amount".to_string(), NullStrategy::FillMean),
                (
                    "notes".to_string(),
                    NullStrategy::FillConst("n/a".to_string()),
                ),
                ("qty".to_string(), NullStrategy::FillZero),
            ],
            types: Vec::new(),
            ranges: Vec::new(),
            required_columns: vec!["id".to_string()],
        };
        let handled = handle_nulls(&df, &spec).expect("nulls handled");
        for name in ["id", "amount", "notes", "qty"] {
            let before = df.column(name).expect(name).null_count();
            let after = handled.column(name).expect(name).null_count();
            assert!(after <= before, "{name}: nulls rose from {before} to {after}");
        }
        assert_eq!(handled.column("amount").expect("amount").null_count(), 0);
        assert_eq!(handled.column("notes").expect("notes").null_count(), 0);
        assert_eq!(handled.column("qty").expect("qty").null_count(), 0);
    }

    #[test]
    fn dates_normalize_to_iso() {
        let mut spec = minimal_spec();
        spec.types.push(("day".to_string(), SemanticType::Date));
        spec.required_columns.push("day".to_string());
        let df = test_df(vec![
            ("id", vec![Some("1"), Some("2")]),
            ("amount", vec![Some("1"), Some("2")]),
            ("day", vec![Some("2026/03/05"), Some("2026-03-06 10:30:00")]),
        ]);
        let cleaned = clean(&df, &spec).expect("clean");
        let days = cleaned.column("day").expect("day");
        let first = days.str().expect("string column").get(0).expect("value");
        assert_eq!(first, "2026-03-05");
        let second = days.str().expect("string column").get(1).expect("value");
        assert_eq!(second, "2026-03-06");
    }

    #[test]
    fn mode_ties_pick_smallest_value() {
        let cells = vec![
            Some("b".to_string()),
            Some("a".to_string()),
            Some("b".to_string()),
            Some("a".to_string()),
            None,
        ];
        assert_eq!(mode(&cells), Some("a".to_string()));
    }

    #[test]
    fn median_of_even_count_is_midpoint() {
        assert_eq!(median(&[1.0, 3.0, 2.0, 10.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
