//! Cell value helpers shared across the workspace.
//!
//! Frames carry a mix of string, numeric, and boolean columns depending on
//! the stage; these helpers give every consumer one way to read a cell.

use polars::prelude::{AnyValue, DataFrame};

pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::String(value) => value.to_string(),
        AnyValue::StringOwned(value) => value.to_string(),
        AnyValue::Null => String::new(),
        AnyValue::Float64(value) => format_numeric(value),
        AnyValue::Float32(value) => format_numeric(value as f64),
        AnyValue::Boolean(value) => {
            if value {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        value => value.to_string(),
    }
}

/// Render floats without a trailing `.0` so ids survive round-trips.
pub fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Float32(value) => Some(value as f64),
        AnyValue::Float64(value) => Some(value),
        AnyValue::Int8(value) => Some(value as f64),
        AnyValue::Int16(value) => Some(value as f64),
        AnyValue::Int32(value) => Some(value as f64),
        AnyValue::Int64(value) => Some(value as f64),
        AnyValue::UInt8(value) => Some(value as f64),
        AnyValue::UInt16(value) => Some(value as f64),
        AnyValue::UInt32(value) => Some(value as f64),
        AnyValue::UInt64(value) => Some(value as f64),
        AnyValue::Boolean(value) => Some(if value { 1.0 } else { 0.0 }),
        AnyValue::String(value) => parse_f64(value),
        AnyValue::StringOwned(value) => parse_f64(&value),
        _ => None,
    }
}

pub fn any_to_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(value) => Some(value as i64),
        AnyValue::Int16(value) => Some(value as i64),
        AnyValue::Int32(value) => Some(value as i64),
        AnyValue::Int64(value) => Some(value),
        AnyValue::UInt8(value) => Some(value as i64),
        AnyValue::UInt16(value) => Some(value as i64),
        AnyValue::UInt32(value) => Some(value as i64),
        AnyValue::UInt64(value) => Some(value as i64),
        AnyValue::String(value) => parse_i64(value),
        AnyValue::StringOwned(value) => parse_i64(&value),
        _ => None,
    }
}

/// A cell counts as missing when it is null, an empty/whitespace string,
/// or a non-finite float.
pub fn is_missing_value(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::String(value) => value.trim().is_empty(),
        AnyValue::StringOwned(value) => value.trim().is_empty(),
        AnyValue::Float64(value) => value.is_nan(),
        AnyValue::Float32(value) => value.is_nan(),
        _ => false,
    }
}

pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

pub fn parse_i64(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// String rendering of one cell, empty for anything missing.
pub fn column_value_string(df: &DataFrame, name: &str, idx: usize) -> String {
    match df.column(name) {
        Ok(series) => any_to_string(series.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => String::new(),
    }
}

/// Numeric reading of one cell, `None` for anything missing or non-numeric.
pub fn column_value_f64(df: &DataFrame, name: &str, idx: usize) -> Option<f64> {
    match df.column(name) {
        Ok(series) => any_to_f64(series.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => None,
    }
}
