//! CSV reading into string-typed frames.
//!
//! Every column comes in as UTF-8; the cleaning stage owns type coercion.
//! Cells are trimmed and BOM-stripped on the way in, and empty cells become
//! nulls so missing-value accounting works the same for every source.

use std::path::Path;

use csv::ReaderBuilder;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use crate::error::{ExtractError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Read one CSV file into a frame of string columns.
///
/// The first row is the header. Fully empty rows are skipped; short rows
/// are padded with nulls so every column ends up the same length.
pub fn read_csv_table(path: &Path) -> Result<DataFrame> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| ExtractError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

    let mut headers: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| ExtractError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        if headers.is_empty() {
            headers = record.iter().map(normalize_header).collect();
            columns = vec![Vec::new(); headers.len()];
            continue;
        }
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(record.get(idx).and_then(normalize_cell));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(columns)
        .map(|(header, values)| Series::new(header.as_str().into(), values).into_column())
        .collect();
    DataFrame::new(columns).map_err(|source| ExtractError::Unparsable {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp csv");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    #[test]
    fn reads_headers_and_rows_as_strings() {
        let file = write_csv("order_id,total_amount\nO-1,10.50\nO-2,20.00\n");
        let df = read_csv_table(file.path()).expect("read");
        assert_eq!(df.height(), 2);
        let names = df.get_column_names_owned();
        assert_eq!(names[0].as_str(), "order_id");
        assert_eq!(names[1].as_str(), "total_amount");
    }

    #[test]
    fn empty_cells_become_nulls() {
        let file = write_csv("order_id,notes\nO-1,\nO-2,gift wrap\n");
        let df = read_csv_table(file.path()).expect("read");
        let notes = df.column("notes").expect("notes");
        assert_eq!(notes.null_count(), 1);
    }

    #[test]
    fn strips_bom_and_whitespace_from_headers() {
        let file = write_csv("\u{feff}order_id ,  customer_id\nO-1,C-1\n");
        let df = read_csv_table(file.path()).expect("read");
        let names = df.get_column_names_owned();
        assert_eq!(names[0].as_str(), "order_id");
        assert_eq!(names[1].as_str(), "customer_id");
    }

    #[test]
    fn short_rows_are_padded_and_blank_rows_skipped() {
        let file = write_csv("a,b,c\n1,2\n,,\n4,5,6\n");
        let df = read_csv_table(file.path()).expect("read");
        assert_eq!(df.height(), 2);
        let c = df.column("c").expect("c");
        assert_eq!(c.null_count(), 1);
    }

    #[test]
    fn missing_file_is_an_unreadable_error() {
        let err = read_csv_table(Path::new("/nonexistent/file.csv")).unwrap_err();
        assert!(matches!(err, ExtractError::Unreadable { .. }));
    }
}
