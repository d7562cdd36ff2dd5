//! Extraction of the configured source tables from a raw data directory.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::DataFrame;
use tracing::info;

use ecom_model::Settings;

use crate::csv_table::read_csv_table;
use crate::error::{ExtractError, Result};

/// Read one configured table from `raw_dir`.
///
/// The file name is `<stem>.csv` where the stem comes from the settings
/// mapping. A missing mapping or a missing file is fatal.
pub fn extract_table(raw_dir: &Path, settings: &Settings, table: &str) -> Result<DataFrame> {
    let stem = settings
        .source_stem(table)
        .ok_or_else(|| ExtractError::UnconfiguredTable {
            table: table.to_string(),
        })?;
    let path = raw_dir.join(format!("{stem}.csv"));
    if !path.is_file() {
        return Err(ExtractError::SourceMissing {
            path: path.display().to_string(),
        });
    }
    let df = read_csv_table(&path)?;
    info!(
        table,
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "extracted source table"
    );
    Ok(df)
}

/// Read every table named in `tables`, keyed by logical name.
pub fn extract_tables(
    raw_dir: &Path,
    settings: &Settings,
    tables: &[&str],
) -> Result<BTreeMap<String, DataFrame>> {
    let mut frames = BTreeMap::new();
    for table in tables {
        let df = extract_table(raw_dir, settings, table)?;
        frames.insert(table.to_string(), df);
    }
    Ok(frames)
}
