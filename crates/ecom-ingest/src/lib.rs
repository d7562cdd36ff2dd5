//! Source extraction: CSV files in, string-typed frames out.

pub mod csv_table;
pub mod data_utils;
pub mod error;
pub mod extract;

pub use csv_table::read_csv_table;
pub use error::{ExtractError, Result};
pub use extract::{extract_table, extract_tables};
