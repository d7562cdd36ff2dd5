//! Artifact loading: enriched tables and metrics out as CSV and Parquet.

pub mod error;
pub mod loader;

pub use error::{LoadError, Result};
pub use loader::{CsvLoader, Loader, ParquetLoader};
