//! Dataset writers. One loader per format, both writing `<dir>/<name>.<ext>`
//! with the destination directory created up front.

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, ParquetWriter, SerWriter};
use tracing::info;

use crate::error::{LoadError, Result};

pub trait Loader {
    /// Write one dataset under the loader's directory, returning the path.
    fn save(&self, df: &mut DataFrame, name: &str) -> Result<PathBuf>;
}

fn prepare_dir(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|source| LoadError::MissingDestination {
        path: dir.display().to_string(),
        source,
    })?;
    Ok(dir.to_path_buf())
}

fn target_path(dir: &Path, name: &str, extension: &str) -> Result<PathBuf> {
    if name.trim().is_empty() {
        return Err(LoadError::UnspecifiedName);
    }
    Ok(dir.join(format!("{name}.{extension}")))
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| LoadError::MissingDestination {
        path: path.display().to_string(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct CsvLoader {
    dir: PathBuf,
}

impl CsvLoader {
    pub fn new(dir: &Path) -> Result<Self> {
        Ok(Self {
            dir: prepare_dir(dir)?,
        })
    }
}

impl Loader for CsvLoader {
    fn save(&self, df: &mut DataFrame, name: &str) -> Result<PathBuf> {
        let path = target_path(&self.dir, name, "csv")?;
        let file = create_file(&path)?;
        CsvWriter::new(file)
            .include_header(true)
            .finish(df)
            .map_err(|source| LoadError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;
        info!(dataset = name, path = %path.display(), rows = df.height(), "csv written");
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct ParquetLoader {
    dir: PathBuf,
}

impl ParquetLoader {
    pub fn new(dir: &Path) -> Result<Self> {
        Ok(Self {
            dir: prepare_dir(dir)?,
        })
    }
}

impl Loader for ParquetLoader {
    fn save(&self, df: &mut DataFrame, name: &str) -> Result<PathBuf> {
        let path = target_path(&self.dir, name, "parquet")?;
        let file = create_file(&path)?;
        ParquetWriter::new(file)
            .finish(df)
            .map_err(|source| LoadError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;
        info!(dataset = name, path = %path.display(), rows = df.height(), "parquet written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    use super::*;

    fn sample() -> DataFrame {
        DataFrame::new(vec![
            Series::new("order_id".into(), vec![1i64, 2]).into_column(),
            Series::new("total_amount".into(), vec![10.0f64, 20.0]).into_column(),
        ])
        .expect("sample frame")
    }

    #[test]
    fn csv_loader_writes_into_created_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("out").join("csv");
        let loader = CsvLoader::new(&nested).expect("loader");
        let path = loader.save(&mut sample(), "orders").expect("save");
        assert!(path.ends_with("orders.csv"));
        let contents = std::fs::read_to_string(&path).expect("read back");
        assert!(contents.starts_with("order_id,total_amount"));
    }

    #[test]
    fn parquet_loader_writes_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = ParquetLoader::new(dir.path()).expect("loader");
        let path = loader.save(&mut sample(), "orders").expect("save");
        assert!(path.is_file());
    }

    #[test]
    fn empty_name_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = CsvLoader::new(dir.path()).expect("loader");
        let err = loader.save(&mut sample(), "  ").unwrap_err();
        assert!(matches!(err, LoadError::UnspecifiedName));
    }
}
