//! Pipeline driver: extract, transform, load, in that order, fail-fast.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::info;

use ecom_ingest::extract_tables;
use ecom_load::{CsvLoader, Loader, ParquetLoader};
use ecom_model::{RunContext, Settings};
use ecom_transform::{TableSet, TransformOrchestrator};

use crate::cli::{OutputFormatArg, RunArgs};

/// Logical tables every run extracts.
pub const SOURCE_TABLES: [&str; 8] = [
    "customers",
    "inventory",
    "order_items",
    "orders",
    "products",
    "promotions",
    "reviews",
    "warehouses",
];

/// One written (or skipped) output dataset, for the run summary.
#[derive(Debug)]
pub struct DatasetReport {
    pub name: String,
    pub kind: &'static str,
    pub rows: usize,
    pub csv: Option<PathBuf>,
    pub parquet: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunReport {
    pub datasets: Vec<DatasetReport>,
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("load settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

pub fn run_pipeline(
    args: &RunArgs,
    settings: &Settings,
    ctx: &mut RunContext,
) -> Result<RunReport> {
    info!(
        run_id = ctx.run_id(),
        data_folder = %args.data_folder.display(),
        "starting pipeline run"
    );

    let mut frames = extract_tables(&args.data_folder, settings, &SOURCE_TABLES)
        .context("extract source tables")?;
    // extract_tables errors on any missing source, so every name is present.
    let mut take = |table: &str| frames.remove(table).unwrap_or_else(DataFrame::empty);
    let tables = TableSet {
        orders: take("orders"),
        customers: take("customers"),
        promotions: take("promotions"),
        order_items: take("order_items"),
        products: take("products"),
        reviews: take("reviews"),
        inventory: take("inventory"),
        warehouses: take("warehouses"),
    };
    ctx.record_metric("extracting", "orders_rows", tables.orders.height() as i64);
    ctx.record_metric("extracting", "tables", SOURCE_TABLES.len() as i64);

    let mut orchestrator = TransformOrchestrator::new();
    let result = orchestrator
        .run(&tables, settings, ctx)
        .context("transform stage")?;

    let processed_dir = args
        .processed_dir
        .clone()
        .unwrap_or_else(|| args.data_folder.join("processed"));
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| args.data_folder.join("output"));

    let mut datasets = Vec::new();
    let mut written = 0usize;
    for (dir, kind, frames) in [
        (&processed_dir, "enriched", result.enriched),
        (&output_dir, "metric", result.metrics),
    ] {
        let writers = build_writers(args, settings, dir)?;
        for (name, mut df) in frames {
            let rows = df.height();
            let mut report = DatasetReport {
                name: name.clone(),
                kind,
                rows,
                csv: None,
                parquet: None,
            };
            if let Some(loader) = &writers.csv {
                report.csv = Some(
                    loader
                        .save(&mut df, &name)
                        .with_context(|| format!("write {name}.csv"))?,
                );
                written += 1;
            }
            if let Some(loader) = &writers.parquet {
                report.parquet = Some(
                    loader
                        .save(&mut df, &name)
                        .with_context(|| format!("write {name}.parquet"))?,
                );
                written += 1;
            }
            datasets.push(report);
        }
    }
    ctx.record_metric("loading", "files_written", written as i64);
    if args.dry_run {
        info!("dry run, no output files written");
    }

    Ok(RunReport { datasets })
}

struct Writers {
    csv: Option<CsvLoader>,
    parquet: Option<ParquetLoader>,
}

fn build_writers(args: &RunArgs, settings: &Settings, dir: &Path) -> Result<Writers> {
    if args.dry_run {
        return Ok(Writers {
            csv: None,
            parquet: None,
        });
    }
    let csv_enabled =
        settings.output.csv && matches!(args.format, OutputFormatArg::Csv | OutputFormatArg::Both);
    let parquet_enabled = settings.output.parquet
        && matches!(args.format, OutputFormatArg::Parquet | OutputFormatArg::Both);
    Ok(Writers {
        csv: if csv_enabled {
            Some(CsvLoader::new(dir).with_context(|| format!("prepare {}", dir.display()))?)
        } else {
            None
        },
        parquet: if parquet_enabled {
            Some(ParquetLoader::new(dir).with_context(|| format!("prepare {}", dir.display()))?)
        } else {
            None
        },
    })
}
