//! Command handlers mapping CLI invocations to exit codes.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, ContentArrangement, Table};

use ecom_model::RunContext;

use crate::cli::{RunArgs, TablesArgs};
use crate::pipeline::{SOURCE_TABLES, load_settings, run_pipeline};
use crate::summary::{print_datasets, print_run_summary};

pub fn run(args: &RunArgs) -> i32 {
    let settings = match load_settings(args.settings.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("error: {error:#}");
            return 1;
        }
    };
    let mut ctx = RunContext::start();
    let outcome = run_pipeline(args, &settings, &mut ctx);
    // Stage counters are worth showing even when the run aborted.
    print_run_summary(&ctx);
    match outcome {
        Ok(report) => {
            print_datasets(&report);
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

pub fn run_tables(args: &TablesArgs) -> i32 {
    let settings = match load_settings(args.settings.as_deref()) {
        Ok(settings) => settings,
        Err(error) => {
            eprintln!("error: {error:#}");
            return 1;
        }
    };
    let mut table = Table::new();
    table.set_header(vec![Cell::new("Table"), Cell::new("Source file")]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    for name in SOURCE_TABLES {
        let stem = settings.source_stem(name).unwrap_or("<unconfigured>");
        table.add_row(vec![Cell::new(name), Cell::new(format!("{stem}.csv"))]);
    }
    println!("{table}");
    0
}
