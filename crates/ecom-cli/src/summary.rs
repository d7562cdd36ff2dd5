//! Terminal run summary tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ecom_model::RunContext;

use crate::pipeline::RunReport;

/// Stage metric counters, printed even when the run failed.
pub fn print_run_summary(ctx: &RunContext) {
    println!("Run: {}", ctx.run_id());
    println!("Elapsed: {:.2}s", ctx.elapsed().as_secs_f64());
    if ctx.stage_metrics().is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Metric"),
        header_cell("Value"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (stage, metrics) in ctx.stage_metrics() {
        for (key, value) in metrics {
            table.add_row(vec![
                Cell::new(stage).fg(Color::Blue),
                Cell::new(key),
                Cell::new(value),
            ]);
        }
    }
    println!("{table}");
}

/// Written datasets with row counts and per-format paths.
pub fn print_datasets(report: &RunReport) {
    if report.datasets.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Dataset"),
        header_cell("Kind"),
        header_cell("Rows"),
        header_cell("CSV"),
        header_cell("Parquet"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Center);
    for dataset in &report.datasets {
        table.add_row(vec![
            Cell::new(&dataset.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(dataset.kind),
            Cell::new(dataset.rows),
            output_cell(dataset.csv.is_some()),
            output_cell(dataset.parquet.is_some()),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn output_cell(written: bool) -> Cell {
    if written {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("-").fg(Color::DarkGrey)
    }
}
