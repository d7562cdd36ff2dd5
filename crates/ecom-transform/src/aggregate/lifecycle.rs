//! Order lifecycle metrics: status funnel, terminal rates, open backlog.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::warn;

use ecom_ingest::data_utils::{column_value_f64, column_value_string};
use ecom_model::Result;

const IN_PROGRESS: [&str; 3] = ["pending", "processing", "shipped"];

fn status_at(orders: &DataFrame, idx: usize) -> String {
    column_value_string(orders, "status", idx).to_lowercase()
}

/// Order count and share per status, most orders first, status ascending
/// as tie-break. Statuses are lowercased so casing drift in the source
/// does not split buckets.
pub fn status_funnel(orders: &DataFrame) -> Result<DataFrame> {
    let total = orders.height();
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for idx in 0..total {
        let status = status_at(orders, idx);
        if status.is_empty() {
            continue;
        }
        *counts.entry(status).or_default() += 1;
    }
    let mut rows: Vec<(String, i64)> = counts.into_iter().collect();
    rows.sort_by(|(status_a, count_a), (status_b, count_b)| {
        count_b.cmp(count_a).then(status_a.cmp(status_b))
    });
    let statuses: Vec<String> = rows.iter().map(|(status, _)| status.clone()).collect();
    let order_counts: Vec<i64> = rows.iter().map(|(_, count)| *count).collect();
    let shares: Vec<f64> = rows
        .iter()
        .map(|(_, count)| *count as f64 / total as f64)
        .collect();
    Ok(DataFrame::new(vec![
        Series::new("status".into(), statuses).into_column(),
        Series::new("orders".into(), order_counts).into_column(),
        Series::new("share".into(), shares).into_column(),
    ])?)
}

fn terminal_rate(orders: &DataFrame, status: &str, count_name: &str) -> Result<DataFrame> {
    let total = orders.height();
    let matched = (0..total)
        .filter(|idx| status_at(orders, *idx) == status)
        .count();
    let rate = if total == 0 {
        warn!(status, "no orders for terminal rate, reporting 0.0");
        0.0
    } else {
        matched as f64 / total as f64
    };
    Ok(DataFrame::new(vec![
        Series::new(count_name.into(), vec![matched as i64]).into_column(),
        Series::new("total_orders".into(), vec![total as i64]).into_column(),
        Series::new("rate".into(), vec![rate]).into_column(),
    ])?)
}

/// Share of cancelled orders, one row, 0.0 on empty input.
pub fn cancellation_rate(orders: &DataFrame) -> Result<DataFrame> {
    terminal_rate(orders, "cancelled", "cancelled_orders")
}

/// Share of delivered orders, one row, 0.0 on empty input.
pub fn delivery_rate(orders: &DataFrame) -> Result<DataFrame> {
    terminal_rate(orders, "delivered", "delivered_orders")
}

/// Orders still moving (pending, processing, shipped) per month, with the
/// order value tied up in them.
pub fn in_progress_backlog(orders: &DataFrame) -> Result<DataFrame> {
    let mut buckets: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for idx in 0..orders.height() {
        let status = status_at(orders, idx);
        if !IN_PROGRESS.contains(&status.as_str()) {
            continue;
        }
        let month = column_value_string(orders, "order_month", idx);
        if month.is_empty() {
            continue;
        }
        let entry = buckets.entry(month).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += column_value_f64(orders, "total_amount", idx).unwrap_or(0.0);
    }
    let months: Vec<String> = buckets.keys().cloned().collect();
    let counts: Vec<i64> = buckets.values().map(|(count, _)| *count).collect();
    let values: Vec<f64> = buckets.values().map(|(_, value)| *value).collect();
    Ok(DataFrame::new(vec![
        Series::new("order_month".into(), months).into_column(),
        Series::new("backlog_orders".into(), counts).into_column(),
        Series::new("backlog_value".into(), values).into_column(),
    ])?)
}
