//! Customer metrics: top spenders, recurring customers, overall ticket.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::warn;

use ecom_ingest::data_utils::{any_to_i64, column_value_f64, column_value_string};
use ecom_model::{AggregationSettings, Result};

use super::percentile;

#[derive(Debug, Default, Clone)]
struct CustomerStats {
    orders: i64,
    spent: f64,
    last_order_date: String,
    email: Option<String>,
}

fn accumulate(orders: &DataFrame) -> Result<BTreeMap<i64, CustomerStats>> {
    let customer_ids = orders.column("customer_id")?;
    let has_email = orders.column("email").is_ok();
    let mut stats: BTreeMap<i64, CustomerStats> = BTreeMap::new();
    for idx in 0..orders.height() {
        let Some(customer_id) = any_to_i64(customer_ids.get(idx).unwrap_or(AnyValue::Null))
        else {
            continue;
        };
        let entry = stats.entry(customer_id).or_default();
        entry.orders += 1;
        entry.spent += column_value_f64(orders, "total_amount", idx).unwrap_or(0.0);
        let date = column_value_string(orders, "order_date", idx);
        if date > entry.last_order_date {
            entry.last_order_date = date;
        }
        if has_email && entry.email.is_none() {
            let email = column_value_string(orders, "email", idx);
            if !email.is_empty() {
                entry.email = Some(email);
            }
        }
    }
    Ok(stats)
}

/// Highest-spending customers. Optional percentile floor on total spend,
/// then total spent descending with customer id ascending as tie-break,
/// truncated to the configured count.
pub fn top_spenders(orders: &DataFrame, settings: &AggregationSettings) -> Result<DataFrame> {
    let stats = accumulate(orders)?;
    let mut rows: Vec<(i64, CustomerStats)> = stats.into_iter().collect();

    if let Some(p) = settings.top_spenders_percentile {
        let spends: Vec<f64> = rows.iter().map(|(_, stats)| stats.spent).collect();
        if let Some(floor) = percentile(&spends, p) {
            rows.retain(|(_, stats)| stats.spent >= floor);
        }
    }
    rows.sort_by(|(id_a, stats_a), (id_b, stats_b)| {
        stats_b
            .spent
            .total_cmp(&stats_a.spent)
            .then(id_a.cmp(id_b))
    });
    rows.truncate(settings.top_spenders_n);

    build_customer_frame(&rows, true)
}

/// Customers at or above the configured order count, most orders first,
/// customer id ascending as tie-break. The contact email rides along for
/// follow-up campaigns.
pub fn recurring_customers(
    orders: &DataFrame,
    settings: &AggregationSettings,
) -> Result<DataFrame> {
    let stats = accumulate(orders)?;
    let mut rows: Vec<(i64, CustomerStats)> = stats
        .into_iter()
        .filter(|(_, stats)| stats.orders >= settings.recurring_min_orders as i64)
        .collect();
    rows.sort_by(|(id_a, stats_a), (id_b, stats_b)| {
        stats_b.orders.cmp(&stats_a.orders).then(id_a.cmp(id_b))
    });
    build_customer_frame(&rows, false)
}

fn build_customer_frame(rows: &[(i64, CustomerStats)], with_details: bool) -> Result<DataFrame> {
    let ids: Vec<i64> = rows.iter().map(|(id, _)| *id).collect();
    let orders: Vec<i64> = rows.iter().map(|(_, stats)| stats.orders).collect();
    let spent: Vec<f64> = rows.iter().map(|(_, stats)| stats.spent).collect();
    let mut columns = vec![
        Series::new("customer_id".into(), ids).into_column(),
        Series::new("total_orders".into(), orders).into_column(),
        Series::new("total_spent".into(), spent).into_column(),
    ];
    if with_details {
        let tickets: Vec<f64> = rows
            .iter()
            .map(|(_, stats)| {
                if stats.orders > 0 {
                    stats.spent / stats.orders as f64
                } else {
                    0.0
                }
            })
            .collect();
        let dates: Vec<String> = rows
            .iter()
            .map(|(_, stats)| stats.last_order_date.clone())
            .collect();
        columns.push(Series::new("avg_ticket".into(), tickets).into_column());
        columns.push(Series::new("last_order_date".into(), dates).into_column());
    }
    let emails: Vec<Option<String>> =
        rows.iter().map(|(_, stats)| stats.email.clone()).collect();
    columns.push(Series::new("email".into(), emails).into_column());
    Ok(DataFrame::new(columns)?)
}

/// Mean order total across all orders, as a one-row frame. An empty orders
/// frame yields 0.0 and a warning rather than a division error.
pub fn average_ticket(orders: &DataFrame) -> Result<DataFrame> {
    let rows = orders.height();
    let ticket = if rows == 0 {
        warn!("no orders to average, reporting 0.0 ticket");
        0.0
    } else {
        let total: f64 = (0..rows)
            .map(|idx| column_value_f64(orders, "total_amount", idx).unwrap_or(0.0))
            .sum();
        total / rows as f64
    };
    Ok(DataFrame::new(vec![
        Series::new("average_ticket".into(), vec![ticket]).into_column(),
        Series::new("order_count".into(), vec![rows as i64]).into_column(),
    ])?)
}
