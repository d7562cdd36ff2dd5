//! Sales metrics: monthly revenue and promotion usage.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::warn;

use ecom_ingest::data_utils::{column_value_f64, column_value_string};
use ecom_model::Result;

/// Revenue and order counts per `order_month`, months ascending. Rows
/// without a derivable month are skipped.
pub fn monthly_sales(orders: &DataFrame) -> Result<DataFrame> {
    let mut buckets: BTreeMap<String, (f64, i64)> = BTreeMap::new();
    for idx in 0..orders.height() {
        let month = column_value_string(orders, "order_month", idx);
        if month.is_empty() {
            continue;
        }
        let entry = buckets.entry(month).or_insert((0.0, 0));
        entry.0 += column_value_f64(orders, "total_amount", idx).unwrap_or(0.0);
        entry.1 += 1;
    }
    let months: Vec<String> = buckets.keys().cloned().collect();
    let revenue: Vec<f64> = buckets.values().map(|(revenue, _)| *revenue).collect();
    let counts: Vec<i64> = buckets.values().map(|(_, orders)| *orders).collect();
    Ok(DataFrame::new(vec![
        Series::new("order_month".into(), months).into_column(),
        Series::new("total_revenue".into(), revenue).into_column(),
        Series::new("orders".into(), counts).into_column(),
    ])?)
}

/// Share of orders that used a promotion, as a one-row frame. Empty input
/// reports 0.0 with a warning instead of dividing by zero.
pub fn promotion_usage_rate(orders: &DataFrame) -> Result<DataFrame> {
    let total = orders.height();
    let used = if orders.column("used_promotion").is_ok() {
        let flags = orders.column("used_promotion")?.bool()?;
        (0..total)
            .filter(|idx| flags.get(*idx).unwrap_or(false))
            .count()
    } else {
        0
    };
    let rate = if total == 0 {
        warn!("no orders for promotion usage, reporting 0.0");
        0.0
    } else {
        used as f64 / total as f64
    };
    Ok(DataFrame::new(vec![
        Series::new("orders_with_promotion".into(), vec![used as i64]).into_column(),
        Series::new("total_orders".into(), vec![total as i64]).into_column(),
        Series::new("usage_rate".into(), vec![rate]).into_column(),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{f64_at, frame, i64_at, str_at};
    use super::*;

    #[test]
    fn monthly_buckets_are_sorted_and_summed() {
        let orders = frame(vec![
            ("order_month", vec![Some("2026-02"), Some("2026-01"), Some("2026-02")]),
            ("total_amount", vec![Some("20"), Some("10"), Some("30")]),
        ]);
        let result = monthly_sales(&orders).expect("monthly");
        assert_eq!(result.height(), 2);
        assert_eq!(str_at(&result, "order_month", 0), "2026-01");
        assert_eq!(f64_at(&result, "total_revenue", 1), 50.0);
        assert_eq!(i64_at(&result, "orders", 1), 2);
    }

    #[test]
    fn usage_rate_on_empty_frame_is_zero() {
        let orders = frame(vec![("order_month", vec![]), ("total_amount", vec![])]);
        let result = promotion_usage_rate(&orders).expect("rate");
        assert_eq!(result.height(), 1);
        assert_eq!(f64_at(&result, "usage_rate", 0), 0.0);
        assert_eq!(i64_at(&result, "total_orders", 0), 0);
    }

    #[test]
    fn usage_rate_counts_flagged_orders() {
        let mut orders = frame(vec![(
            "total_amount",
            vec![Some("10"), Some("20"), Some("30"), Some("40")],
        )]);
        orders
            .with_column(
                Series::new(
                    "used_promotion".into(),
                    vec![true, false, true, false],
                )
                .into_column(),
            )
            .expect("flag column");
        let result = promotion_usage_rate(&orders).expect("rate");
        assert_eq!(f64_at(&result, "usage_rate", 0), 0.5);
    }
}
