//! Inventory metrics: stock health, low-stock ranking, warehouse load.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::warn;

use ecom_ingest::data_utils::{any_to_i64, column_value_f64, column_value_string};
use ecom_model::{AggregationSettings, Result};

fn flag_count(df: &DataFrame, name: &str) -> Result<i64> {
    if df.column(name).is_err() {
        return Ok(0);
    }
    let flags = df.column(name)?.bool()?;
    Ok((0..df.height())
        .filter(|idx| flags.get(*idx).unwrap_or(false))
        .count() as i64)
}

/// Three fixed rows (total items, low stock, overstock) with counts and
/// percentages. Percentages are 0.0 on an empty frame.
pub fn stock_health_summary(inventory: &DataFrame) -> Result<DataFrame> {
    let total = inventory.height() as i64;
    let low = flag_count(inventory, "is_low_stock")?;
    let over = flag_count(inventory, "is_overstock")?;
    let pct = |count: i64| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        }
    };
    if total == 0 {
        warn!("inventory is empty, stock health percentages default to 0.0");
    }
    Ok(DataFrame::new(vec![
        Series::new(
            "metric".into(),
            vec!["total_items", "low_stock", "overstock"],
        )
        .into_column(),
        Series::new("value".into(), vec![total, low, over]).into_column(),
        Series::new("pct".into(), vec![pct(total), pct(low), pct(over)]).into_column(),
    ])?)
}

/// Low-stock rows ranked by how far below their minimum they sit, largest
/// gap first, product id ascending as tie-break, truncated to the
/// configured count.
pub fn low_stock_items(
    inventory: &DataFrame,
    settings: &AggregationSettings,
) -> Result<DataFrame> {
    struct LowStockRow {
        product_id: i64,
        product_name: Option<String>,
        warehouse_id: i64,
        location: Option<String>,
        quantity: f64,
        min_stock_level: f64,
        stock_gap: f64,
    }

    let mut rows: Vec<LowStockRow> = Vec::new();
    if inventory.column("is_low_stock").is_ok() {
        let flags = inventory.column("is_low_stock")?.bool()?;
        let product_ids = inventory.column("product_id")?;
        let warehouse_ids = inventory.column("warehouse_id")?;
        let has_names = inventory.column("product_name").is_ok();
        let has_locations = inventory.column("location").is_ok();
        for idx in 0..inventory.height() {
            if !flags.get(idx).unwrap_or(false) {
                continue;
            }
            let quantity = column_value_f64(inventory, "quantity", idx).unwrap_or(0.0);
            let min_level = column_value_f64(inventory, "min_stock_level", idx).unwrap_or(0.0);
            rows.push(LowStockRow {
                product_id: any_to_i64(product_ids.get(idx).unwrap_or(AnyValue::Null))
                    .unwrap_or(0),
                product_name: has_names
                    .then(|| column_value_string(inventory, "product_name", idx))
                    .filter(|name| !name.is_empty()),
                warehouse_id: any_to_i64(warehouse_ids.get(idx).unwrap_or(AnyValue::Null))
                    .unwrap_or(0),
                location: has_locations
                    .then(|| column_value_string(inventory, "location", idx))
                    .filter(|location| !location.is_empty()),
                quantity,
                min_stock_level: min_level,
                stock_gap: (min_level - quantity).max(0.0),
            });
        }
    }
    rows.sort_by(|a, b| {
        b.stock_gap
            .total_cmp(&a.stock_gap)
            .then(a.product_id.cmp(&b.product_id))
    });
    rows.truncate(settings.low_stock_items_n);

    Ok(DataFrame::new(vec![
        Series::new(
            "product_id".into(),
            rows.iter().map(|row| row.product_id).collect::<Vec<i64>>(),
        )
        .into_column(),
        Series::new(
            "product_name".into(),
            rows.iter()
                .map(|row| row.product_name.clone())
                .collect::<Vec<Option<String>>>(),
        )
        .into_column(),
        Series::new(
            "warehouse_id".into(),
            rows.iter().map(|row| row.warehouse_id).collect::<Vec<i64>>(),
        )
        .into_column(),
        Series::new(
            "location".into(),
            rows.iter()
                .map(|row| row.location.clone())
                .collect::<Vec<Option<String>>>(),
        )
        .into_column(),
        Series::new(
            "quantity".into(),
            rows.iter().map(|row| row.quantity).collect::<Vec<f64>>(),
        )
        .into_column(),
        Series::new(
            "min_stock_level".into(),
            rows.iter()
                .map(|row| row.min_stock_level)
                .collect::<Vec<f64>>(),
        )
        .into_column(),
        Series::new(
            "stock_gap".into(),
            rows.iter().map(|row| row.stock_gap).collect::<Vec<f64>>(),
        )
        .into_column(),
    ])?)
}

/// Stocked units per warehouse against its capacity. Utilization is null
/// when capacity is missing or zero; the zero case is logged.
pub fn warehouse_utilization(inventory: &DataFrame) -> Result<DataFrame> {
    struct WarehouseStats {
        location: Option<String>,
        units: f64,
        capacity: Option<f64>,
    }

    let warehouse_ids = inventory.column("warehouse_id")?;
    let has_locations = inventory.column("location").is_ok();
    let has_capacity = inventory.column("capacity_units").is_ok();
    let mut stats: BTreeMap<i64, WarehouseStats> = BTreeMap::new();
    for idx in 0..inventory.height() {
        let Some(warehouse_id) = any_to_i64(warehouse_ids.get(idx).unwrap_or(AnyValue::Null))
        else {
            continue;
        };
        let entry = stats.entry(warehouse_id).or_insert(WarehouseStats {
            location: None,
            units: 0.0,
            capacity: None,
        });
        entry.units += column_value_f64(inventory, "quantity", idx).unwrap_or(0.0);
        if entry.location.is_none() && has_locations {
            let location = column_value_string(inventory, "location", idx);
            if !location.is_empty() {
                entry.location = Some(location);
            }
        }
        if entry.capacity.is_none() && has_capacity {
            entry.capacity = column_value_f64(inventory, "capacity_units", idx);
        }
    }

    let ids: Vec<i64> = stats.keys().copied().collect();
    let locations: Vec<Option<String>> = stats
        .values()
        .map(|entry| entry.location.clone())
        .collect();
    let units: Vec<f64> = stats.values().map(|entry| entry.units).collect();
    let capacity: Vec<Option<f64>> = stats.values().map(|entry| entry.capacity).collect();
    let utilization: Vec<Option<f64>> = stats
        .iter()
        .map(|(warehouse_id, entry)| match entry.capacity {
            Some(capacity) if capacity > 0.0 => Some(entry.units / capacity),
            Some(_) => {
                warn!(warehouse_id, "warehouse capacity is zero, utilization unknown");
                None
            }
            None => None,
        })
        .collect();
    Ok(DataFrame::new(vec![
        Series::new("warehouse_id".into(), ids).into_column(),
        Series::new("location".into(), locations).into_column(),
        Series::new("total_units".into(), units).into_column(),
        Series::new("capacity_units".into(), capacity).into_column(),
        Series::new("utilization".into(), utilization).into_column(),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{f64_at, frame, i64_at, str_at};
    use super::*;

    fn inventory() -> DataFrame {
        let mut df = frame(vec![
            ("inventory_id", vec![Some("1"), Some("2"), Some("3")]),
            ("product_id", vec![Some("7"), Some("8"), Some("9")]),
            ("warehouse_id", vec![Some("1"), Some("1"), Some("2")]),
            ("quantity", vec![Some("2"), Some("5"), Some("200")]),
            ("min_stock_level", vec![Some("10"), Some("8"), Some("10")]),
            ("max_stock_level", vec![Some("100"), Some("100"), Some("150")]),
            ("location", vec![Some("Lisbon"), Some("Lisbon"), Some("Porto")]),
            ("capacity_units", vec![Some("1000"), Some("1000"), Some("0")]),
        ]);
        df.with_column(
            Series::new("is_low_stock".into(), vec![true, true, false]).into_column(),
        )
        .expect("low flag");
        df.with_column(
            Series::new("is_overstock".into(), vec![false, false, true]).into_column(),
        )
        .expect("over flag");
        df
    }

    #[test]
    fn health_summary_has_three_fixed_rows() {
        let result = stock_health_summary(&inventory()).expect("summary");
        assert_eq!(result.height(), 3);
        assert_eq!(str_at(&result, "metric", 1), "low_stock");
        assert_eq!(i64_at(&result, "value", 1), 2);
        assert!((f64_at(&result, "pct", 1) - 66.666).abs() < 0.001);
    }

    #[test]
    fn health_summary_on_empty_is_all_zero() {
        let empty = frame(vec![("inventory_id", vec![]), ("quantity", vec![])]);
        let result = stock_health_summary(&empty).expect("summary");
        assert_eq!(result.height(), 3);
        assert_eq!(i64_at(&result, "value", 0), 0);
        assert_eq!(f64_at(&result, "pct", 0), 0.0);
    }

    #[test]
    fn low_stock_ranked_by_gap() {
        let result =
            low_stock_items(&inventory(), &AggregationSettings::default()).expect("low stock");
        assert_eq!(result.height(), 2);
        // Gap 8 beats gap 3.
        assert_eq!(i64_at(&result, "product_id", 0), 7);
        assert_eq!(f64_at(&result, "stock_gap", 0), 8.0);
    }

    #[test]
    fn zero_capacity_utilization_is_null() {
        let result = warehouse_utilization(&inventory()).expect("utilization");
        assert_eq!(result.height(), 2);
        assert_eq!(f64_at(&result, "total_units", 0), 7.0);
        let utilization = result
            .column("utilization")
            .expect("utilization")
            .f64()
            .expect("float");
        assert_eq!(utilization.get(0), Some(0.007));
        assert_eq!(utilization.get(1), None);
    }
}
