//! Product ranking over validated order items.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, IntoColumn, NamedFrom, Series};

use ecom_ingest::data_utils::{any_to_i64, column_value_f64, column_value_string};
use ecom_model::{AggregationSettings, Result};

use crate::validator::SchemaValidator;

const ORDER_ITEM_REQUIRED: [&str; 4] = ["order_id", "product_id", "quantity", "subtotal"];

#[derive(Debug, Default, Clone)]
struct ProductStats {
    units: f64,
    revenue: f64,
}

/// Best-selling products by units sold, with revenue carried alongside.
/// Units descending, then revenue descending, then product id ascending;
/// truncated to the configured count. Product names come from the catalog
/// when the frame carries them.
pub fn top_products(
    order_items: &DataFrame,
    products: &DataFrame,
    settings: &AggregationSettings,
) -> Result<DataFrame> {
    SchemaValidator::new("order_items", order_items)
        .validate_required_columns(&ORDER_ITEM_REQUIRED)?;

    let product_ids = order_items.column("product_id")?;
    let mut stats: BTreeMap<i64, ProductStats> = BTreeMap::new();
    for idx in 0..order_items.height() {
        let Some(product_id) = any_to_i64(product_ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let entry = stats.entry(product_id).or_default();
        entry.units += column_value_f64(order_items, "quantity", idx).unwrap_or(0.0);
        entry.revenue += column_value_f64(order_items, "subtotal", idx).unwrap_or(0.0);
    }

    let mut names: BTreeMap<i64, String> = BTreeMap::new();
    if products.column("product_id").is_ok() && products.column("product_name").is_ok() {
        let catalog_ids = products.column("product_id")?;
        for idx in 0..products.height() {
            let Some(product_id) = any_to_i64(catalog_ids.get(idx).unwrap_or(AnyValue::Null))
            else {
                continue;
            };
            let name = column_value_string(products, "product_name", idx);
            if !name.is_empty() {
                names.entry(product_id).or_insert(name);
            }
        }
    }

    let mut rows: Vec<(i64, ProductStats)> = stats.into_iter().collect();
    rows.sort_by(|(id_a, stats_a), (id_b, stats_b)| {
        stats_b
            .units
            .total_cmp(&stats_a.units)
            .then(stats_b.revenue.total_cmp(&stats_a.revenue))
            .then(id_a.cmp(id_b))
    });
    rows.truncate(settings.top_products_n);

    let ids: Vec<i64> = rows.iter().map(|(id, _)| *id).collect();
    let product_names: Vec<Option<String>> =
        rows.iter().map(|(id, _)| names.get(id).cloned()).collect();
    let units: Vec<f64> = rows.iter().map(|(_, stats)| stats.units).collect();
    let revenue: Vec<f64> = rows.iter().map(|(_, stats)| stats.revenue).collect();
    Ok(DataFrame::new(vec![
        Series::new("product_id".into(), ids).into_column(),
        Series::new("product_name".into(), product_names).into_column(),
        Series::new("total_units".into(), units).into_column(),
        Series::new("total_revenue".into(), revenue).into_column(),
    ])?)
}
