//! Orders enrichment: customer and promotion context, item rollups, and
//! row-level convenience flags for the aggregation stage.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::info;

use ecom_ingest::data_utils::{column_value_f64, column_value_string};
use ecom_model::{EnrichmentSettings, Result};

use crate::validator::SchemaValidator;

use super::{build_lookup, gather_f64, gather_string, match_indices, month_of, validate_dimension};

const CUSTOMER_REQUIRED: [&str; 3] = ["customer_id", "segment", "registration_date"];
const CUSTOMER_OPTIONAL: [&str; 3] = ["city", "country", "email"];
const PROMOTION_REQUIRED: [&str; 4] = [
    "promotion_id",
    "promotion_type",
    "discount_value",
    "is_active",
];
const ORDER_ITEM_REQUIRED: [&str; 5] = ["order_id", "product_id", "quantity", "unit_price", "subtotal"];

pub fn enrich_orders(
    orders: &DataFrame,
    customers: &DataFrame,
    promotions: &DataFrame,
    order_items: &DataFrame,
    settings: &EnrichmentSettings,
) -> Result<DataFrame> {
    let mut df = orders.clone();
    let rows = df.height();

    validate_dimension(
        customers,
        "customers",
        &CUSTOMER_REQUIRED,
        &["customer_id"],
        "customer_id",
    )?;
    let lookup = build_lookup(customers, "customer_id")?;
    let indices = match_indices(&df, "customer_id", &lookup)?;
    for name in ["segment", "registration_date"] {
        let values = gather_string(customers, name, &indices)?;
        df.with_column(Series::new(name.into(), values).into_column())?;
    }
    for name in CUSTOMER_OPTIONAL {
        if customers.column(name).is_err() {
            continue;
        }
        let values = gather_string(customers, name, &indices)?;
        df.with_column(Series::new(name.into(), values).into_column())?;
    }

    // Promotion context only applies when orders reference promotions at all.
    if df.column("promotion_id").is_ok() {
        validate_dimension(
            promotions,
            "promotions",
            &PROMOTION_REQUIRED,
            &["promotion_id"],
            "promotion_id",
        )?;
        let lookup = build_lookup(promotions, "promotion_id")?;
        let indices = match_indices(&df, "promotion_id", &lookup)?;
        let types = gather_string(promotions, "promotion_type", &indices)?;
        df.with_column(Series::new("promotion_type".into(), types).into_column())?;
        let values = gather_f64(promotions, "discount_value", &indices)?;
        df.with_column(Series::new("promotion_discount_value".into(), values).into_column())?;
        let active = gather_string(promotions, "is_active", &indices)?;
        df.with_column(Series::new("promotion_is_active".into(), active).into_column())?;
    }

    SchemaValidator::new("order_items", order_items)
        .validate_required_columns(&ORDER_ITEM_REQUIRED)?;
    let mut rollup: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for idx in 0..order_items.height() {
        let key = column_value_string(order_items, "order_id", idx);
        if key.is_empty() {
            continue;
        }
        let entry = rollup.entry(key).or_insert((0.0, 0.0));
        entry.0 += column_value_f64(order_items, "quantity", idx).unwrap_or(0.0);
        entry.1 += column_value_f64(order_items, "subtotal", idx).unwrap_or(0.0);
    }
    let mut items_count = Vec::with_capacity(rows);
    let mut items_subtotal = Vec::with_capacity(rows);
    for idx in 0..rows {
        let key = column_value_string(&df, "order_id", idx);
        let (count, subtotal) = rollup.get(&key).copied().unwrap_or((0.0, 0.0));
        items_count.push(count);
        items_subtotal.push(subtotal);
    }
    df.with_column(Series::new("items_count".into(), items_count.clone()).into_column())?;
    df.with_column(Series::new("items_subtotal".into(), items_subtotal).into_column())?;

    let mut avg_item_price = Vec::with_capacity(rows);
    let mut order_month: Vec<Option<String>> = Vec::with_capacity(rows);
    let mut used_promotion = Vec::with_capacity(rows);
    let mut is_free_shipping = Vec::with_capacity(rows);
    let mut is_high_discount = Vec::with_capacity(rows);
    let has_promotions = df.column("promotion_id").is_ok();
    for idx in 0..rows {
        let count = items_count[idx];
        let total = column_value_f64(&df, "total_amount", idx).unwrap_or(0.0);
        avg_item_price.push(if count > 0.0 { total / count } else { 0.0 });
        order_month.push(month_of(&column_value_string(&df, "order_date", idx)));
        used_promotion.push(
            has_promotions && !column_value_string(&df, "promotion_id", idx).is_empty(),
        );
        is_free_shipping.push(
            column_value_f64(&df, "shipping_cost", idx).is_some_and(|cost| cost == 0.0),
        );
        is_high_discount.push(
            column_value_f64(&df, "discount_percent", idx)
                .is_some_and(|discount| discount >= settings.high_discount_threshold),
        );
    }
    df.with_column(Series::new("avg_item_price".into(), avg_item_price).into_column())?;
    df.with_column(Series::new("order_month".into(), order_month).into_column())?;
    df.with_column(Series::new("used_promotion".into(), used_promotion).into_column())?;
    df.with_column(Series::new("is_free_shipping".into(), is_free_shipping).into_column())?;
    df.with_column(Series::new("is_high_discount".into(), is_high_discount).into_column())?;

    info!(rows, columns = df.width(), "orders enriched");
    Ok(df)
}

#[cfg(test)]
mod tests {
    use ecom_model::TransformError;

    use super::*;

    fn frame(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
        let columns = columns
            .into_iter()
            .map(|(name, values)| {
                let values: Vec<Option<String>> = values
                    .into_iter()
                    .map(|value| value.map(str::to_string))
                    .collect();
                Series::new(name.into(), values).into_column()
            })
            .collect();
        DataFrame::new(columns).expect("test frame")
    }

    fn orders() -> DataFrame {
        frame(vec![
            ("order_id", vec![Some("1"), Some("2")]),
            ("customer_id", vec![Some("10"), Some("99")]),
            ("promotion_id", vec![Some("5"), None]),
            ("order_date", vec![Some("2026-01-15"), Some("2026-02-01")]),
            ("total_amount", vec![Some("100"), Some("40")]),
            ("shipping_cost", vec![Some("0"), Some("7.5")]),
            ("discount_percent", vec![Some("25"), Some("0")]),
        ])
    }

    fn customers() -> DataFrame {
        frame(vec![
            ("customer_id", vec![Some("10")]),
            ("segment", vec![Some("premium")]),
            ("registration_date", vec![Some("2024-06-01")]),
        ])
    }

    fn promotions() -> DataFrame {
        frame(vec![
            ("promotion_id", vec![Some("5")]),
            ("promotion_type", vec![Some("percent")]),
            ("discount_value", vec![Some("25")]),
            ("is_active", vec![Some("true")]),
        ])
    }

    fn order_items() -> DataFrame {
        frame(vec![
            ("order_id", vec![Some("1"), Some("1")]),
            ("product_id", vec![Some("7"), Some("8")]),
            ("quantity", vec![Some("2"), Some("2")]),
            ("unit_price", vec![Some("20"), Some("30")]),
            ("subtotal", vec![Some("40"), Some("60")]),
        ])
    }

    #[test]
    fn preserves_rows_and_nulls_unmatched_joins() {
        let enriched = enrich_orders(
            &orders(),
            &customers(),
            &promotions(),
            &order_items(),
            &EnrichmentSettings::default(),
        )
        .expect("enrich");
        assert_eq!(enriched.height(), 2);
        let segments = enriched.column("segment").expect("segment");
        assert_eq!(segments.null_count(), 1);
    }

    #[test]
    fn derived_flags_and_rollups() {
        let enriched = enrich_orders(
            &orders(),
            &customers(),
            &promotions(),
            &order_items(),
            &EnrichmentSettings::default(),
        )
        .expect("enrich");

        let counts = enriched
            .column("items_count")
            .expect("items_count")
            .f64()
            .expect("float");
        assert_eq!(counts.get(0), Some(4.0));
        assert_eq!(counts.get(1), Some(0.0));

        let avg = enriched
            .column("avg_item_price")
            .expect("avg_item_price")
            .f64()
            .expect("float");
        assert_eq!(avg.get(0), Some(25.0));
        assert_eq!(avg.get(1), Some(0.0));

        let months = enriched
            .column("order_month")
            .expect("order_month")
            .str()
            .expect("string");
        assert_eq!(months.get(0), Some("2026-01"));

        let used = enriched
            .column("used_promotion")
            .expect("used_promotion")
            .bool()
            .expect("bool");
        assert_eq!(used.get(0), Some(true));
        assert_eq!(used.get(1), Some(false));

        let high = enriched
            .column("is_high_discount")
            .expect("is_high_discount")
            .bool()
            .expect("bool");
        assert_eq!(high.get(0), Some(true));
        assert_eq!(high.get(1), Some(false));
    }

    #[test]
    fn duplicate_customer_keys_are_rejected() {
        let bad_customers = frame(vec![
            ("customer_id", vec![Some("10"), Some("10")]),
            ("segment", vec![Some("premium"), Some("standard")]),
            ("registration_date", vec![Some("2024-06-01"), Some("2024-07-01")]),
        ]);
        let err = enrich_orders(
            &orders(),
            &bad_customers,
            &promotions(),
            &order_items(),
            &EnrichmentSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::DuplicateKey { .. }));
    }
}
