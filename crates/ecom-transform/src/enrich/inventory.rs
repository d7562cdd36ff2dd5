//! Inventory enrichment: product and warehouse context plus stock flags.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::info;

use ecom_ingest::data_utils::column_value_f64;
use ecom_model::Result;

use super::{build_lookup, gather_f64, gather_string, match_indices, validate_dimension};

pub(crate) const PRODUCT_REQUIRED: [&str; 4] =
    ["product_id", "product_name", "category_id", "brand_id"];
const WAREHOUSE_REQUIRED: [&str; 4] = [
    "warehouse_id",
    "location",
    "capacity_units",
    "current_occupancy",
];

pub fn enrich_inventory(
    inventory: &DataFrame,
    products: &DataFrame,
    warehouses: &DataFrame,
) -> Result<DataFrame> {
    let mut df = inventory.clone();
    let rows = df.height();

    validate_dimension(
        products,
        "products",
        &PRODUCT_REQUIRED,
        &["product_id", "product_name"],
        "product_id",
    )?;
    let lookup = build_lookup(products, "product_id")?;
    let indices = match_indices(&df, "product_id", &lookup)?;
    for name in ["product_name", "category_id", "brand_id"] {
        let values = gather_string(products, name, &indices)?;
        df.with_column(Series::new(name.into(), values).into_column())?;
    }

    validate_dimension(
        warehouses,
        "warehouses",
        &WAREHOUSE_REQUIRED,
        &["warehouse_id", "location"],
        "warehouse_id",
    )?;
    let lookup = build_lookup(warehouses, "warehouse_id")?;
    let indices = match_indices(&df, "warehouse_id", &lookup)?;
    let locations = gather_string(warehouses, "location", &indices)?;
    df.with_column(Series::new("location".into(), locations).into_column())?;
    let capacity = gather_f64(warehouses, "capacity_units", &indices)?;
    df.with_column(Series::new("capacity_units".into(), capacity).into_column())?;
    let occupancy = gather_f64(warehouses, "current_occupancy", &indices)?;
    df.with_column(Series::new("current_occupancy".into(), occupancy).into_column())?;

    let mut is_low_stock = Vec::with_capacity(rows);
    let mut is_overstock = Vec::with_capacity(rows);
    for idx in 0..rows {
        let quantity = column_value_f64(&df, "quantity", idx).unwrap_or(0.0);
        let min_level = column_value_f64(&df, "min_stock_level", idx).unwrap_or(0.0);
        let max_level = column_value_f64(&df, "max_stock_level", idx).unwrap_or(0.0);
        is_low_stock.push(quantity <= min_level);
        is_overstock.push(quantity >= max_level);
    }
    df.with_column(Series::new("is_low_stock".into(), is_low_stock).into_column())?;
    df.with_column(Series::new("is_overstock".into(), is_overstock).into_column())?;

    info!(rows, columns = df.width(), "inventory enriched");
    Ok(df)
}

#[cfg(test)]
mod tests {
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

    #[test]
    fn stock_flags_use_the_configured_levels() {
        let inventory = frame(vec![
            ("inventory_id", vec![Some("1"), Some("2"), Some("3")]),
            ("product_id", vec![Some("7"), Some("7"), Some("7")]),
            ("warehouse_id", vec![Some("1"), Some("1"), Some("1")]),
            ("quantity", vec![Some("5"), Some("50"), Some("120")]),
            ("min_stock_level", vec![Some("10"), Some("10"), Some("10")]),
            ("max_stock_level", vec![Some("100"), Some("100"), Some("100")]),
        ]);
        let products = frame(vec![
            ("product_id", vec![Some("7")]),
            ("product_name", vec![Some("Widget")]),
            ("category_id", vec![Some("3")]),
            ("brand_id", vec![Some("2")]),
        ]);
        let warehouses = frame(vec![
            ("warehouse_id", vec![Some("1")]),
            ("location", vec![Some("Lisbon")]),
            ("capacity_units", vec![Some("1000")]),
            ("current_occupancy", vec![Some("400")]),
        ]);

        let enriched = enrich_inventory(&inventory, &products, &warehouses).expect("enrich");
        assert_eq!(enriched.height(), 3);
        let low = enriched
            .column("is_low_stock")
            .expect("is_low_stock")
            .bool()
            .expect("bool");
        assert_eq!(low.get(0), Some(true));
        assert_eq!(low.get(1), Some(false));
        let over = enriched
            .column("is_overstock")
            .expect("is_overstock")
            .bool()
            .expect("bool");
        assert_eq!(over.get(2), Some(true));
        let names = enriched
            .column("product_name")
            .expect("product_name")
            .str()
            .expect("string");
        assert_eq!(names.get(0), Some("Widget"));
    }
}
