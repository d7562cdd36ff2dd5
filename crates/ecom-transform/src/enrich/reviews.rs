//! Reviews enrichment: product and customer context plus sentiment flags.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};
use tracing::info;

use ecom_ingest::data_utils::{column_value_f64, column_value_string};
use ecom_model::Result;

use super::inventory::PRODUCT_REQUIRED;
use super::{build_lookup, gather_string, match_indices, month_of, validate_dimension};

const CUSTOMER_REQUIRED: [&str; 2] = ["customer_id", "segment"];
const CUSTOMER_OPTIONAL: [&str; 2] = ["city", "country"];

const POSITIVE_RATING: f64 = 4.0;
const NEGATIVE_RATING: f64 = 2.0;

pub fn enrich_reviews(
    reviews: &DataFrame,
    products: &DataFrame,
    customers: &DataFrame,
) -> Result<DataFrame> {
    let mut df = reviews.clone();
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
        customers,
        "customers",
        &CUSTOMER_REQUIRED,
        &["customer_id"],
        "customer_id",
    )?;
    let lookup = build_lookup(customers, "customer_id")?;
    let indices = match_indices(&df, "customer_id", &lookup)?;
    let segments = gather_string(customers, "segment", &indices)?;
    df.with_column(Series::new("segment".into(), segments).into_column())?;
    for name in CUSTOMER_OPTIONAL {
        if customers.column(name).is_err() {
            continue;
        }
        let values = gather_string(customers, name, &indices)?;
        df.with_column(Series::new(name.into(), values).into_column())?;
    }

    let has_comments = df.column("comment").is_ok();
    let mut review_month: Vec<Option<String>> = Vec::with_capacity(rows);
    let mut comment_length: Vec<i64> = Vec::with_capacity(rows);
    let mut is_positive = Vec::with_capacity(rows);
    let mut is_negative = Vec::with_capacity(rows);
    for idx in 0..rows {
        review_month.push(month_of(&column_value_string(&df, "created_at", idx)));
        let comment = if has_comments {
            column_value_string(&df, "comment", idx)
        } else {
            String::new()
        };
        comment_length.push(comment.chars().count() as i64);
        let rating = column_value_f64(&df, "rating", idx).unwrap_or(0.0);
        is_positive.push(rating >= POSITIVE_RATING);
        is_negative.push(rating > 0.0 && rating <= NEGATIVE_RATING);
    }
    df.with_column(Series::new("review_month".into(), review_month).into_column())?;
    df.with_column(Series::new("comment_length".into(), comment_length).into_column())?;
    df.with_column(Series::new("is_positive".into(), is_positive).into_column())?;
    df.with_column(Series::new("is_negative".into(), is_negative).into_column())?;

    info!(rows, columns = df.width(), "reviews enriched");
    Ok(df)
}
