//! Review metrics: overall sentiment, per-product ratings, monthly volume.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, IntoColumn, NamedFrom, Series};

use ecom_ingest::data_utils::{any_to_i64, column_value_f64, column_value_string};
use ecom_model::{AggregationSettings, Result};

fn bool_at(df: &DataFrame, name: &str, idx: usize) -> bool {
    df.column(name)
        .ok()
        .and_then(|column| column.bool().ok().and_then(|flags| flags.get(idx)))
        .unwrap_or(false)
}

/// One-row overview of all reviews; zero rows when there are none.
pub fn rating_overview(reviews: &DataFrame) -> Result<DataFrame> {
    let total = reviews.height();
    if total == 0 {
        return Ok(DataFrame::new(vec![
            Series::new("review_count".into(), Vec::<i64>::new()).into_column(),
            Series::new("average_rating".into(), Vec::<f64>::new()).into_column(),
            Series::new("positive_rate".into(), Vec::<f64>::new()).into_column(),
            Series::new("negative_rate".into(), Vec::<f64>::new()).into_column(),
        ])?);
    }
    let mut rating_sum = 0.0;
    let mut positive = 0usize;
    let mut negative = 0usize;
    for idx in 0..total {
        rating_sum += column_value_f64(reviews, "rating", idx).unwrap_or(0.0);
        if bool_at(reviews, "is_positive", idx) {
            positive += 1;
        }
        if bool_at(reviews, "is_negative", idx) {
            negative += 1;
        }
    }
    Ok(DataFrame::new(vec![
        Series::new("review_count".into(), vec![total as i64]).into_column(),
        Series::new("average_rating".into(), vec![rating_sum / total as f64]).into_column(),
        Series::new("positive_rate".into(), vec![positive as f64 / total as f64])
            .into_column(),
        Series::new("negative_rate".into(), vec![negative as f64 / total as f64])
            .into_column(),
    ])?)
}

/// Per-product rating summary. Products below the configured review count
/// are dropped; rating descending, then review count descending, then
/// product id ascending; truncated to the configured count.
pub fn rating_by_product(
    reviews: &DataFrame,
    settings: &AggregationSettings,
) -> Result<DataFrame> {
    #[derive(Default, Clone)]
    struct ProductReviews {
        name: Option<String>,
        count: i64,
        rating_sum: f64,
        positive: i64,
    }

    let product_ids = reviews.column("product_id")?;
    let has_names = reviews.column("product_name").is_ok();
    let mut stats: BTreeMap<i64, ProductReviews> = BTreeMap::new();
    for idx in 0..reviews.height() {
        let Some(product_id) = any_to_i64(product_ids.get(idx).unwrap_or(AnyValue::Null)) else {
            continue;
        };
        let entry = stats.entry(product_id).or_default();
        entry.count += 1;
        entry.rating_sum += column_value_f64(reviews, "rating", idx).unwrap_or(0.0);
        if bool_at(reviews, "is_positive", idx) {
            entry.positive += 1;
        }
        if entry.name.is_none() && has_names {
            let name = column_value_string(reviews, "product_name", idx);
            if !name.is_empty() {
                entry.name = Some(name);
            }
        }
    }

    let mut rows: Vec<(i64, ProductReviews)> = stats
        .into_iter()
        .filter(|(_, stats)| stats.count >= settings.min_reviews_for_product as i64)
        .collect();
    rows.sort_by(|(id_a, stats_a), (id_b, stats_b)| {
        let rating_a = stats_a.rating_sum / stats_a.count as f64;
        let rating_b = stats_b.rating_sum / stats_b.count as f64;
        rating_b
            .total_cmp(&rating_a)
            .then(stats_b.count.cmp(&stats_a.count))
            .then(id_a.cmp(id_b))
    });
    rows.truncate(settings.top_reviewed_products_n);

    Ok(DataFrame::new(vec![
        Series::new(
            "product_id".into(),
            rows.iter().map(|(id, _)| *id).collect::<Vec<i64>>(),
        )
        .into_column(),
        Series::new(
            "product_name".into(),
            rows.iter()
                .map(|(_, stats)| stats.name.clone())
                .collect::<Vec<Option<String>>>(),
        )
        .into_column(),
        Series::new(
            "review_count".into(),
            rows.iter().map(|(_, stats)| stats.count).collect::<Vec<i64>>(),
        )
        .into_column(),
        Series::new(
            "average_rating".into(),
            rows.iter()
                .map(|(_, stats)| stats.rating_sum / stats.count as f64)
                .collect::<Vec<f64>>(),
        )
        .into_column(),
        Series::new(
            "positive_rate".into(),
            rows.iter()
                .map(|(_, stats)| stats.positive as f64 / stats.count as f64)
                .collect::<Vec<f64>>(),
        )
        .into_column(),
    ])?)
}

/// Review volume and average rating per `review_month`, months ascending.
pub fn monthly_review_volume(reviews: &DataFrame) -> Result<DataFrame> {
    let mut buckets: BTreeMap<String, (i64, f64)> = BTreeMap::new();
    for idx in 0..reviews.height() {
        let month = column_value_string(reviews, "review_month", idx);
        if month.is_empty() {
            continue;
        }
        let entry = buckets.entry(month).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += column_value_f64(reviews, "rating", idx).unwrap_or(0.0);
    }
    let months: Vec<String> = buckets.keys().cloned().collect();
    let volumes: Vec<i64> = buckets.values().map(|(count, _)| *count).collect();
    let averages: Vec<f64> = buckets
        .values()
        .map(|(count, rating_sum)| rating_sum / *count as f64)
        .collect();
    Ok(DataFrame::new(vec![
        Series::new("review_month".into(), months).into_column(),
        Series::new("reviews".into(), volumes).into_column(),
        Series::new("average_rating".into(), averages).into_column(),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{f64_at, frame, i64_at, str_at};
    use super::*;

    fn reviews() -> DataFrame {
        let mut df = frame(vec![
            (
                "product_id",
                vec![Some("7"), Some("7"), Some("7"), Some("8"), Some("8")],
            ),
            ("rating", vec![Some("5"), Some("4"), Some("5"), Some("1"), Some("2")]),
            (
                "review_month",
                vec![Some("2026-01"), Some("2026-01"), Some("2026-02"), Some("2026-02"), Some("2026-02")],
            ),
            (
                "product_name",
                vec![Some("Widget"), Some("Widget"), Some("Widget"), Some("Gadget"), Some("Gadget")],
            ),
        ]);
        df.with_column(
            Series::new(
                "is_positive".into(),
                vec![true, true, true, false, false],
            )
            .into_column(),
        )
        .expect("positive flag");
        df.with_column(
            Series::new(
                "is_negative".into(),
                vec![false, false, false, true, true],
            )
            .into_column(),
        )
        .expect("negative flag");
        df
    }

    #[test]
    fn overview_rates() {
        let result = rating_overview(&reviews()).expect("overview");
        assert_eq!(result.height(), 1);
        assert_eq!(i64_at(&result, "review_count", 0), 5);
        assert_eq!(f64_at(&result, "positive_rate", 0), 0.6);
        assert_eq!(f64_at(&result, "negative_rate", 0), 0.4);
    }

    #[test]
    fn overview_on_empty_has_zero_rows() {
        let empty = frame(vec![("product_id", vec![]), ("rating", vec![])]);
        let result = rating_overview(&empty).expect("overview");
        assert_eq!(result.height(), 0);
        assert_eq!(result.width(), 4);
    }

    #[test]
    fn per_product_respects_minimum_count() {
        let result =
            rating_by_product(&reviews(), &AggregationSettings::default()).expect("per product");
        // Product 8 has only two reviews, below the default minimum of 3.
        assert_eq!(result.height(), 1);
        assert_eq!(i64_at(&result, "product_id", 0), 7);
        assert!((f64_at(&result, "average_rating", 0) - 14.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_volume_sorted_by_month() {
        let result = monthly_review_volume(&reviews()).expect("monthly");
        assert_eq!(result.height(), 2);
        assert_eq!(str_at(&result, "review_month", 0), "2026-01");
        assert_eq!(i64_at(&result, "reviews", 1), 3);
        assert!((f64_at(&result, "average_rating", 0) - 4.5).abs() < 1e-9);
    }
}
