//! Metric aggregation.
//!
//! Grouping accumulates into ordered maps so results never depend on input
//! row order; every ranking declares its tie-breaks; thresholds come from
//! settings; zero denominators fall back to 0.0 and are logged as data
//! quality observations. Each metric has a fixed output schema that holds
//! for empty input too.

pub mod customer;
pub mod inventory;
pub mod lifecycle;
pub mod product;
pub mod review;
pub mod sales;

/// Linear-interpolation percentile over unsorted values, `p` in `[0, 1]`.
pub(crate) fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let clamped = p.clamp(0.0, 1.0);
    let rank = clamped * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let fraction = rank - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

    pub fn frame(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
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

    pub fn f64_at(df: &DataFrame, column: &str, idx: usize) -> f64 {
        df.column(column)
            .expect(column)
            .f64()
            .expect("float column")
            .get(idx)
            .expect("value")
    }

    pub fn i64_at(df: &DataFrame, column: &str, idx: usize) -> i64 {
        df.column(column)
            .expect(column)
            .i64()
            .expect("int column")
            .get(idx)
            .expect("value")
    }

    pub fn str_at<'df>(df: &'df DataFrame, column: &str, idx: usize) -> &'df str {
        df.column(column)
            .expect(column)
            .str()
            .expect("string column")
            .get(idx)
            .expect("value")
    }
}
