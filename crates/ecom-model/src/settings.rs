//! Run settings: source-table mapping, thresholds, output toggles.
//!
//! Read once at run start and treated as immutable for the whole run. All
//! fields carry defaults so an empty settings file (or none at all) yields
//! the documented standard behavior.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("settings file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Mapping from logical table name to source CSV file stem.
fn default_source_tables() -> BTreeMap<String, String> {
    let entries = [
        ("orders", "ecommerce_orders"),
        ("order_items", "ecommerce_order_items"),
        ("customers", "ecommerce_customers"),
        ("promotions", "ecommerce_promotions"),
        ("products", "ecommerce_products"),
        ("reviews", "ecommerce_reviews"),
        ("inventory", "ecommerce_inventory"),
        ("warehouses", "ecommerce_warehouses"),
    ];
    entries
        .iter()
        .map(|(name, stem)| (name.to_string(), stem.to_string()))
        .collect()
}

fn default_notes_sentinel() -> String {
    "not provided".to_string()
}

fn default_top_spenders_n() -> usize {
    5
}

fn default_top_spenders_percentile() -> Option<f64> {
    Some(0.8)
}

fn default_recurring_min_orders() -> u64 {
    2
}

fn default_top_products_n() -> usize {
    10
}

fn default_low_stock_items_n() -> usize {
    20
}

fn default_min_reviews_for_product() -> u64 {
    3
}

fn default_top_reviewed_products_n() -> usize {
    20
}

fn default_high_discount_threshold() -> f64 {
    20.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleaningSettings {
    /// Sentinel substituted for null free-text fields in orders.
    #[serde(default = "default_notes_sentinel")]
    pub notes_sentinel: String,
}

impl Default for CleaningSettings {
    fn default() -> Self {
        Self {
            notes_sentinel: default_notes_sentinel(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentSettings {
    /// Discount percentage at or above which an order counts as high-discount.
    #[serde(default = "default_high_discount_threshold")]
    pub high_discount_threshold: f64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            high_discount_threshold: default_high_discount_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationSettings {
    #[serde(default = "default_top_spenders_n")]
    pub top_spenders_n: usize,
    /// Optional percentile filter on total spend before ranking.
    #[serde(default = "default_top_spenders_percentile")]
    pub top_spenders_percentile: Option<f64>,
    #[serde(default = "default_recurring_min_orders")]
    pub recurring_min_orders: u64,
    #[serde(default = "default_top_products_n")]
    pub top_products_n: usize,
    #[serde(default = "default_low_stock_items_n")]
    pub low_stock_items_n: usize,
    #[serde(default = "default_min_reviews_for_product")]
    pub min_reviews_for_product: u64,
    #[serde(default = "default_top_reviewed_products_n")]
    pub top_reviewed_products_n: usize,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            top_spenders_n: default_top_spenders_n(),
            top_spenders_percentile: default_top_spenders_percentile(),
            recurring_min_orders: default_recurring_min_orders(),
            top_products_n: default_top_products_n(),
            low_stock_items_n: default_low_stock_items_n(),
            min_reviews_for_product: default_min_reviews_for_product(),
            top_reviewed_products_n: default_top_reviewed_products_n(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_true")]
    pub csv: bool,
    #[serde(default = "default_true")]
    pub parquet: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            csv: true,
            parquet: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source_tables: BTreeMap<String, String>,
    pub cleaning: CleaningSettings,
    pub enrichment: EnrichmentSettings,
    pub aggregation: AggregationSettings,
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_tables: default_source_tables(),
            cleaning: CleaningSettings::default(),
            enrichment: EnrichmentSettings::default(),
            aggregation: AggregationSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults per field.
    pub fn from_json_file(path: &Path) -> Result<Self, SettingsError> {
        let mut raw = String::new();
        std::fs::File::open(path)
            .and_then(|mut file| file.read_to_string(&mut raw))
            .map_err(|source| SettingsError::Io {
                path: path.display().to_string(),
                source,
            })?;
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Source file stem for a logical table name.
    pub fn source_stem(&self, table: &str) -> Option<&str> {
        self.source_tables.get(table).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_cover_all_source_tables() {
        let settings = Settings::default();
        for table in [
            "orders",
            "order_items",
            "customers",
            "promotions",
            "products",
            "reviews",
            "inventory",
            "warehouses",
        ] {
            assert!(settings.source_stem(table).is_some(), "missing {table}");
        }
        assert_eq!(settings.aggregation.top_spenders_n, 5);
        assert_eq!(settings.aggregation.recurring_min_orders, 2);
        assert!((settings.enrichment.high_discount_threshold - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let mut file = std::fs::File::create(&path).expect("create settings");
        file.write_all(br#"{"aggregation": {"top_spenders_n": 3}}"#)
            .expect("write settings");

        let settings = Settings::from_json_file(&path).expect("load settings");
        assert_eq!(settings.aggregation.top_spenders_n, 3);
        assert_eq!(settings.aggregation.top_products_n, 10);
        assert_eq!(settings.cleaning.notes_sentinel, "not provided");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = Settings::from_json_file(Path::new("/nonexistent/settings.json"));
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }
}
