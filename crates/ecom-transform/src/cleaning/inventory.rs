//! Cleaning policy for the `inventory` table.

use ecom_model::{CleanerSpec, NullStrategy, RangeConstraint, SemanticType};

/// Rows without full identification are useless downstream and are dropped;
/// missing stock levels count as zero.
pub fn inventory_spec() -> CleanerSpec {
    CleanerSpec {
        table: "inventory".to_string(),
        primary_key: "inventory_id".to_string(),
        mandatory: vec!["product_id".to_string(), "warehouse_id".to_string()],
        strategies: vec![
            ("inventory_id".to_string(), NullStrategy::DropRow),
            ("product_id".to_string(), NullStrategy::DropRow),
            ("warehouse_id".to_string(), NullStrategy::DropRow),
            ("quantity".to_string(), NullStrategy::FillZero),
            ("min_stock_level".to_string(), NullStrategy::FillZero),
            ("max_stock_level".to_string(), NullStrategy::FillZero),
        ],
        types: vec![
            ("inventory_id".to_string(), SemanticType::Int),
            ("product_id".to_string(), SemanticType::Int),
            ("warehouse_id".to_string(), SemanticType::Int),
            ("quantity".to_string(), SemanticType::Float),
            ("min_stock_level".to_string(), SemanticType::Float),
            ("max_stock_level".to_string(), SemanticType::Float),
            ("last_restock_date".to_string(), SemanticType::Date),
        ],
        ranges: vec![
            RangeConstraint::at_least("quantity", 0.0),
            RangeConstraint::at_least("min_stock_level", 0.0),
            RangeConstraint::at_least("max_stock_level", 0.0),
        ],
        required_columns: vec![
            "inventory_id".to_string(),
            "product_id".to_string(),
            "warehouse_id".to_string(),
            "quantity".to_string(),
            "min_stock_level".to_string(),
            "max_stock_level".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_columns_drop_their_rows() {
        let spec = inventory_spec();
        for key in ["inventory_id", "product_id", "warehouse_id"] {
            let strategy = spec
                .strategies
                .iter()
                .find(|(column, _)| column == key)
                .map(|(_, strategy)| strategy.clone());
            assert_eq!(strategy, Some(NullStrategy::DropRow), "{key}");
        }
    }
}
