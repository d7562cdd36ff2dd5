//! Cleaning policy for the `orders` fact table.

use ecom_model::{CleanerSpec, CleaningSettings, NullStrategy, RangeConstraint, SemanticType};

/// Identifiers and the order date are never repaired; money columns are
/// filled from observed values, free text gets the configured sentinel.
pub fn orders_spec(settings: &CleaningSettings) -> CleanerSpec {
    CleanerSpec {
        table: "orders".to_string(),
        primary_key: "order_id".to_string(),
        mandatory: vec!["customer_id".to_string(), "order_date".to_string()],
        strategies: vec![
            ("subtotal".to_string(), NullStrategy::FillMean),
            ("total_amount".to_string(), NullStrategy::FillMean),
            ("discount_percent".to_string(), NullStrategy::FillZero),
            ("shipping_cost".to_string(), NullStrategy::FillZero),
            ("tax_amount".to_string(), NullStrategy::FillZero),
            (
                "notes".to_string(),
                NullStrategy::FillConst(settings.notes_sentinel.clone()),
            ),
        ],
        types: vec![
            ("order_id".to_string(), SemanticType::Int),
            ("customer_id".to_string(), SemanticType::Int),
            ("promotion_id".to_string(), SemanticType::Int),
            ("order_date".to_string(), SemanticType::Date),
            ("status".to_string(), SemanticType::Text),
            ("subtotal".to_string(), SemanticType::Float),
            ("discount_percent".to_string(), SemanticType::Float),
            ("shipping_cost".to_string(), SemanticType::Float),
            ("tax_amount".to_string(), SemanticType::Float),
            ("total_amount".to_string(), SemanticType::Float),
            ("notes".to_string(), SemanticType::Text),
        ],
        ranges: vec![
            RangeConstraint::at_least("subtotal", 0.0),
            RangeConstraint::between("discount_percent", 0.0, 100.0),
            RangeConstraint::at_least("shipping_cost", 0.0),
            RangeConstraint::at_least("tax_amount", 0.0),
            RangeConstraint::at_least("total_amount", 0.0),
        ],
        required_columns: vec![
            "order_id".to_string(),
            "customer_id".to_string(),
            "order_date".to_string(),
            "status".to_string(),
            "subtotal".to_string(),
            "discount_percent".to_string(),
            "shipping_cost".to_string(),
            "tax_amount".to_string(),
            "total_amount".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_carry_no_fill_strategy() {
        let spec = orders_spec(&CleaningSettings::default());
        assert_eq!(spec.primary_key, "order_id");
        for key in ["order_id", "customer_id", "order_date"] {
            assert!(
                spec.strategies.iter().all(|(column, _)| column != key),
                "{key} must never be filled"
            );
        }
    }

    #[test]
    fn notes_use_the_configured_sentinel() {
        let settings = CleaningSettings {
            notes_sentinel: "n/a".to_string(),
        };
        let spec = orders_spec(&settings);
        let notes = spec
            .strategies
            .iter()
            .find(|(column, _)| column == "notes")
            .map(|(_, strategy)| strategy.clone());
        assert_eq!(notes, Some(NullStrategy::FillConst("n/a".to_string())));
    }
}
