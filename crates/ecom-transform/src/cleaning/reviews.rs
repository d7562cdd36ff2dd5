//! Cleaning policy for the `reviews` table.

use ecom_model::{CleanerSpec, NullStrategy, RangeConstraint, SemanticType};

/// A review without its key facts (who, what, when, score) cannot be used
/// and is dropped; vote counts default to zero.
pub fn reviews_spec() -> CleanerSpec {
    CleanerSpec {
        table: "reviews".to_string(),
        primary_key: "review_id".to_string(),
        mandatory: vec![
            "product_id".to_string(),
            "customer_id".to_string(),
            "rating".to_string(),
            "created_at".to_string(),
        ],
        strategies: vec![
            ("review_id".to_string(), NullStrategy::DropRow),
            ("product_id".to_string(), NullStrategy::DropRow),
            ("customer_id".to_string(), NullStrategy::DropRow),
            ("rating".to_string(), NullStrategy::DropRow),
            ("created_at".to_string(), NullStrategy::DropRow),
            ("helpful_votes".to_string(), NullStrategy::FillZero),
        ],
        types: vec![
            ("review_id".to_string(), SemanticType::Int),
            ("product_id".to_string(), SemanticType::Int),
            ("customer_id".to_string(), SemanticType::Int),
            ("rating".to_string(), SemanticType::Float),
            ("helpful_votes".to_string(), SemanticType::Float),
            ("created_at".to_string(), SemanticType::Date),
            ("comment".to_string(), SemanticType::Text),
        ],
        ranges: vec![
            RangeConstraint::between("rating", 1.0, 5.0),
            RangeConstraint::at_least("helpful_votes", 0.0),
        ],
        required_columns: vec![
            "review_id".to_string(),
            "product_id".to_string(),
            "customer_id".to_string(),
            "rating".to_string(),
            "created_at".to_string(),
        ],
    }
}
