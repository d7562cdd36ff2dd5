//! Cleaning configuration: null strategies, semantic types, range constraints.
//!
//! Concrete table cleaners supply only a [`CleanerSpec`]; the execution order
//! of the cleaning phases is fixed by the engine and cannot be altered here.

/// How nulls in one column are repaired.
///
/// Closed set, dispatched exhaustively — adding a strategy is a
/// compile-time-checked change.
#[derive(Debug, Clone, PartialEq)]
pub enum NullStrategy {
    /// Remove the row entirely.
    DropRow,
    /// Substitute the mean of the column's non-missing numeric values.
    FillMean,
    /// Substitute the median of the column's non-missing numeric values.
    FillMedian,
    /// Substitute the most frequent non-missing value.
    FillMode,
    /// Substitute a fixed sentinel string.
    FillConst(String),
    /// Substitute numeric zero.
    FillZero,
}

impl NullStrategy {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DropRow => "drop_row",
            Self::FillMean => "fill_mean",
            Self::FillMedian => "fill_median",
            Self::FillMode => "fill_mode",
            Self::FillConst(_) => "fill_const",
            Self::FillZero => "fill_zero",
        }
    }
}

/// Declared semantic type of a column, driving the coercion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// Integer identifier (Int64).
    Int,
    /// Decimal amount or measure (Float64).
    Float,
    /// Free text or category (String).
    Text,
    /// Calendar date, normalized to `YYYY-MM-DD` (stored as String).
    Date,
    /// Boolean flag.
    Bool,
}

impl SemanticType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::Date => "date",
            Self::Bool => "bool",
        }
    }
}

/// Inclusive numeric bounds for one column; either side may be open.
#[derive(Debug, Clone)]
pub struct RangeConstraint {
    pub column: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeConstraint {
    pub fn at_least(column: &str, min: f64) -> Self {
        Self {
            column: column.to_string(),
            min: Some(min),
            max: None,
        }
    }

    pub fn between(column: &str, min: f64, max: f64) -> Self {
        Self {
            column: column.to_string(),
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Everything a concrete cleaner contributes: policy, never step order.
#[derive(Debug, Clone)]
pub struct CleanerSpec {
    /// Table name for logs and errors.
    pub table: String,
    /// Primary key column; must be unique and non-null after cleaning.
    pub primary_key: String,
    /// Columns that must be non-null after the null-handling phase
    /// (identifiers and other never-filled columns).
    pub mandatory: Vec<String>,
    /// Column → strategy, applied in declaration order.
    pub strategies: Vec<(String, NullStrategy)>,
    /// Column → semantic type for the coercion phase.
    pub types: Vec<(String, SemanticType)>,
    /// Declared numeric ranges re-checked after coercion.
    pub ranges: Vec<RangeConstraint>,
    /// Columns that must be present before cleaning starts.
    pub required_columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_labels_are_stable() {
        assert_eq!(NullStrategy::DropRow.label(), "drop_row");
        assert_eq!(
            NullStrategy::FillConst("n/a".to_string()).label(),
            "fill_const"
        );
        assert_eq!(NullStrategy::FillZero.label(), "fill_zero");
    }

    #[test]
    fn range_constructors() {
        let open = RangeConstraint::at_least("subtotal", 0.0);
        assert_eq!(open.min, Some(0.0));
        assert!(open.max.is_none());

        let closed = RangeConstraint::between("discount_percent", 0.0, 100.0);
        assert_eq!(closed.max, Some(100.0));
    }
}
