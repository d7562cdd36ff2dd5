//! Shared model types for the e-commerce reporting ETL.

pub mod cleaner;
pub mod context;
pub mod error;
pub mod settings;

pub use cleaner::{CleanerSpec, NullStrategy, RangeConstraint, SemanticType};
pub use context::RunContext;
pub use error::{ErrorCategory, Result, TransformError};
pub use settings::{
    AggregationSettings, CleaningSettings, EnrichmentSettings, OutputSettings, Settings,
    SettingsError,
};
