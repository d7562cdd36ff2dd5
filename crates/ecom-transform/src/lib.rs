//! Transform core: validation, cleaning, enrichment, aggregation, and the
//! fail-fast orchestrator tying them together.

pub mod aggregate;
pub mod cleaning;
pub mod enrich;
pub mod orchestrator;
pub mod validator;

pub use cleaning::clean;
pub use orchestrator::{Stage, TableSet, TransformOrchestrator, TransformResult};
pub use validator::SchemaValidator;
