//! CLI library components for the e-commerce reporting ETL.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod pipeline;
pub mod summary;
