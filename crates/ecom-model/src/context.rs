//! Per-run context: run identifier and stage metric counters.
//!
//! Created once at run start, passed by mutable reference through every
//! stage, and dropped when the run ends. Nothing here survives a run.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Bounded-lifetime context for a single pipeline run.
#[derive(Debug)]
pub struct RunContext {
    run_id: String,
    started: Instant,
    stage_metrics: BTreeMap<String, BTreeMap<String, i64>>,
}

impl RunContext {
    /// Start a new run with a timestamp-derived identifier.
    pub fn start() -> Self {
        let run_id = format!("run-{}", chrono::Local::now().format("%Y%m%d-%H%M%S"));
        Self::with_run_id(run_id)
    }

    /// Start a run with an explicit identifier (useful in tests).
    pub fn with_run_id(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started: Instant::now(),
            stage_metrics: BTreeMap::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Record (or overwrite) a named counter for a stage.
    pub fn record_metric(&mut self, stage: &str, key: &str, value: i64) {
        self.stage_metrics
            .entry(stage.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn stage_metrics(&self) -> &BTreeMap<String, BTreeMap<String, i64>> {
        &self.stage_metrics
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_accumulate_per_stage() {
        let mut ctx = RunContext::with_run_id("run-test");
        ctx.record_metric("cleaning", "orders_rows", 10);
        ctx.record_metric("cleaning", "reviews_rows", 4);
        ctx.record_metric("aggregating", "metrics_generated", 16);

        assert_eq!(ctx.run_id(), "run-test");
        let cleaning = ctx.stage_metrics().get("cleaning").expect("cleaning stage");
        assert_eq!(cleaning.get("orders_rows"), Some(&10));
        assert_eq!(cleaning.len(), 2);
        assert_eq!(ctx.stage_metrics().len(), 2);
    }

    #[test]
    fn recording_twice_overwrites() {
        let mut ctx = RunContext::with_run_id("run-test");
        ctx.record_metric("cleaning", "orders_rows", 10);
        ctx.record_metric("cleaning", "orders_rows", 8);
        let cleaning = ctx.stage_metrics().get("cleaning").expect("cleaning stage");
        assert_eq!(cleaning.get("orders_rows"), Some(&8));
    }
}
