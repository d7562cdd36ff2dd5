//! Fail-fast run orchestration over the three transform stages.
//!
//! The stage machine only moves forward: `NotStarted → Cleaning → Enriching
//! → Aggregating → Complete`, with `Failed` absorbing from any active
//! stage. The first error is logged with its category and propagated;
//! nothing is caught and continued, and the result maps are built
//! atomically or not at all.

use std::collections::BTreeMap;
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{error, info, info_span};

use ecom_model::{Result, RunContext, Settings};

use crate::aggregate::{customer, inventory, lifecycle, product, review, sales};
use crate::cleaning;
use crate::enrich;

/// Every source table one run operates on.
#[derive(Debug, Clone)]
pub struct TableSet {
    pub orders: DataFrame,
    pub customers: DataFrame,
    pub promotions: DataFrame,
    pub order_items: DataFrame,
    pub products: DataFrame,
    pub reviews: DataFrame,
    pub inventory: DataFrame,
    pub warehouses: DataFrame,
}

/// Enriched datasets and aggregated metrics of a successful run.
#[derive(Debug)]
pub struct TransformResult {
    pub enriched: BTreeMap<String, DataFrame>,
    pub metrics: BTreeMap<String, DataFrame>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NotStarted,
    Cleaning,
    Enriching,
    Aggregating,
    Complete,
    Failed,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Cleaning => "cleaning",
            Self::Enriching => "enriching",
            Self::Aggregating => "aggregating",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug)]
pub struct TransformOrchestrator {
    stage: Stage,
}

impl Default for TransformOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformOrchestrator {
    pub fn new() -> Self {
        Self {
            stage: Stage::NotStarted,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(
        &mut self,
        tables: &TableSet,
        settings: &Settings,
        ctx: &mut RunContext,
    ) -> Result<TransformResult> {
        match self.run_stages(tables, settings, ctx) {
            Ok(result) => {
                self.stage = Stage::Complete;
                info!(run_id = ctx.run_id(), "transform complete");
                Ok(result)
            }
            Err(err) => {
                error!(
                    run_id = ctx.run_id(),
                    stage = self.stage.name(),
                    category = %err.category(),
                    error = %err,
                    "transform failed"
                );
                self.stage = Stage::Failed;
                Err(err)
            }
        }
    }

    fn run_stages(
        &mut self,
        tables: &TableSet,
        settings: &Settings,
        ctx: &mut RunContext,
    ) -> Result<TransformResult> {
        self.stage = Stage::Cleaning;
        let started = Instant::now();
        let span = info_span!("cleaning");
        let (orders, inventory, reviews) = {
            let _guard = span.enter();
            let orders = cleaning::clean(
                &tables.orders,
                &cleaning::orders::orders_spec(&settings.cleaning),
            )?;
            let inventory =
                cleaning::clean(&tables.inventory, &cleaning::inventory::inventory_spec())?;
            let reviews = cleaning::clean(&tables.reviews, &cleaning::reviews::reviews_spec())?;
            (orders, inventory, reviews)
        };
        ctx.record_metric("cleaning", "orders_rows", orders.height() as i64);
        ctx.record_metric("cleaning", "inventory_rows", inventory.height() as i64);
        ctx.record_metric("cleaning", "reviews_rows", reviews.height() as i64);
        ctx.record_metric(
            "cleaning",
            "duration_ms",
            started.elapsed().as_millis() as i64,
        );
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            orders_rows = orders.height(),
            inventory_rows = inventory.height(),
            reviews_rows = reviews.height(),
            "cleaning stage done"
        );

        self.stage = Stage::Enriching;
        let started = Instant::now();
        let span = info_span!("enriching");
        let (orders, inventory, reviews) = {
            let _guard = span.enter();
            let orders = enrich::orders::enrich_orders(
                &orders,
                &tables.customers,
                &tables.promotions,
                &tables.order_items,
                &settings.enrichment,
            )?;
            let inventory = enrich::inventory::enrich_inventory(
                &inventory,
                &tables.products,
                &tables.warehouses,
            )?;
            let reviews =
                enrich::reviews::enrich_reviews(&reviews, &tables.products, &tables.customers)?;
            (orders, inventory, reviews)
        };
        ctx.record_metric("enriching", "orders_columns", orders.width() as i64);
        ctx.record_metric("enriching", "inventory_columns", inventory.width() as i64);
        ctx.record_metric("enriching", "reviews_columns", reviews.width() as i64);
        ctx.record_metric(
            "enriching",
            "duration_ms",
            started.elapsed().as_millis() as i64,
        );
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            "enriching stage done"
        );

        self.stage = Stage::Aggregating;
        let started = Instant::now();
        let span = info_span!("aggregating");
        let mut metrics = BTreeMap::new();
        {
            let _guard = span.enter();
            let aggregation = &settings.aggregation;
            metrics.insert(
                "top_spenders".to_string(),
                customer::top_spenders(&orders, aggregation)?,
            );
            metrics.insert(
                "recurring_customers".to_string(),
                customer::recurring_customers(&orders, aggregation)?,
            );
            metrics.insert(
                "average_ticket".to_string(),
                customer::average_ticket(&orders)?,
            );
            metrics.insert(
                "top_products".to_string(),
                product::top_products(&tables.order_items, &tables.products, aggregation)?,
            );
            metrics.insert("monthly_sales".to_string(), sales::monthly_sales(&orders)?);
            metrics.insert(
                "promotion_usage_rate".to_string(),
                sales::promotion_usage_rate(&orders)?,
            );
            metrics.insert(
                "status_funnel".to_string(),
                lifecycle::status_funnel(&orders)?,
            );
            metrics.insert(
                "cancellation_rate".to_string(),
                lifecycle::cancellation_rate(&orders)?,
            );
            metrics.insert(
                "delivery_rate".to_string(),
                lifecycle::delivery_rate(&orders)?,
            );
            metrics.insert(
                "backlog_in_progress".to_string(),
                lifecycle::in_progress_backlog(&orders)?,
            );
            metrics.insert(
                "inventory_health".to_string(),
                inventory::stock_health_summary(&inventory)?,
            );
            metrics.insert(
                "low_stock_items".to_string(),
                inventory::low_stock_items(&inventory, aggregation)?,
            );
            metrics.insert(
                "warehouse_utilization".to_string(),
                inventory::warehouse_utilization(&inventory)?,
            );
            metrics.insert(
                "reviews_overview".to_string(),
                review::rating_overview(&reviews)?,
            );
            metrics.insert(
                "reviews_by_product".to_string(),
                review::rating_by_product(&reviews, aggregation)?,
            );
            metrics.insert(
                "reviews_monthly".to_string(),
                review::monthly_review_volume(&reviews)?,
            );
        }
        ctx.record_metric("aggregating", "metrics_generated", metrics.len() as i64);
        ctx.record_metric(
            "aggregating",
            "duration_ms",
            started.elapsed().as_millis() as i64,
        );
        info!(
            duration_ms = started.elapsed().as_millis() as u64,
            metrics = metrics.len(),
            "aggregating stage done"
        );

        let mut enriched = BTreeMap::new();
        enriched.insert("orders".to_string(), orders);
        enriched.insert("inventory".to_string(), inventory);
        enriched.insert("reviews".to_string(), reviews);
        Ok(TransformResult { enriched, metrics })
    }
}
