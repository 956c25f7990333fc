//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `market_events_created_total` - Events created
//! - `market_primary_tickets_sold_total` - Tickets sold from primary bulks
//! - `market_resale_tickets_sold_total` - Tickets sold through resale listings
//! - `market_withdrawals_total` - Successful non-zero withdrawals
//! - `market_rejected_operations_total` - Operations rejected by validation
//! - `market_operation_duration_seconds` - Histogram of operation latencies

use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Events created
    pub events_created: IntCounter,

    /// Primary tickets sold
    pub primary_tickets_sold: IntCounter,

    /// Resale tickets sold
    pub resale_tickets_sold: IntCounter,

    /// Successful non-zero withdrawals
    pub withdrawals: IntCounter,

    /// Rejected operations
    pub rejected_operations: IntCounter,

    /// Operation duration histogram
    pub operation_duration: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let events_created =
            IntCounter::new("market_events_created_total", "Events created")?;
        registry.register(Box::new(events_created.clone()))?;

        let primary_tickets_sold = IntCounter::new(
            "market_primary_tickets_sold_total",
            "Tickets sold from primary bulks",
        )?;
        registry.register(Box::new(primary_tickets_sold.clone()))?;

        let resale_tickets_sold = IntCounter::new(
            "market_resale_tickets_sold_total",
            "Tickets sold through resale listings",
        )?;
        registry.register(Box::new(resale_tickets_sold.clone()))?;

        let withdrawals = IntCounter::new(
            "market_withdrawals_total",
            "Successful non-zero withdrawals",
        )?;
        registry.register(Box::new(withdrawals.clone()))?;

        let rejected_operations = IntCounter::new(
            "market_rejected_operations_total",
            "Operations rejected by validation",
        )?;
        registry.register(Box::new(rejected_operations.clone()))?;

        let operation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "market_operation_duration_seconds",
                "Histogram of operation latencies",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.010, 0.050, 0.100]),
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            events_created,
            primary_tickets_sold,
            resale_tickets_sold,
            withdrawals,
            rejected_operations,
            operation_duration,
            registry,
        })
    }

    /// Record event creation
    pub fn record_event_created(&self) {
        self.events_created.inc();
    }

    /// Record a primary sale of `amount` tickets
    pub fn record_primary_sale(&self, amount: u64) {
        self.primary_tickets_sold.inc_by(amount);
    }

    /// Record a resale of `amount` tickets
    pub fn record_resale(&self, amount: u64) {
        self.resale_tickets_sold.inc_by(amount);
    }

    /// Record a non-zero withdrawal
    pub fn record_withdrawal(&self) {
        self.withdrawals.inc();
    }

    /// Record a rejected operation
    pub fn record_rejection(&self) {
        self.rejected_operations.inc();
    }

    /// Record operation duration
    pub fn record_operation_duration(&self, duration_seconds: f64) {
        self.operation_duration.observe(duration_seconds);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.events_created.get(), 0);
        assert_eq!(metrics.primary_tickets_sold.get(), 0);
    }

    #[test]
    fn test_record_sales() {
        let metrics = Metrics::new().unwrap();
        metrics.record_primary_sale(4);
        metrics.record_primary_sale(3);
        metrics.record_resale(2);
        assert_eq!(metrics.primary_tickets_sold.get(), 7);
        assert_eq!(metrics.resale_tickets_sold.get(), 2);
    }

    #[test]
    fn test_each_collector_has_its_own_registry() {
        // Two collectors must not collide on metric names
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_event_created();
        assert_eq!(a.events_created.get(), 1);
        assert_eq!(b.events_created.get(), 0);
    }
}
