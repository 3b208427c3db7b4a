//! Checkout and catalog refresh counters.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use comanda_commerce::backend::{ChangeEvent, ChangeListener, DispatchError};
use comanda_commerce::catalog::CatalogSnapshot;
use comanda_commerce::checkout::{CheckoutObserver, Order};
use comanda_commerce::error::CommerceError;
use serde::{Deserialize, Serialize};

/// Process-wide counters, shared through an `Arc`.
///
/// Plug into an `OrderComposer` as its observer, and wrap catalog listeners
/// in [`MeteredListener`] to count refreshes.
#[derive(Debug, Default)]
pub struct OrderMetrics {
    attempts: AtomicU64,
    rejected: AtomicU64,
    placed: AtomicU64,
    persist_failures: AtomicU64,
    dispatch_failures: AtomicU64,
    placed_total_cents: AtomicI64,
    catalog_refreshes: AtomicU64,
    catalog_errors: AtomicU64,
    order_events: AtomicU64,
}

/// Point-in-time copy of [`OrderMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderMetricsSnapshot {
    pub attempts: u64,
    pub rejected: u64,
    pub placed: u64,
    pub persist_failures: u64,
    pub dispatch_failures: u64,
    /// Sum of placed order totals in minor units. Mixed currencies are summed as-is.
    pub placed_total_cents: i64,
    pub catalog_refreshes: u64,
    pub catalog_errors: u64,
    pub order_events: u64,
}

impl OrderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn snapshot(&self) -> OrderMetricsSnapshot {
        OrderMetricsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            placed: self.placed.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            placed_total_cents: self.placed_total_cents.load(Ordering::Relaxed),
            catalog_refreshes: self.catalog_refreshes.load(Ordering::Relaxed),
            catalog_errors: self.catalog_errors.load(Ordering::Relaxed),
            order_events: self.order_events.load(Ordering::Relaxed),
        }
    }

    pub fn record_catalog_refresh(&self) {
        self.catalog_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_catalog_error(&self) {
        self.catalog_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_order_event(&self) {
        self.order_events.fetch_add(1, Ordering::Relaxed);
    }
}

impl CheckoutObserver for OrderMetrics {
    fn on_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    fn on_rejected(&self, _error: &CommerceError) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    fn on_placed(&self, order: &Order) {
        self.placed.fetch_add(1, Ordering::Relaxed);
        self.placed_total_cents
            .fetch_add(order.total.amount_cents, Ordering::Relaxed);
    }

    fn on_persist_failed(&self, _error: &CommerceError) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn on_dispatch_failed(&self, _error: &DispatchError) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }
}

impl OrderMetricsSnapshot {
    /// Format as JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Format as human-readable summary.
    pub fn to_summary(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Checkouts: {} attempted, {} placed, {} rejected",
            self.attempts, self.placed, self.rejected
        ));
        if self.persist_failures > 0 || self.dispatch_failures > 0 {
            lines.push(format!(
                "  Failures: {} persist, {} dispatch",
                self.persist_failures, self.dispatch_failures
            ));
        }
        lines.push(format!(
            "Catalog: {} refreshes, {} errors",
            self.catalog_refreshes, self.catalog_errors
        ));
        if self.order_events > 0 {
            lines.push(format!("Order events: {}", self.order_events));
        }

        lines.join("\n")
    }
}

/// Listener wrapper that counts what passes through it.
pub struct MeteredListener<L> {
    inner: L,
    metrics: Arc<OrderMetrics>,
}

impl<L: ChangeListener> MeteredListener<L> {
    pub fn new(inner: L, metrics: Arc<OrderMetrics>) -> Self {
        Self { inner, metrics }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: ChangeListener> ChangeListener for MeteredListener<L> {
    fn on_catalog_changed(&self, snapshot: CatalogSnapshot) {
        self.metrics.record_catalog_refresh();
        self.inner.on_catalog_changed(snapshot);
    }

    fn on_catalog_error(&self, error: &CommerceError) {
        self.metrics.record_catalog_error();
        self.inner.on_catalog_error(error);
    }

    fn on_order_event(&self, event: &ChangeEvent) {
        self.metrics.record_order_event();
        self.inner.on_order_event(event);
    }
}
