//! Retry policies for store fetches.
//!
//! Only reads are retried. Order inserts and updates go through exactly once,
//! so a timed-out insert never turns into a duplicate order.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use comanda_commerce::backend::{DataStore, StoreError};
use comanda_commerce::catalog::{Category, PersonalizationGroup, Product, Promotion};
use comanda_commerce::checkout::{AppSettings, Order, OrderPatch};
use comanda_commerce::OrderId;
use tracing::warn;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Fixed delay between retries.
    Fixed(Duration),
    /// Exponential backoff with base and max.
    Exponential {
        /// Initial delay.
        base: Duration,
        /// Maximum delay.
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(d) => *d,
            Self::Exponential { base, max } => {
                let multiplier = 2u32.saturating_pow(attempt);
                base.saturating_mul(multiplier).min(*max)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_secs(2),
        }
    }
}

/// How often and how patiently to retry a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: BackoffStrategy::default(),
        }
    }

    /// Create a policy with no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: BackoffStrategy::None,
        }
    }

    pub fn with_backoff(mut self, strategy: BackoffStrategy) -> Self {
        self.backoff = strategy;
        self
    }

    /// Whether a failed attempt (0-indexed) should be retried.
    pub fn should_retry(&self, error: &StoreError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Store wrapper that retries transient fetch failures.
pub struct RetryingStore {
    inner: Arc<dyn DataStore>,
    policy: RetryPolicy,
}

impl RetryingStore {
    pub fn new(inner: Arc<dyn DataStore>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn fetch<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, StoreError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if self.policy.should_retry(&e, attempt) => {
                    let delay = self.policy.backoff.delay_for_attempt(attempt);
                    warn!(operation, attempt, ?delay, error = %e, "store fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl DataStore for RetryingStore {
    async fn fetch_products(&self) -> Result<Vec<Product>, StoreError> {
        self.fetch("fetch_products", || self.inner.fetch_products()).await
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.fetch("fetch_categories", || self.inner.fetch_categories()).await
    }

    async fn fetch_personalization_groups(&self) -> Result<Vec<PersonalizationGroup>, StoreError> {
        self.fetch("fetch_personalization_groups", || {
            self.inner.fetch_personalization_groups()
        })
        .await
    }

    async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
        self.fetch("fetch_active_promotions", || self.inner.fetch_active_promotions())
            .await
    }

    async fn fetch_settings(&self) -> Result<AppSettings, StoreError> {
        self.fetch("fetch_settings", || self.inner.fetch_settings()).await
    }

    async fn insert_order(&self, order: &Order) -> Result<OrderId, StoreError> {
        self.inner.insert_order(order).await
    }

    async fn update_order(&self, id: &OrderId, patch: &OrderPatch) -> Result<Order, StoreError> {
        self.inner.update_order(id, patch).await
    }

    async fn fetch_active_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.fetch("fetch_active_orders", || self.inner.fetch_active_orders()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StoreDocument};
    use comanda_commerce::checkout::{CustomerInfo, Fulfillment, OrderStatus, PaymentStatus};
    use comanda_commerce::{Currency, Money};
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls of every kind with `error`.
    struct Flaky {
        inner: MemoryStore,
        failures: u32,
        error: StoreError,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(failures: u32, error: StoreError) -> Self {
            Self {
                inner: MemoryStore::new(StoreDocument::sample()),
                failures,
                error,
                calls: AtomicU32::new(0),
            }
        }

        fn gate(&self) -> Result<(), StoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(self.error.clone())
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DataStore for Flaky {
        async fn fetch_products(&self) -> Result<Vec<Product>, StoreError> {
            self.gate()?;
            self.inner.fetch_products().await
        }
        async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
            self.inner.fetch_categories().await
        }
        async fn fetch_personalization_groups(&self) -> Result<Vec<PersonalizationGroup>, StoreError> {
            self.inner.fetch_personalization_groups().await
        }
        async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
            self.inner.fetch_active_promotions().await
        }
        async fn fetch_settings(&self) -> Result<AppSettings, StoreError> {
            self.inner.fetch_settings().await
        }
        async fn insert_order(&self, order: &Order) -> Result<OrderId, StoreError> {
            self.gate()?;
            self.inner.insert_order(order).await
        }
        async fn update_order(&self, id: &OrderId, patch: &OrderPatch) -> Result<Order, StoreError> {
            self.inner.update_order(id, patch).await
        }
        async fn fetch_active_orders(&self) -> Result<Vec<Order>, StoreError> {
            self.inner.fetch_active_orders().await
        }
    }

    fn fast(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries).with_backoff(BackoffStrategy::Fixed(Duration::from_millis(1)))
    }

    fn order() -> Order {
        let now = chrono::Utc::now();
        Order {
            id: OrderId::new(""),
            customer: CustomerInfo::new("Ana").with_phone("555"),
            fulfillment: Fulfillment::TakeAway,
            items: vec![],
            status: OrderStatus::Pending,
            payment_method: "Cash".into(),
            payment_status: PaymentStatus::Pending,
            payment_proof: None,
            tip: None,
            subtotal: Money::zero(Currency::USD),
            shipping: Money::zero(Currency::USD),
            total: Money::zero(Currency::USD),
            comments: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_backoff_delays() {
        let exp = BackoffStrategy::Exponential {
            base: Duration::from_millis(100),
            max: Duration::from_millis(500),
        };
        assert_eq!(exp.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(exp.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(exp.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(exp.delay_for_attempt(40), Duration::from_millis(500));
        assert_eq!(BackoffStrategy::None.delay_for_attempt(5), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_transient_fetch_retried() {
        let flaky = Arc::new(Flaky::new(2, StoreError::Unavailable("timeout".into())));
        let store = RetryingStore::new(flaky.clone(), fast(2));

        assert!(!store.fetch_products().await.unwrap().is_empty());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let flaky = Arc::new(Flaky::new(5, StoreError::Unavailable("timeout".into())));
        let store = RetryingStore::new(flaky.clone(), fast(1));

        assert!(store.fetch_products().await.is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_errors_not_retried() {
        let flaky = Arc::new(Flaky::new(1, StoreError::Serialization("bad row".into())));
        let store = RetryingStore::new(flaky.clone(), fast(3));

        assert!(store.fetch_products().await.is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_insert_never_retried() {
        let flaky = Arc::new(Flaky::new(1, StoreError::Unavailable("timeout".into())));
        let store = RetryingStore::new(flaky.clone(), fast(3));

        assert!(store.insert_order(&order()).await.is_err());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
        assert!(flaky.inner.document().orders.is_empty());
    }
}
