//! Order composer.
//!
//! Turns a cart plus a checkout form into a persisted order and an outbound
//! message. The message is only dispatched after the store has accepted the
//! order; a failed insert leaves the cart untouched.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::backend::{DataStore, DispatchError, MessageDispatch};
use crate::cart::Cart;
use crate::checkout::{format_order_message, AppSettings, CheckoutForm, Order, OrderItem};
use crate::checkout::{OrderStatus, PaymentStatus};
use crate::error::CommerceError;
use crate::ids::OrderId;
use crate::money::Money;
use crate::pricing::OrderTotals;

/// Hooks into the placement pipeline.
pub trait CheckoutObserver: Send + Sync {
    /// A placement was requested.
    fn on_attempt(&self) {}

    /// The form or cart was rejected before anything was written.
    fn on_rejected(&self, _error: &CommerceError) {}

    /// The order was persisted.
    fn on_placed(&self, _order: &Order) {}

    /// The store refused the order.
    fn on_persist_failed(&self, _error: &CommerceError) {}

    /// The order was persisted but the message could not be handed off.
    fn on_dispatch_failed(&self, _error: &DispatchError) {}
}

/// Outcome of a successful placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order: Order,
    /// The text handed to the messaging channel.
    pub message: String,
    /// Set when the order was saved but the message could not be sent.
    pub dispatch_warning: Option<String>,
}

/// Places orders against a data store and a messaging channel.
pub struct OrderComposer<'a> {
    store: &'a dyn DataStore,
    dispatch: &'a dyn MessageDispatch,
    observer: Option<&'a dyn CheckoutObserver>,
}

impl<'a> OrderComposer<'a> {
    pub fn new(store: &'a dyn DataStore, dispatch: &'a dyn MessageDispatch) -> Self {
        Self {
            store,
            dispatch,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn CheckoutObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Compute the payable breakdown for a cart without placing anything.
    pub fn quote(
        cart: &Cart,
        form: &CheckoutForm,
        settings: &AppSettings,
    ) -> Result<OrderTotals, CommerceError> {
        let currency = settings.currency;
        if cart.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: cart.currency.code().to_string(),
            });
        }
        let subtotal = cart.total()?;
        let shipping = settings.shipping.charge_for(form.order_type(), currency);
        let tip = if form.tip.is_zero() {
            Money::zero(currency)
        } else {
            form.tip
        };
        OrderTotals::new(subtotal, shipping, tip)
    }

    /// Build the pending order record for a cart. Nothing is written.
    pub fn compose(
        cart: &Cart,
        form: &CheckoutForm,
        settings: &AppSettings,
        now: DateTime<Utc>,
    ) -> Result<Order, CommerceError> {
        if cart.is_empty() {
            return Err(CommerceError::Validation("cart is empty".into()));
        }
        form.validate(settings)?;
        let totals = Self::quote(cart, form, settings)?;

        let items = cart
            .items
            .iter()
            .map(OrderItem::from_line)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order {
            id: OrderId::new(""),
            customer: form.customer.clone(),
            fulfillment: form.fulfillment.clone(),
            items,
            status: OrderStatus::Pending,
            payment_method: form.payment_method.trim().to_string(),
            payment_status: PaymentStatus::Pending,
            payment_proof: form.payment_proof.clone(),
            tip: totals.tip.is_positive().then_some(totals.tip),
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            total: totals.grand_total,
            comments: general_comments(form.note.as_deref(), totals.tip),
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate, persist, notify and clear the cart.
    ///
    /// On any error the cart is left as it was and nothing is dispatched.
    pub async fn place_order(
        &self,
        cart: &mut Cart,
        form: &CheckoutForm,
        settings: &AppSettings,
        now: DateTime<Utc>,
    ) -> Result<PlacedOrder, CommerceError> {
        self.notify(|o| o.on_attempt());

        let mut order = match Self::compose(cart, form, settings, now) {
            Ok(order) => order,
            Err(e) => {
                debug!(error = %e, "order rejected before persisting");
                self.notify(|o| o.on_rejected(&e));
                return Err(e);
            }
        };

        let order_id = match self.store.insert_order(&order).await {
            Ok(id) => id,
            Err(e) => {
                let e = CommerceError::Persistence(e.to_string());
                error!(error = %e, order_type = %order.order_type(), "order insert failed");
                self.notify(|o| o.on_persist_failed(&e));
                return Err(e);
            }
        };
        order.id = order_id.clone();

        info!(
            order_id = %order_id,
            order_type = %order.order_type(),
            items = order.item_count(),
            grand_total = %order.total,
            "order placed"
        );
        self.notify(|o| o.on_placed(&order));

        let message = format_order_message(&order, settings);
        let dispatch_warning = match self
            .dispatch
            .dispatch(&settings.messaging_destination, &message)
            .await
        {
            Ok(()) => None,
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "order saved but message not sent");
                self.notify(|o| o.on_dispatch_failed(&e));
                Some(CommerceError::Dispatch(e.to_string()).to_string())
            }
        };

        cart.clear();

        Ok(PlacedOrder {
            order_id,
            order,
            message,
            dispatch_warning,
        })
    }

    fn notify(&self, f: impl FnOnce(&dyn CheckoutObserver)) {
        if let Some(observer) = self.observer {
            f(observer);
        }
    }
}

/// Customer note with the tip annotated when there is one.
fn general_comments(note: Option<&str>, tip: Money) -> Option<String> {
    let note = note.map(str::trim).filter(|n| !n.is_empty());
    let tip_note = tip.is_positive().then(|| format!("Tip: {}", tip));
    match (note, tip_note) {
        (Some(note), Some(tip_note)) => Some(format!("{} | {}", note, tip_note)),
        (Some(note), None) => Some(note.to_string()),
        (None, tip_note) => tip_note,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StoreError;
    use crate::cart::OrderableSnapshot;
    use crate::catalog::{Category, PersonalizationGroup, Product, Promotion};
    use crate::checkout::{CustomerInfo, DeliveryAddress, Fulfillment, OrderPatch, ShippingCostType, ShippingPolicy};
    use crate::ids::ProductId;
    use crate::money::Currency;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    #[derive(Default)]
    struct FakeStore {
        fail_insert: bool,
        inserted: Mutex<Vec<Order>>,
    }

    #[async_trait]
    impl DataStore for FakeStore {
        async fn fetch_products(&self) -> Result<Vec<Product>, StoreError> {
            Ok(vec![])
        }
        async fn fetch_categories(&self) -> Result<Vec<Category>, StoreError> {
            Ok(vec![])
        }
        async fn fetch_personalization_groups(&self) -> Result<Vec<PersonalizationGroup>, StoreError> {
            Ok(vec![])
        }
        async fn fetch_active_promotions(&self) -> Result<Vec<Promotion>, StoreError> {
            Ok(vec![])
        }
        async fn fetch_settings(&self) -> Result<AppSettings, StoreError> {
            Ok(AppSettings::default())
        }
        async fn insert_order(&self, order: &Order) -> Result<OrderId, StoreError> {
            if self.fail_insert {
                return Err(StoreError::Unavailable("connection reset".into()));
            }
            self.inserted.lock().unwrap().push(order.clone());
            Ok(OrderId::new("ord-42"))
        }
        async fn update_order(&self, id: &OrderId, _patch: &OrderPatch) -> Result<Order, StoreError> {
            Err(StoreError::NotFound(id.to_string()))
        }
        async fn fetch_active_orders(&self) -> Result<Vec<Order>, StoreError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct FakeDispatch {
        fail: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl MessageDispatch for FakeDispatch {
        async fn dispatch(&self, destination: &str, payload: &str) -> Result<(), DispatchError> {
            if self.fail {
                return Err(DispatchError::Unavailable("no handler".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((destination.to_string(), payload.to_string()));
            Ok(())
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new(Currency::USD);
        for (id, cents, qty) in [("p1", 400, 2), ("p2", 350, 1)] {
            cart.add(
                OrderableSnapshot {
                    product_id: ProductId::new(id),
                    name: id.to_string(),
                    unit_price: usd(cents),
                    listed_price: usd(cents),
                    promotion_name: None,
                    options: vec![],
                },
                qty,
                None,
            )
            .unwrap();
        }
        cart
    }

    fn settings() -> AppSettings {
        AppSettings {
            messaging_destination: "+15550100".into(),
            shipping: ShippingPolicy {
                cost_type: ShippingCostType::Fixed,
                fixed_cost: usd(200),
            },
            ..AppSettings::default()
        }
    }

    fn delivery_form(tip: i64) -> CheckoutForm {
        CheckoutForm::new(
            CustomerInfo::new("Ana").with_phone("555-0101"),
            Fulfillment::Delivery {
                address: DeliveryAddress::new("Calle 5 #12"),
            },
            "Cash",
        )
        .with_tip(usd(tip))
    }

    #[tokio::test]
    async fn test_place_delivery_order() {
        let store = FakeStore::default();
        let dispatch = FakeDispatch::default();
        let composer = OrderComposer::new(&store, &dispatch);
        let mut cart = cart();

        let placed = composer
            .place_order(&mut cart, &delivery_form(100), &settings(), Utc::now())
            .await
            .unwrap();

        assert_eq!(placed.order_id.as_str(), "ord-42");
        assert_eq!(placed.order.total.amount_cents, 1450);
        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(placed.order.comments.as_deref(), Some("Tip: $1.00"));
        assert!(placed.dispatch_warning.is_none());
        assert!(cart.is_empty());

        let sent = dispatch.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+15550100");
        assert_eq!(sent[0].1, placed.message);
    }

    #[tokio::test]
    async fn test_persist_failure_does_not_dispatch() {
        let store = FakeStore {
            fail_insert: true,
            ..Default::default()
        };
        let dispatch = FakeDispatch::default();
        let composer = OrderComposer::new(&store, &dispatch);
        let mut cart = cart();

        let result = composer
            .place_order(&mut cart, &delivery_form(0), &settings(), Utc::now())
            .await;

        assert!(matches!(result, Err(CommerceError::Persistence(_))));
        assert!(dispatch.sent.lock().unwrap().is_empty());
        assert_eq!(cart.item_count(), 3);
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_a_warning() {
        let store = FakeStore::default();
        let dispatch = FakeDispatch {
            fail: true,
            ..Default::default()
        };
        let composer = OrderComposer::new(&store, &dispatch);
        let mut cart = cart();

        let placed = composer
            .place_order(&mut cart, &delivery_form(0), &settings(), Utc::now())
            .await
            .unwrap();

        assert!(placed.dispatch_warning.is_some());
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let store = FakeStore::default();
        let dispatch = FakeDispatch::default();
        let composer = OrderComposer::new(&store, &dispatch);
        let mut cart = Cart::new(Currency::USD);

        let result = composer
            .place_order(&mut cart, &delivery_form(0), &settings(), Utc::now())
            .await;
        assert!(matches!(result, Err(CommerceError::Validation(_))));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_quote_excludes_quoted_shipping() {
        let mut settings = settings();
        settings.shipping.cost_type = ShippingCostType::ToBeQuoted;
        let totals = OrderComposer::quote(&cart(), &delivery_form(0), &settings).unwrap();
        assert_eq!(totals.shipping.amount_cents, 0);
        assert_eq!(totals.grand_total.amount_cents, 1150);
    }

    #[test]
    fn test_general_comments() {
        assert_eq!(general_comments(None, usd(0)), None);
        assert_eq!(general_comments(Some("  "), usd(0)), None);
        assert_eq!(
            general_comments(Some("ring twice"), usd(150)).as_deref(),
            Some("ring twice | Tip: $1.50")
        );
    }
}
