//! Admin-side order handling: the live board of active orders and the
//! status/payment operations staff perform on them.

use tracing::{debug, info};

use crate::backend::{ChangeEvent, DataStore};
use crate::checkout::{Order, OrderPatch, OrderStatus};
use crate::error::CommerceError;
use crate::ids::OrderId;

/// Active orders, oldest first.
///
/// Terminal orders drop off the board as soon as an update reports them.
#[derive(Debug, Clone, Default)]
pub struct OrderBoard {
    orders: Vec<Order>,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the board from the store.
    pub async fn load(store: &dyn DataStore) -> Result<Self, CommerceError> {
        let orders = store
            .fetch_active_orders()
            .await
            .map_err(|e| CommerceError::Persistence(format!("could not load orders: {}", e)))?;
        let mut board = Self::new();
        board.replace(orders);
        Ok(board)
    }

    /// Replace the whole board with a fresh fetch.
    pub fn replace(&mut self, orders: Vec<Order>) {
        self.orders = orders.into_iter().filter(Order::is_active).collect();
        self.sort();
    }

    /// Merge a pushed change. Returns true if the board changed.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        match event {
            ChangeEvent::CatalogChanged => false,
            ChangeEvent::OrderInserted(order) | ChangeEvent::OrderUpdated(order) => {
                self.upsert(order.clone())
            }
        }
    }

    /// Insert or replace one order by id.
    pub fn upsert(&mut self, order: Order) -> bool {
        let existing = self.orders.iter().position(|o| o.id == order.id);
        match (existing, order.is_active()) {
            (Some(pos), true) => {
                if self.orders[pos] == order {
                    return false;
                }
                self.orders[pos] = order;
            }
            (Some(pos), false) => {
                debug!(order_id = %order.id, status = %order.status, "order left the board");
                self.orders.remove(pos);
            }
            (None, true) => self.orders.push(order),
            (None, false) => return false,
        }
        self.sort();
        true
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    /// Orders currently in `status`.
    pub fn with_status(&self, status: OrderStatus) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(move |o| o.status == status)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn sort(&mut self) {
        self.orders
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    }
}

/// Status and payment operations on stored orders.
pub struct OrderAdmin<'a> {
    store: &'a dyn DataStore,
}

impl<'a> OrderAdmin<'a> {
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// Move an order to `to` if the transition is allowed.
    pub async fn set_status(&self, order: &Order, to: OrderStatus) -> Result<Order, CommerceError> {
        if !order.status.can_transition_to(to, order.order_type()) {
            return Err(CommerceError::InvalidStatusTransition {
                from: order.status.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        let updated = self.patch(&order.id, &OrderPatch::status(to)).await?;
        info!(order_id = %order.id, from = %order.status, to = %to, "order status changed");
        Ok(updated)
    }

    /// Move an order one step forward.
    pub async fn advance(&self, order: &Order) -> Result<Order, CommerceError> {
        let next = order.status.next_for(order.order_type()).ok_or_else(|| {
            CommerceError::InvalidStatusTransition {
                from: order.status.as_str().to_string(),
                to: "next".to_string(),
            }
        })?;
        self.set_status(order, next).await
    }

    pub async fn cancel(&self, order: &Order) -> Result<Order, CommerceError> {
        self.set_status(order, OrderStatus::Cancelled).await
    }

    /// Record the claimed payment as received.
    pub async fn mark_paid(&self, order: &Order, proof: Option<String>) -> Result<Order, CommerceError> {
        let patch = OrderPatch {
            payment_proof: proof,
            ..OrderPatch::paid()
        };
        let updated = self.patch(&order.id, &patch).await?;
        info!(order_id = %order.id, "order marked paid");
        Ok(updated)
    }

    async fn patch(&self, id: &OrderId, patch: &OrderPatch) -> Result<Order, CommerceError> {
        self.store
            .update_order(id, patch)
            .await
            .map_err(CommerceError::from_write)
    }
}
