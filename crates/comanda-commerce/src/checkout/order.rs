//! Order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{CartLineItem, SelectedOption};
use crate::checkout::{CustomerInfo, Fulfillment};
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId};
use crate::money::Money;

/// Fulfillment channel of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Served at a table in the restaurant.
    DineIn,
    /// Picked up at the counter.
    TakeAway,
    /// Sent to a customer address.
    Delivery,
}

impl OrderType {
    /// Wire name, as stored and accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::TakeAway => "take_away",
            OrderType::Delivery => "delivery",
        }
    }

    /// Human-readable name for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine in",
            OrderType::TakeAway => "Take away",
            OrderType::Delivery => "Delivery",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderType {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "dine_in" | "dinein" | "table" => Ok(OrderType::DineIn),
            "take_away" | "takeaway" | "pickup" => Ok(OrderType::TakeAway),
            "delivery" => Ok(OrderType::Delivery),
            other => Err(CommerceError::Validation(format!("unknown order type: {}", other))),
        }
    }
}

/// Kitchen-side order status.
///
/// `Pending → Confirmed → Preparing → Ready → (Delivering →) Completed`.
/// `Cancelled` is reachable from every non-terminal state and absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Placed by the customer, not yet seen by staff.
    #[default]
    Pending,
    /// Accepted by staff.
    Confirmed,
    /// In the kitchen.
    Preparing,
    /// Ready to serve, hand over or send out.
    Ready,
    /// On its way to the customer. Only used by delivery orders.
    Delivering,
    /// Served or delivered.
    Completed,
    /// Cancelled by staff.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// The next forward status for an order of the given type.
    pub fn next_for(&self, order_type: OrderType) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready if order_type == OrderType::Delivery => {
                Some(OrderStatus::Delivering)
            }
            OrderStatus::Ready | OrderStatus::Delivering => Some(OrderStatus::Completed),
            OrderStatus::Completed | OrderStatus::Cancelled => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::Ready => 3,
            OrderStatus::Delivering => 4,
            OrderStatus::Completed => 5,
            OrderStatus::Cancelled => 6,
        }
    }

    /// Check whether an admin may move an order from `self` to `to`.
    ///
    /// Forward moves may skip steps; nothing moves backwards or out of a
    /// terminal state.
    pub fn can_transition_to(&self, to: OrderStatus, order_type: OrderType) -> bool {
        if self.is_terminal() || *self == to {
            return false;
        }
        match to {
            OrderStatus::Cancelled => true,
            OrderStatus::Delivering => {
                order_type == OrderType::Delivery && self.rank() < to.rank()
            }
            _ => self.rank() < to.rank(),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "delivering" => Ok(OrderStatus::Delivering),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(CommerceError::Validation(format!("unknown order status: {}", other))),
        }
    }
}

/// Claimed payment state. No payment is processed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    /// Not yet confirmed by staff.
    #[default]
    Pending,
    /// Marked as paid by staff.
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// A line item frozen into an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product the line was made from.
    pub product_id: ProductId,
    /// Product name at the time of ordering.
    pub name: String,
    /// Unit price including options.
    pub unit_price: Money,
    /// Quantity ordered (at least 1).
    pub quantity: i64,
    /// Personalization picks, as priced when added.
    pub options: Vec<SelectedOption>,
    /// Per-line note for the kitchen.
    pub comment: Option<String>,
    /// `unit_price × quantity`.
    pub total: Money,
}

impl OrderItem {
    /// Copy a cart line into an order item.
    pub fn from_line(line: &CartLineItem) -> Result<Self, CommerceError> {
        Ok(Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            options: line.options.clone(),
            comment: line.comment.clone(),
            total: line.total()?,
        })
    }
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Assigned by the data store on insert; empty before that.
    pub id: OrderId,
    /// Who placed the order.
    pub customer: CustomerInfo,
    /// Table, pickup or delivery address.
    pub fulfillment: Fulfillment,
    /// Frozen cart lines.
    pub items: Vec<OrderItem>,
    /// Kitchen-side status.
    pub status: OrderStatus,
    /// Payment method chosen by the customer.
    pub payment_method: String,
    /// Claimed payment state.
    pub payment_status: PaymentStatus,
    /// Reference to a payment proof (e.g. an uploaded receipt).
    pub payment_proof: Option<String>,
    /// Tip, when one was left.
    pub tip: Option<Money>,
    /// Sum of item totals.
    pub subtotal: Money,
    /// Numeric shipping included in `total`.
    pub shipping: Money,
    /// subtotal + shipping + tip.
    pub total: Money,
    /// General note for the whole order.
    pub comments: Option<String>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Last admin change.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Order type implied by the fulfillment.
    pub fn order_type(&self) -> OrderType {
        self.fulfillment.order_type()
    }

    /// Short reference shown to customers and staff.
    pub fn number(&self) -> String {
        self.id.short_ref()
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether the order still shows on the board.
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Apply an admin patch after checking the status transition.
    pub fn apply_patch(&mut self, patch: &OrderPatch, now: DateTime<Utc>) -> Result<(), CommerceError> {
        if let Some(status) = patch.status {
            if !self.status.can_transition_to(status, self.order_type()) {
                return Err(CommerceError::InvalidStatusTransition {
                    from: self.status.as_str().to_string(),
                    to: status.as_str().to_string(),
                });
            }
            self.status = status;
        }
        if let Some(payment_status) = patch.payment_status {
            self.payment_status = payment_status;
        }
        if let Some(proof) = &patch.payment_proof {
            self.payment_proof = Some(proof.clone());
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Partial update sent by the admin side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderPatch {
    /// New status; checked against the current one.
    pub status: Option<OrderStatus>,
    /// New payment state.
    pub payment_status: Option<PaymentStatus>,
    /// Payment proof reference to record.
    pub payment_proof: Option<String>,
}

impl OrderPatch {
    /// Patch that only moves the status.
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Patch that marks the order as paid.
    pub fn paid() -> Self {
        Self {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.payment_status.is_none() && self.payment_proof.is_none()
    }
}
