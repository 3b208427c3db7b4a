//! Restaurant settings consumed by checkout.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::checkout::OrderType;
use crate::money::{Currency, Money};

/// How delivery shipping is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShippingCostType {
    /// A configured flat cost added to the total.
    Fixed,
    /// Quoted to the customer later; contributes nothing to the stored total.
    #[default]
    ToBeQuoted,
    /// No shipping cost.
    Free,
}

/// Delivery shipping configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingPolicy {
    pub cost_type: ShippingCostType,
    /// Only used with [`ShippingCostType::Fixed`].
    #[serde(default)]
    pub fixed_cost: Money,
}

impl ShippingPolicy {
    /// Numeric shipping added to an order's total.
    ///
    /// Only fixed-cost delivery adds anything. "To be quoted" shipping is
    /// announced in the outbound message but never added to the stored total.
    pub fn charge_for(&self, order_type: OrderType, currency: Currency) -> Money {
        match (order_type, self.cost_type) {
            (OrderType::Delivery, ShippingCostType::Fixed) => {
                Money::new(self.fixed_cost.amount_cents.max(0), currency)
            }
            _ => Money::zero(currency),
        }
    }

    /// Human-readable shipping line for the outbound message.
    pub fn message_label(&self, currency: Currency) -> String {
        match self.cost_type {
            ShippingCostType::Fixed => self.charge_for(OrderType::Delivery, currency).display(),
            ShippingCostType::ToBeQuoted => "To be quoted".to_string(),
            ShippingCostType::Free => "Free".to_string(),
        }
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            cost_type: ShippingCostType::ToBeQuoted,
            fixed_cost: Money::default(),
        }
    }
}

/// Accepted payment methods per order type. An empty list accepts anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PaymentMethods {
    #[serde(default)]
    pub dine_in: Vec<String>,
    #[serde(default)]
    pub take_away: Vec<String>,
    #[serde(default)]
    pub delivery: Vec<String>,
}

impl PaymentMethods {
    /// Methods configured for an order type.
    pub fn for_type(&self, order_type: OrderType) -> &[String] {
        match order_type {
            OrderType::DineIn => &self.dine_in,
            OrderType::TakeAway => &self.take_away,
            OrderType::Delivery => &self.delivery,
        }
    }

    /// Check whether `method` may be used for `order_type` (case-insensitive).
    pub fn accepts(&self, order_type: OrderType, method: &str) -> bool {
        let methods = self.for_type(order_type);
        methods.is_empty() || methods.iter().any(|m| m.eq_ignore_ascii_case(method.trim()))
    }
}

/// Opening hours for one weekday. `close` before `open` spans midnight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningHours {
    pub day: Weekday,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl OpeningHours {
    fn covers(&self, now: NaiveDateTime) -> bool {
        let weekday = now.weekday();
        let time = now.time();
        if self.open <= self.close {
            weekday == self.day && time >= self.open && time < self.close
        } else {
            (weekday == self.day && time >= self.open)
                || (weekday == self.day.succ() && time < self.close)
        }
    }
}

/// How the admin console prints tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PrintingMethod {
    #[default]
    Browser,
    Thermal,
    Disabled,
}

fn default_order_types() -> Vec<OrderType> {
    vec![OrderType::DineIn, OrderType::TakeAway, OrderType::Delivery]
}

/// Read-mostly restaurant configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    pub restaurant_name: String,
    #[serde(default)]
    pub currency: Currency,
    /// Destination for outbound order messages (e.g. a phone number).
    #[serde(default)]
    pub messaging_destination: String,
    #[serde(default)]
    pub shipping: ShippingPolicy,
    #[serde(default)]
    pub payment_methods: PaymentMethods,
    /// Empty means no schedule is published; the restaurant counts as open.
    #[serde(default)]
    pub schedules: Vec<OpeningHours>,
    #[serde(default)]
    pub printing_method: PrintingMethod,
    #[serde(default = "default_order_types")]
    pub enabled_order_types: Vec<OrderType>,
}

impl AppSettings {
    /// Check if an order type is offered.
    pub fn accepts_order_type(&self, order_type: OrderType) -> bool {
        self.enabled_order_types.contains(&order_type)
    }

    /// Informational opening-hours check at restaurant-local time.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        self.schedules.is_empty() || self.schedules.iter().any(|s| s.covers(now))
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            restaurant_name: "Restaurant".to_string(),
            currency: Currency::default(),
            messaging_destination: String::new(),
            shipping: ShippingPolicy::default(),
            payment_methods: PaymentMethods::default(),
            schedules: Vec::new(),
            printing_method: PrintingMethod::default(),
            enabled_order_types: default_order_types(),
        }
    }
}
