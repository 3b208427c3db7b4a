//! Time-bounded promotions.

use crate::ids::{ProductId, PromotionId};
use crate::money::{Currency, Money};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Discount granted by a promotion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value")]
pub enum PromotionDiscount {
    /// Percentage off the listed price (0.0 - 100.0).
    Percentage(f64),
    /// Flat amount off the listed price.
    FixedAmount(Money),
}

impl PromotionDiscount {
    /// Whether the discount can be applied to a price in `currency`.
    ///
    /// Negative or non-finite values never apply, and a fixed amount only
    /// applies to prices in its own currency.
    pub fn applies_in(&self, currency: Currency) -> bool {
        match self {
            PromotionDiscount::Percentage(percent) => percent.is_finite() && *percent >= 0.0,
            PromotionDiscount::FixedAmount(amount) => {
                amount.currency == currency && !amount.is_negative()
            }
        }
    }

    /// Amount taken off `price`, or `None` when the discount does not apply
    /// in the price's currency. May exceed the price; callers floor the result.
    pub fn amount_off(&self, price: &Money) -> Option<Money> {
        if !self.applies_in(price.currency) {
            return None;
        }
        Some(match self {
            PromotionDiscount::Percentage(percent) => price.percentage(*percent),
            PromotionDiscount::FixedAmount(amount) => *amount,
        })
    }

    /// Short label for menus and messages ("20% off", "$1.00 off").
    pub fn label(&self) -> String {
        match self {
            PromotionDiscount::Percentage(percent) => format!("{}% off", percent),
            PromotionDiscount::FixedAmount(amount) => format!("{} off", amount.display()),
        }
    }
}

/// Which products a promotion may apply to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "product_ids")]
pub enum PromotionScope {
    /// Every product on the menu.
    AllProducts,
    /// Only the listed products.
    SpecificProducts(Vec<ProductId>),
}

impl PromotionScope {
    /// Check if the scope covers a product.
    pub fn includes(&self, product_id: &ProductId) -> bool {
        match self {
            PromotionScope::AllProducts => true,
            PromotionScope::SpecificProducts(ids) => ids.contains(product_id),
        }
    }
}

/// A discount rule active over an optional date window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Promotion {
    /// Unique promotion identifier.
    pub id: PromotionId,
    /// Display name.
    pub name: String,
    /// Discount granted.
    pub discount: PromotionDiscount,
    /// Products covered.
    pub scope: PromotionScope,
    /// First day the promotion applies (from 00:00:00).
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day the promotion applies (through 23:59:59).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Admin on/off switch.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Creation time; the order callers sort promotions by.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Promotion {
    /// Create an always-on promotion.
    pub fn new(
        id: impl Into<PromotionId>,
        name: impl Into<String>,
        discount: PromotionDiscount,
        scope: PromotionScope,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            discount,
            scope,
            start_date: None,
            end_date: None,
            active: true,
            created_at: None,
        }
    }

    /// Restrict the promotion to a date window (both ends inclusive).
    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Check if the promotion applies at `now` (restaurant-local time).
    ///
    /// The end date covers the whole day: a promotion ending on D applies up to
    /// and including D 23:59:59 and stops at the next midnight.
    pub fn is_active_at(&self, now: NaiveDateTime) -> bool {
        if !self.active {
            return false;
        }
        let today = now.date();
        if let Some(start) = self.start_date {
            if today < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if today > end {
                return false;
            }
        }
        true
    }

    /// Check if the promotion covers a product.
    pub fn applies_to(&self, product_id: &ProductId) -> bool {
        self.scope.includes(product_id)
    }
}
