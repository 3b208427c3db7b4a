//! Cart and line item types.

use crate::cart::{OrderableSnapshot, SelectedOption};
use crate::error::CommerceError;
use crate::ids::{LineItemId, ProductId};
use crate::money::{Currency, Money};
use crate::pricing;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line item.
pub const MAX_QUANTITY_PER_ITEM: i64 = 999;

/// A customer's in-progress order.
///
/// Line items keep their add order. Adding the same configured product twice
/// yields two independent lines, each with its own comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Cart {
    /// Items in the cart, in the order they were added.
    pub items: Vec<CartLineItem>,
    /// Cart currency.
    pub currency: Currency,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Append a new line item.
    ///
    /// The snapshot must already carry the promotion-resolved unit price.
    /// A quantity below 1 is treated as 1.
    pub fn add(
        &mut self,
        snapshot: OrderableSnapshot,
        quantity: i64,
        comment: Option<String>,
    ) -> Result<LineItemId, CommerceError> {
        if snapshot.unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: snapshot.unit_price.currency.code().to_string(),
            });
        }

        let quantity = quantity.max(1);
        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::Validation(format!(
                "quantity {} exceeds maximum allowed ({})",
                quantity, MAX_QUANTITY_PER_ITEM
            )));
        }

        let item = CartLineItem::new(snapshot, quantity, comment)?;
        let id = item.id.clone();
        self.items.push(item);
        Ok(id)
    }

    /// Remove a line item. Returns false if it was not in the cart.
    pub fn remove(&mut self, line_item_id: &LineItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != line_item_id);
        self.items.len() < len_before
    }

    /// Set a line's quantity; a quantity of 0 or less removes the line.
    ///
    /// Returns false if the line was not in the cart.
    pub fn set_quantity(
        &mut self,
        line_item_id: &LineItemId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove(line_item_id));
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::Validation(format!(
                "quantity {} exceeds maximum allowed ({})",
                quantity, MAX_QUANTITY_PER_ITEM
            )));
        }

        match self.items.iter_mut().find(|i| &i.id == line_item_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace a line's free-text note. Blank text clears it.
    pub fn set_comment(&mut self, line_item_id: &LineItemId, text: impl Into<String>) -> bool {
        match self.items.iter_mut().find(|i| &i.id == line_item_id) {
            Some(item) => {
                item.comment = normalize_comment(Some(text.into()));
                true
            }
            None => false,
        }
    }

    /// Clear all items from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Cart total: Σ resolved unit price × quantity.
    pub fn total(&self) -> Result<Money, CommerceError> {
        pricing::cart_total(&self.items, self.currency)
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Get number of lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by ID.
    pub fn get(&self, line_item_id: &LineItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.id == line_item_id)
    }
}

/// One configured, priced, quantified entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    /// Synthetic per-line identifier, distinct from the product id.
    pub id: LineItemId,
    /// Product ID.
    pub product_id: ProductId,
    /// Product name when added.
    pub name: String,
    /// Promotion-resolved unit price when added, before options.
    pub base_unit_price: Money,
    /// Options chosen, with the prices captured at selection time.
    pub options: Vec<SelectedOption>,
    /// base_unit_price + Σ option prices.
    pub unit_price: Money,
    /// Quantity, at least 1.
    pub quantity: i64,
    /// Free-text note for the kitchen.
    pub comment: Option<String>,
}

impl CartLineItem {
    /// Create a new line item from a snapshot.
    pub fn new(
        snapshot: OrderableSnapshot,
        quantity: i64,
        comment: Option<String>,
    ) -> Result<Self, CommerceError> {
        let unit_price = pricing::unit_price_with_options(snapshot.unit_price, &snapshot.options)?;
        Ok(Self {
            id: LineItemId::generate(),
            product_id: snapshot.product_id,
            name: snapshot.name,
            base_unit_price: snapshot.unit_price,
            options: snapshot.options,
            unit_price,
            quantity: quantity.max(1),
            comment: normalize_comment(comment),
        })
    }

    /// unit_price × quantity.
    pub fn total(&self) -> Result<Money, CommerceError> {
        self.unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{OptionId, PersonalizationId};

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn snapshot(id: &str, cents: i64, options: Vec<SelectedOption>) -> OrderableSnapshot {
        OrderableSnapshot {
            product_id: ProductId::new(id),
            name: format!("Product {}", id),
            unit_price: usd(cents),
            listed_price: usd(cents),
            promotion_name: None,
            options,
        }
    }

    fn option(id: &str, cents: i64) -> SelectedOption {
        SelectedOption {
            group_id: PersonalizationId::new("g"),
            option_id: OptionId::new(id),
            name: id.to_string(),
            price: usd(cents),
        }
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new(Currency::USD);
        assert!(cart.is_empty());
        assert_eq!(cart.total().unwrap().amount_cents, 0);
    }

    #[test]
    fn test_add_never_merges() {
        let mut cart = Cart::new(Currency::USD);
        let a = cart.add(snapshot("p1", 400, vec![]), 1, Some("no salt".into())).unwrap();
        let b = cart.add(snapshot("p1", 400, vec![]), 1, None).unwrap();

        assert_ne!(a, b);
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.get(&a).unwrap().comment.as_deref(), Some("no salt"));
        assert!(cart.get(&b).unwrap().comment.is_none());
    }

    #[test]
    fn test_add_clamps_quantity() {
        let mut cart = Cart::new(Currency::USD);
        let id = cart.add(snapshot("p1", 400, vec![]), 0, None).unwrap();
        assert_eq!(cart.get(&id).unwrap().quantity, 1);
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::new(Currency::USD);
        let result = cart.add(snapshot("p1", 400, vec![]), MAX_QUANTITY_PER_ITEM + 1, None);
        assert!(matches!(result, Err(CommerceError::Validation(_))));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let mut cart = Cart::new(Currency::EUR);
        let result = cart.add(snapshot("p1", 400, vec![]), 1, None);
        assert!(matches!(result, Err(CommerceError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::new(Currency::USD);
        let id = cart.add(snapshot("p1", 400, vec![]), 1, None).unwrap();

        assert!(cart.set_quantity(&id, 5).unwrap());
        assert_eq!(cart.item_count(), 5);

        assert!(cart.set_quantity(&id, 0).unwrap());
        assert!(cart.is_empty());

        assert!(!cart.set_quantity(&id, 3).unwrap());
        assert!(!cart.remove(&id));
    }

    #[test]
    fn test_set_comment() {
        let mut cart = Cart::new(Currency::USD);
        let id = cart.add(snapshot("p1", 400, vec![]), 1, None).unwrap();

        assert!(cart.set_comment(&id, "  extra hot "));
        assert_eq!(cart.get(&id).unwrap().comment.as_deref(), Some("extra hot"));

        assert!(cart.set_comment(&id, "   "));
        assert!(cart.get(&id).unwrap().comment.is_none());

        assert!(!cart.set_comment(&LineItemId::new("missing"), "x"));
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new(Currency::USD);
        cart.add(snapshot("p1", 400, vec![]), 2, None).unwrap();
        cart.add(snapshot("p2", 300, vec![option("cheese", 50)]), 1, None).unwrap();

        assert_eq!(cart.total().unwrap().amount_cents, 1150);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_cart_total_matches_line_totals() {
        let mut cart = Cart::new(Currency::USD);
        cart.add(snapshot("p1", 799, vec![option("a", 25), option("b", 130)]), 3, None).unwrap();
        cart.add(snapshot("p2", 0, vec![option("c", 99)]), 7, None).unwrap();
        cart.add(snapshot("p3", 1250, vec![]), 1, None).unwrap();

        let recomputed: i64 = cart
            .items
            .iter()
            .map(|i| {
                pricing::line_total(i.base_unit_price, &i.options, i.quantity)
                    .unwrap()
                    .amount_cents
            })
            .sum();
        assert_eq!(cart.total().unwrap().amount_cents, recomputed);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new(Currency::USD);
        cart.add(snapshot("p1", 400, vec![]), 1, None).unwrap();
        cart.clear();
        assert!(cart.is_empty());
    }
}
