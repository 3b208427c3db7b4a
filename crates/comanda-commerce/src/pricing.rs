//! Pricing engine.
//!
//! Pure functions: promotion resolution for a product, line totals with
//! personalization deltas, cart totals and the final order breakdown.
//!
//! # Promotion precedence
//!
//! When several active promotions cover the same product, the first one in the
//! slice wins. There is no priority field; callers must pass promotions in a
//! stable order (the store returns them by creation time). At most one
//! promotion is applied per product. A promotion whose discount cannot apply
//! in the product's currency (or is negative) is skipped, not matched.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cart::{CartLineItem, SelectedOption};
use crate::catalog::{Product, Promotion};
use crate::error::CommerceError;
use crate::money::{Currency, Money};

/// Result of pricing a product at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedProduct<'a> {
    /// Listed price from the catalog.
    pub listed_price: Money,
    /// Price after the applied promotion, never below zero.
    pub price: Money,
    /// The promotion that produced `price`, if any.
    pub promotion: Option<&'a Promotion>,
}

impl PricedProduct<'_> {
    /// Whether a promotion lowered the price.
    pub fn is_discounted(&self) -> bool {
        self.promotion.is_some() && self.price != self.listed_price
    }

    /// Amount saved per unit.
    pub fn savings(&self) -> Money {
        Money::new(
            self.listed_price.amount_cents - self.price.amount_cents,
            self.listed_price.currency,
        )
    }
}

/// Effective unit price of `product` given the promotion set at `now`.
pub fn price_of<'a>(
    product: &Product,
    promotions: &'a [Promotion],
    now: NaiveDateTime,
) -> PricedProduct<'a> {
    let listed_price = product.price;
    let applied = promotions.iter().find_map(|promo| {
        if !promo.is_active_at(now) || !promo.applies_to(&product.id) {
            return None;
        }
        promo.discount.amount_off(&listed_price).map(|off| (promo, off))
    });

    let (promotion, price) = match applied {
        Some((promo, off)) => {
            let price = Money::new(
                listed_price.amount_cents.saturating_sub(off.amount_cents),
                listed_price.currency,
            )
            .floor_zero();
            (Some(promo), price)
        }
        None => (None, listed_price),
    };

    PricedProduct {
        listed_price,
        price,
        promotion,
    }
}

/// Unit price plus every selected option's delta.
pub fn unit_price_with_options(
    base_unit_price: Money,
    options: &[SelectedOption],
) -> Result<Money, CommerceError> {
    options.iter().try_fold(base_unit_price, |acc, option| {
        if option.price.currency != acc.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: acc.currency.code().to_string(),
                got: option.price.currency.code().to_string(),
            });
        }
        acc.try_add(&option.price).ok_or(CommerceError::Overflow)
    })
}

/// `(base + Σ options) × quantity`. A quantity below 1 is treated as 1.
pub fn line_total(
    base_unit_price: Money,
    options: &[SelectedOption],
    quantity: i64,
) -> Result<Money, CommerceError> {
    let quantity = quantity.max(1);
    unit_price_with_options(base_unit_price, options)?
        .try_multiply(quantity)
        .ok_or(CommerceError::Overflow)
}

/// Sum of each line's resolved unit price times its quantity.
pub fn cart_total(items: &[CartLineItem], currency: Currency) -> Result<Money, CommerceError> {
    items.iter().try_fold(Money::zero(currency), |acc, item| {
        let line = item.total()?;
        if line.currency != currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: currency.code().to_string(),
                got: line.currency.code().to_string(),
            });
        }
        acc.try_add(&line).ok_or(CommerceError::Overflow)
    })
}

/// Final payable breakdown of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrderTotals {
    /// Cart total.
    pub subtotal: Money,
    /// Shipping added to the total (zero unless fixed-cost delivery).
    pub shipping: Money,
    /// Tip left by the customer.
    pub tip: Money,
    /// subtotal + shipping + tip.
    pub grand_total: Money,
}

impl OrderTotals {
    /// Combine the three components.
    pub fn new(subtotal: Money, shipping: Money, tip: Money) -> Result<Self, CommerceError> {
        let grand_total = subtotal
            .try_add(&shipping)
            .and_then(|m| m.try_add(&tip))
            .ok_or_else(|| CommerceError::CurrencyMismatch {
                expected: subtotal.currency.code().to_string(),
                got: format!("{} / {}", shipping.currency, tip.currency),
            })?;
        Ok(Self {
            subtotal,
            shipping,
            tip,
            grand_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PromotionDiscount, PromotionScope};
    use crate::ids::{OptionId, PersonalizationId, ProductId};
    use chrono::{NaiveDate, NaiveTime};

    fn usd(cents: i64) -> Money {
        Money::new(cents, Currency::USD)
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 15)
            .unwrap()
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
    }

    fn option(id: &str, cents: i64) -> SelectedOption {
        SelectedOption {
            group_id: PersonalizationId::new("g"),
            option_id: OptionId::new(id),
            name: id.to_string(),
            price: usd(cents),
        }
    }

    fn percent(id: &str, value: f64, scope: PromotionScope) -> Promotion {
        Promotion::new(id, id, PromotionDiscount::Percentage(value), scope)
    }

    #[test]
    fn test_percentage_promotion() {
        let product = Product::new("p1", "Bagel", usd(500));
        let promos = vec![percent("promo", 20.0, PromotionScope::AllProducts)];

        let priced = price_of(&product, &promos, noon());
        assert_eq!(priced.price.amount_cents, 400);
        assert_eq!(priced.promotion.map(|p| p.id.as_str()), Some("promo"));
        assert!(priced.is_discounted());
        assert_eq!(priced.savings().amount_cents, 100);

        assert_eq!(line_total(priced.price, &[], 2).unwrap().amount_cents, 800);
    }

    #[test]
    fn test_fixed_amount_clamped_at_zero() {
        let product = Product::new("p1", "Water", usd(150));
        let promos = vec![Promotion::new(
            "free",
            "Free water",
            PromotionDiscount::FixedAmount(usd(500)),
            PromotionScope::AllProducts,
        )];
        assert_eq!(price_of(&product, &promos, noon()).price.amount_cents, 0);
    }

    #[test]
    fn test_price_never_negative_for_large_percentages() {
        let product = Product::new("p1", "Tea", usd(333));
        for value in [0.0, 50.0, 99.9, 100.0, 150.0, 1000.0] {
            let promos = vec![percent("x", value, PromotionScope::AllProducts)];
            assert!(price_of(&product, &promos, noon()).price.amount_cents >= 0);
        }
    }

    #[test]
    fn test_specific_scope_ignores_other_products() {
        let p1 = Product::new("p1", "Latte", usd(450));
        let p2 = Product::new("p2", "Cappuccino", usd(450));
        let promos = vec![percent(
            "latte",
            50.0,
            PromotionScope::SpecificProducts(vec![ProductId::new("p1")]),
        )];

        assert_eq!(price_of(&p1, &promos, noon()).price.amount_cents, 225);
        let priced = price_of(&p2, &promos, noon());
        assert_eq!(priced.price.amount_cents, 450);
        assert!(priced.promotion.is_none());
    }

    #[test]
    fn test_first_matching_promotion_wins() {
        let product = Product::new("p1", "Latte", usd(1000));
        let promos = vec![
            percent("ten", 10.0, PromotionScope::AllProducts),
            percent("fifty", 50.0, PromotionScope::AllProducts),
        ];
        let priced = price_of(&product, &promos, noon());
        assert_eq!(priced.promotion.map(|p| p.id.as_str()), Some("ten"));
        assert_eq!(priced.price.amount_cents, 900);
    }

    #[test]
    fn test_expired_promotion_skipped() {
        let product = Product::new("p1", "Latte", usd(1000));
        let yesterday = NaiveDate::from_ymd_opt(2026, 6, 14);
        let promos = vec![
            percent("old", 50.0, PromotionScope::AllProducts).between(None, yesterday),
            percent("current", 10.0, PromotionScope::AllProducts),
        ];
        let priced = price_of(&product, &promos, noon());
        assert_eq!(priced.promotion.map(|p| p.id.as_str()), Some("current"));
    }

    #[test]
    fn test_unusable_promotions_are_skipped() {
        let product = Product::new("p1", "Latte", usd(1000));
        let promos = vec![
            Promotion::new(
                "euros",
                "Euro deal",
                PromotionDiscount::FixedAmount(Money::new(300, Currency::EUR)),
                PromotionScope::AllProducts,
            ),
            percent("negative", -25.0, PromotionScope::AllProducts),
            percent("real", 10.0, PromotionScope::AllProducts),
        ];
        let priced = price_of(&product, &promos, noon());
        assert_eq!(priced.promotion.map(|p| p.id.as_str()), Some("real"));
        assert_eq!(priced.price.amount_cents, 900);

        let priced = price_of(&product, &promos[..2], noon());
        assert!(priced.promotion.is_none());
        assert_eq!(priced.price, priced.listed_price);
    }

    #[test]
    fn test_line_total_with_options() {
        let options = vec![option("cheese", 50), option("bacon", 125)];
        assert_eq!(line_total(usd(800), &options, 3).unwrap().amount_cents, 2925);
    }

    #[test]
    fn test_line_total_clamps_quantity() {
        assert_eq!(line_total(usd(300), &[], 0).unwrap().amount_cents, 300);
        assert_eq!(line_total(usd(300), &[], -4).unwrap().amount_cents, 300);
    }

    #[test]
    fn test_option_currency_mismatch() {
        let mut eur = option("x", 10);
        eur.price = Money::new(10, Currency::EUR);
        assert!(matches!(
            unit_price_with_options(usd(100), &[eur]),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_order_totals() {
        let totals = OrderTotals::new(usd(1150), usd(200), usd(100)).unwrap();
        assert_eq!(totals.grand_total.amount_cents, 1450);
    }
}
