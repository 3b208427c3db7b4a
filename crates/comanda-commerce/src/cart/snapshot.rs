//! Catalog-independent copy of a configured product.

use serde::{Deserialize, Serialize};

use crate::cart::SelectedOption;
use crate::catalog::Product;
use crate::ids::ProductId;
use crate::money::Money;
use crate::pricing::PricedProduct;

/// A product frozen at the moment it is ordered.
///
/// Built one way from a catalog product, its resolved price and the chosen
/// options. Holds no reference back to the catalog, so later price or
/// availability changes never reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderableSnapshot {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price after promotions, before options.
    pub unit_price: Money,
    /// Catalog price before promotions.
    pub listed_price: Money,
    /// Name of the promotion that set `unit_price`.
    pub promotion_name: Option<String>,
    pub options: Vec<SelectedOption>,
}

impl OrderableSnapshot {
    /// Freeze a priced product with its options.
    pub fn capture(product: &Product, priced: &PricedProduct<'_>, options: Vec<SelectedOption>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: priced.price,
            listed_price: priced.listed_price,
            promotion_name: priced.promotion.map(|p| p.name.clone()),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Promotion, PromotionDiscount, PromotionScope};
    use crate::money::Currency;
    use crate::pricing::price_of;
    use chrono::NaiveDate;

    #[test]
    fn test_capture_is_detached_from_product() {
        let mut product = Product::new("p1", "Bagel", Money::new(500, Currency::USD));
        let promos = vec![Promotion::new(
            "promo",
            "Morning deal",
            PromotionDiscount::Percentage(20.0),
            PromotionScope::AllProducts,
        )];
        let now = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap().and_hms_opt(9, 0, 0).unwrap();

        let priced = price_of(&product, &promos, now);
        let snapshot = OrderableSnapshot::capture(&product, &priced, vec![]);

        product.price = Money::new(900, Currency::USD);
        product.name = "Renamed".into();

        assert_eq!(snapshot.unit_price.amount_cents, 400);
        assert_eq!(snapshot.listed_price.amount_cents, 500);
        assert_eq!(snapshot.name, "Bagel");
        assert_eq!(snapshot.promotion_name.as_deref(), Some("Morning deal"));
    }
}
