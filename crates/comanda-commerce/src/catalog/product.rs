//! Menu products.

use crate::ids::{CategoryId, PersonalizationId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// A product on the menu.
///
/// Immutable for the lifetime of a catalog snapshot; only `available` is
/// expected to change out of band, and that arrives as a new snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Menu description.
    #[serde(default)]
    pub description: Option<String>,
    /// Listed unit price before promotions.
    pub price: Money,
    /// Image reference (URL or storage key).
    #[serde(default)]
    pub image_url: Option<String>,
    /// Menu section this product is listed under.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Whether the kitchen currently offers this product.
    #[serde(default = "default_true")]
    pub available: bool,
    /// Personalization groups offered for this product, in display order.
    #[serde(default)]
    pub personalization_ids: Vec<PersonalizationId>,
}

impl Product {
    /// Create a new available product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            image_url: None,
            category_id: None,
            available: true,
            personalization_ids: Vec::new(),
        }
    }

    /// Place this product in a category.
    pub fn in_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Offer a personalization group for this product.
    pub fn with_personalization(mut self, group_id: impl Into<PersonalizationId>) -> Self {
        let group_id = group_id.into();
        if !self.personalization_ids.contains(&group_id) {
            self.personalization_ids.push(group_id);
        }
        self
    }

    /// Check if the product can be ordered.
    pub fn is_available(&self) -> bool {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_product_builder() {
        let product = Product::new("p1", "Latte", Money::new(450, Currency::USD))
            .in_category("drinks")
            .with_personalization("milk")
            .with_personalization("milk");

        assert!(product.is_available());
        assert_eq!(product.category_id, Some(CategoryId::new("drinks")));
        assert_eq!(product.personalization_ids.len(), 1);
    }

    #[test]
    fn test_product_deserialize_defaults() {
        let json = r#"{
            "id": "p1",
            "name": "Espresso",
            "price": {"amount_cents": 250, "currency": "USD"}
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.available);
        assert!(product.personalization_ids.is_empty());
    }
}
