//! The JSON document a store is loaded from and flushed to.

use std::fs;
use std::path::Path;

use comanda_commerce::catalog::{
    Category, PersonalizationGroup, PersonalizationOption, Product, Promotion, PromotionDiscount,
    PromotionScope,
};
use comanda_commerce::checkout::{AppSettings, Order, PaymentMethods, ShippingCostType, ShippingPolicy};
use comanda_commerce::{Currency, Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::DocumentError;

/// Everything a store holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoreDocument {
    #[serde(default)]
    pub settings: AppSettings,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub personalization_groups: Vec<PersonalizationGroup>,
    #[serde(default)]
    pub promotions: Vec<Promotion>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl StoreDocument {
    /// Read a document from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let raw = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DocumentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the document as pretty JSON.
    ///
    /// Writes to a sibling temp file first so a crash never leaves a
    /// half-written document behind.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        let io = |source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io)?;
        }
        fs::write(&tmp, json).map_err(io)?;
        fs::rename(&tmp, path).map_err(io)?;
        Ok(())
    }

    /// A small cafe menu used by `comanda init` and tests.
    pub fn sample() -> Self {
        let usd = |cents| Money::new(cents, Currency::USD);

        let settings = AppSettings {
            restaurant_name: "Corner Cafe".into(),
            currency: Currency::USD,
            messaging_destination: "+15550100".into(),
            shipping: ShippingPolicy {
                cost_type: ShippingCostType::Fixed,
                fixed_cost: usd(200),
            },
            payment_methods: PaymentMethods {
                dine_in: vec!["Cash".into(), "Card".into()],
                take_away: vec!["Cash".into(), "Card".into()],
                delivery: vec!["Cash".into(), "Transfer".into()],
            },
            ..AppSettings::default()
        };

        Self {
            settings,
            categories: vec![
                Category::new("bakery", "Bakery").at_position(1),
                Category::new("drinks", "Drinks").at_position(2),
            ],
            products: vec![
                Product::new("bagel", "Bagel", usd(500))
                    .in_category("bakery")
                    .with_personalization("spread"),
                Product::new("croissant", "Croissant", usd(375)).in_category("bakery"),
                Product::new("latte", "Latte", usd(450))
                    .in_category("drinks")
                    .with_personalization("milk"),
                Product::new("tea", "Black tea", usd(300)).in_category("drinks"),
            ],
            personalization_groups: vec![
                PersonalizationGroup::new("milk", "Milk")
                    .with_bounds(1, Some(1))
                    .with_option(PersonalizationOption::new("whole", "Whole", usd(0)))
                    .with_option(PersonalizationOption::new("oat", "Oat", usd(75)))
                    .with_option(PersonalizationOption::new("soy", "Soy", usd(50)).unavailable()),
                PersonalizationGroup::new("spread", "Spread")
                    .with_bounds(0, Some(2))
                    .with_option(PersonalizationOption::new("butter", "Butter", usd(0)))
                    .with_option(PersonalizationOption::new("jam", "Jam", usd(25)))
                    .with_option(PersonalizationOption::new("cheese", "Cream cheese", usd(100))),
            ],
            promotions: vec![Promotion::new(
                "morning-bagel",
                "Morning bagel",
                PromotionDiscount::Percentage(20.0),
                PromotionScope::SpecificProducts(vec![ProductId::new("bagel")]),
            )],
            orders: Vec::new(),
        }
    }
}
