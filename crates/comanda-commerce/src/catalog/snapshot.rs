//! Point-in-time copy of the whole catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::DataStore;
use crate::catalog::{Category, PersonalizationGroup, Product, Promotion};
use crate::checkout::AppSettings;
use crate::error::CommerceError;
use crate::ids::{CategoryId, PersonalizationId, ProductId};

/// Everything a storefront needs to price and configure products.
///
/// A snapshot is never merged with a newer one; a refresh replaces it whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub personalization_groups: Vec<PersonalizationGroup>,
    /// Promotions in the order pricing should consider them.
    pub promotions: Vec<Promotion>,
    pub settings: AppSettings,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Fetch a complete snapshot; any failing part fails the whole fetch.
    pub async fn fetch(store: &dyn DataStore) -> Result<Self, CommerceError> {
        let products = store.fetch_products().await.map_err(CommerceError::from_fetch)?;
        let categories = store.fetch_categories().await.map_err(CommerceError::from_fetch)?;
        let personalization_groups = store
            .fetch_personalization_groups()
            .await
            .map_err(CommerceError::from_fetch)?;
        let promotions = store
            .fetch_active_promotions()
            .await
            .map_err(CommerceError::from_fetch)?;
        let settings = store.fetch_settings().await.map_err(CommerceError::from_fetch)?;

        debug!(
            products = products.len(),
            groups = personalization_groups.len(),
            promotions = promotions.len(),
            "catalog snapshot fetched"
        );

        Ok(Self {
            products,
            categories,
            personalization_groups,
            promotions,
            settings,
            fetched_at: Utc::now(),
        })
    }

    /// Find a product by id.
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Find a personalization group by id.
    pub fn group(&self, id: &PersonalizationId) -> Option<&PersonalizationGroup> {
        self.personalization_groups.iter().find(|g| &g.id == id)
    }

    /// Groups offered for a product, in the product's order. Unknown ids are skipped.
    pub fn groups_for(&self, product: &Product) -> Vec<&PersonalizationGroup> {
        product
            .personalization_ids
            .iter()
            .filter_map(|id| self.group(id))
            .collect()
    }

    /// Categories sorted by menu position.
    pub fn sorted_categories(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.iter().collect();
        categories.sort_by_key(|c| c.position);
        categories
    }

    /// Available products in a category (or uncategorized when `None`).
    pub fn available_in(&self, category_id: Option<&CategoryId>) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.available && p.category_id.as_ref() == category_id)
            .collect()
    }
}
